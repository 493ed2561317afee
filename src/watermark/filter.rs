//! Content stream filtering
//!
//! Watermark text is appended after the legitimate page content, so the
//! first `Tf` that selects a watermark font marks the start of a block that
//! runs to the end of the page. Everything from that operation onwards is
//! dropped.

use lopdf::content::Operation;
use lopdf::Object;

use super::detect::WatermarkFontSet;

/// Font selection operator: `/F1 12 Tf`
pub const SET_FONT: &str = "Tf";

/// Filtering state for one page's operation sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// Operations are copied to the output
    Active,
    /// A watermark font has been selected; nothing else is copied
    Suppressed,
}

impl FilterState {
    /// State after seeing `operation`. `Suppressed` is terminal.
    pub fn advance(self, operation: &Operation, fonts: &WatermarkFontSet) -> Self {
        match self {
            FilterState::Active if selects_watermark_font(operation, fonts) => FilterState::Suppressed,
            state => state,
        }
    }
}

/// True for a `Tf` whose font operand names a watermark font
pub fn selects_watermark_font(operation: &Operation, fonts: &WatermarkFontSet) -> bool {
    if operation.operator != SET_FONT {
        return false;
    }
    match operation.operands.first() {
        Some(Object::Name(name)) => fonts.contains(name),
        _ => false,
    }
}

/// Remove the watermark block from a page's operations
///
/// The result is always a prefix of `operations`: everything before the
/// first `Tf` that selects a font in `fonts`. With an empty `fonts` set the
/// input is returned unchanged.
pub fn filter(operations: Vec<Operation>, fonts: &WatermarkFontSet) -> Vec<Operation> {
    let (_, kept) = operations.into_iter().fold(
        (FilterState::Active, Vec::new()),
        |(state, mut kept), operation| {
            let state = state.advance(&operation, fonts);
            if state == FilterState::Active {
                kept.push(operation);
            }
            (state, kept)
        },
    );
    kept
}
