//! Watermark detection and removal
//!
//! Both halves are stateless and work on a single page: `detect` picks the
//! watermark fonts out of the page's font table, `filter` drops the content
//! stream block that draws with them.

pub mod detect;
pub mod filter;

// Re-export commonly used items
pub use detect::{detect, FontEntry, FontTable, WatermarkFontSet};
pub use filter::{filter, FilterState};
