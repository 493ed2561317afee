//! Watermark font detection
//!
//! The watermark fonts carry an `Encoding` dictionary whose `Differences`
//! array remaps character codes to other glyphs. Ordinary fonts either have
//! no encoding dictionary, a named base encoding, or an empty remap table.

use std::collections::{BTreeMap, BTreeSet};
use lopdf::Object;

/// Resource names of the fonts on one page that remap their glyphs
pub type WatermarkFontSet = BTreeSet<Vec<u8>>;

/// A font as listed in a page's `Font` resource dictionary
#[derive(Debug, Clone)]
pub struct FontEntry {
    /// Resource name used by the `Tf` operator (e.g. `F1`)
    pub name: Vec<u8>,
    /// Contents of `Encoding.Differences`, `None` when absent
    pub encoding_differences: Option<Vec<Object>>,
    neutralized: bool,
}

impl FontEntry {
    pub fn new(name: impl Into<Vec<u8>>, encoding_differences: Option<Vec<Object>>) -> Self {
        Self {
            name: name.into(),
            encoding_differences,
            neutralized: false,
        }
    }

    /// True when the font carries a non-empty `Differences` array
    pub fn is_watermark(&self) -> bool {
        self.encoding_differences
            .as_ref()
            .is_some_and(|differences| !differences.is_empty())
    }

    /// True once `detect` has cleared this entry's remapping
    pub fn is_neutralized(&self) -> bool {
        self.neutralized
    }

    /// Resource name for display in logs and reports
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    fn neutralize(&mut self) {
        if let Some(differences) = self.encoding_differences.as_mut() {
            differences.clear();
        }
        self.neutralized = true;
    }
}

/// The font resource table of a single page, keyed by resource name
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    entries: BTreeMap<Vec<u8>, FontEntry>,
}

impl FontTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any previous entry with the same name
    pub fn insert(&mut self, entry: FontEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &[u8]) -> Option<&FontEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontEntry> {
        self.entries.values()
    }

    /// Entries cleared by `detect`, in name order
    pub fn neutralized(&self) -> impl Iterator<Item = &FontEntry> {
        self.iter().filter(|entry| entry.is_neutralized())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<FontEntry> for FontTable {
    fn from_iter<I: IntoIterator<Item = FontEntry>>(iter: I) -> Self {
        let mut table = FontTable::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// Classify the fonts of one page and neutralize the watermark fonts
///
/// Returns the names of every font whose `Differences` array is present and
/// non-empty. Each of those entries has its `Differences` cleared in place;
/// ordinary entries are left untouched.
///
/// # Example
///
/// ```
/// use lopdf::Object;
/// use pdf_unmark::watermark::{detect, FontEntry, FontTable};
///
/// let mut table: FontTable = vec![
///     FontEntry::new("F1", None),
///     FontEntry::new("F2", Some(vec![Object::Integer(5), Object::Integer(6)])),
/// ]
/// .into_iter()
/// .collect();
///
/// let fonts = detect(&mut table);
/// assert!(fonts.contains(b"F2".as_slice()));
/// assert_eq!(fonts.len(), 1);
/// ```
pub fn detect(table: &mut FontTable) -> WatermarkFontSet {
    table
        .entries
        .values_mut()
        .filter(|entry| entry.is_watermark())
        .map(|entry| {
            entry.neutralize();
            entry.name.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn differences(codes: &[i64]) -> Option<Vec<Object>> {
        Some(codes.iter().map(|&code| Object::Integer(code)).collect())
    }

    #[test]
    fn test_detect_clean_table() {
        let mut table: FontTable = vec![
            FontEntry::new("F1", None),
            FontEntry::new("F2", differences(&[])),
        ]
        .into_iter()
        .collect();

        let fonts = detect(&mut table);

        assert!(fonts.is_empty());
        assert!(table.iter().all(|entry| !entry.is_neutralized()));
        assert!(table.get(b"F1").unwrap().encoding_differences.is_none());
        assert!(table.get(b"F2").unwrap().encoding_differences.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_detect_empty_table() {
        let mut table = FontTable::new();
        assert!(detect(&mut table).is_empty());
    }

    #[test]
    fn test_single_difference_is_watermark() {
        let mut table: FontTable = vec![FontEntry::new("F7", differences(&[1]))]
            .into_iter()
            .collect();

        let fonts = detect(&mut table);

        assert_eq!(fonts.len(), 1);
        assert!(fonts.contains(b"F7".as_slice()));
    }

    #[test]
    fn test_detect_clears_only_watermark_fonts() {
        let mut table: FontTable = vec![
            FontEntry::new("F1", differences(&[])),
            FontEntry::new("F2", differences(&[5, 6])),
        ]
        .into_iter()
        .collect();

        let fonts = detect(&mut table);

        assert_eq!(fonts.len(), 1);
        assert!(fonts.contains(b"F2".as_slice()));

        let f1 = table.get(b"F1").unwrap();
        assert!(f1.encoding_differences.as_ref().unwrap().is_empty());
        assert!(!f1.is_neutralized());

        let f2 = table.get(b"F2").unwrap();
        assert!(f2.encoding_differences.as_ref().unwrap().is_empty());
        assert!(f2.is_neutralized());
        assert!(!f2.is_watermark());
    }

    #[test]
    fn test_detect_with_glyph_names() {
        // Typical layout: a start code followed by glyph names
        let remap = vec![
            Object::Integer(32),
            Object::Name(b"space".to_vec()),
            Object::Name(b"W".to_vec()),
        ];
        let mut table: FontTable = vec![
            FontEntry::new("TT0", Some(remap)),
            FontEntry::new("TT1", None),
        ]
        .into_iter()
        .collect();

        let fonts = detect(&mut table);

        assert_eq!(fonts.into_iter().collect::<Vec<_>>(), vec![b"TT0".to_vec()]);
    }

    #[test]
    fn test_neutralized_lists_detected_fonts() {
        let mut table: FontTable = vec![
            FontEntry::new("TT2", differences(&[1])),
            FontEntry::new("TT1", None),
            FontEntry::new("TT0", differences(&[7, 8])),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.neutralized().count(), 0);

        let fonts = detect(&mut table);
        let names: Vec<String> = table.neutralized().map(FontEntry::display_name).collect();

        assert_eq!(names, vec!["TT0".to_string(), "TT2".to_string()]);
        assert_eq!(names.len(), fonts.len());
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut table = FontTable::new();
        table.insert(FontEntry::new("F1", differences(&[3])));
        table.insert(FontEntry::new("F1", None));

        assert_eq!(table.len(), 1);
        assert!(!table.get(b"F1").unwrap().is_watermark());
    }
}
