//! PDF document handling

pub mod open;
pub mod page;
pub mod clean;
pub mod scan;

// Re-export commonly used items
pub use clean::{clean_document, clean_page, clean_pdf, CleanOptions, CleanReport, PageReport};
pub use open::open_document;
pub use page::{replace_contents, tokenize_contents, PageFonts};
pub use scan::{scan_document, scan_pdf, PageScan, ScanReport};
