//! Read-only watermark inspection

use std::path::Path;
use lopdf::Document;

use crate::error::Result;
use crate::pdf::open::open_document;
use crate::pdf::page::PageFonts;
use crate::watermark::{detect, FontEntry};

/// Watermark fonts found on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageScan {
    /// 1-based page number
    pub page_number: u32,
    /// Number of fonts in the page's resource table
    pub font_count: usize,
    /// Resource names of the watermark fonts
    pub watermark_fonts: Vec<String>,
}

/// Watermark summary of a document
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// One entry per page, in page order
    pub pages: Vec<PageScan>,
}

impl ScanReport {
    /// Pages that carry at least one watermark font
    pub fn watermarked(&self) -> impl Iterator<Item = &PageScan> {
        self.pages.iter().filter(|page| !page.watermark_fonts.is_empty())
    }
}

/// Classify the fonts of every page without changing the document
pub fn scan_document(doc: &Document) -> ScanReport {
    let pages: Vec<PageScan> = doc
        .get_pages()
        .into_iter()
        .map(|(page_number, page_id)| {
            // The table is a copy; detection leaves the document untouched
            let mut fonts = PageFonts::read(doc, page_id);
            detect(&mut fonts.table);
            let watermark_fonts = fonts.table.neutralized().map(FontEntry::display_name).collect();

            PageScan {
                page_number,
                font_count: fonts.table.len(),
                watermark_fonts,
            }
        })
        .collect();

    ScanReport {
        page_count: pages.len(),
        pages,
    }
}

/// Open a PDF and report which pages carry watermark fonts
pub fn scan_pdf(path: &Path, password: &str) -> Result<ScanReport> {
    let doc = open_document(path, password)?;
    Ok(scan_document(&doc))
}
