//! Watermark removal for whole documents
//!
//! Each page is handled on its own: its font table is read, classified,
//! and the page's content stream is cut at the first watermark font
//! selection. Neutralized font encodings are written back only after every
//! page has been filtered, so a font object shared between pages is still
//! recognised as a watermark font on each of them.

use std::path::{Path, PathBuf};
use lopdf::{Document, ObjectId};
use log::{debug, info, warn};

use crate::error::Result;
use crate::pdf::open::open_document;
use crate::pdf::page::{replace_contents, tokenize_contents, PageFonts};
use crate::watermark::{detect, filter, FontEntry};

/// Options for cleaning a PDF
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Password used when the document is encrypted (empty for none)
    pub password: String,
}

/// What happened to a single page
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// 1-based page number
    pub page_number: u32,
    /// Resource names of the watermark fonts found on the page
    pub watermark_fonts: Vec<String>,
    /// Content stream operations kept
    pub kept: usize,
    /// Content stream operations dropped
    pub dropped: usize,
}

impl PageReport {
    pub fn is_watermarked(&self) -> bool {
        !self.watermark_fonts.is_empty()
    }
}

/// Result of cleaning a document
#[derive(Debug, Clone)]
pub struct CleanReport {
    /// Where the cleaned PDF was saved
    pub output_path: PathBuf,
    /// Per-page results in page order
    pub pages: Vec<PageReport>,
}

impl CleanReport {
    /// Number of pages that carried at least one watermark font
    pub fn watermarked_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.is_watermarked()).count()
    }

    /// Total content stream operations removed across the document
    pub fn dropped_operations(&self) -> usize {
        self.pages.iter().map(|page| page.dropped).sum()
    }
}

/// Remove the watermark from one page
///
/// Returns the page report and the page's font table, whose neutralized
/// entries still have to be written back with `PageFonts::write_back`.
pub fn clean_page(doc: &mut Document, page_number: u32, page_id: ObjectId) -> Result<(PageReport, PageFonts)> {
    let mut fonts = PageFonts::read(doc, page_id);
    let watermark_fonts = detect(&mut fonts.table);

    let operations = tokenize_contents(doc, page_id)?;
    let total = operations.len();
    let kept = filter(operations, &watermark_fonts);
    let kept_count = kept.len();
    let dropped = total - kept_count;

    let names: Vec<String> = fonts.table.neutralized().map(FontEntry::display_name).collect();

    debug!(
        "Page {}: {} fonts, watermark fonts {:?}, kept {} of {} operations",
        page_number,
        fonts.table.len(),
        names,
        kept_count,
        total
    );

    if dropped > 0 {
        replace_contents(doc, page_id, kept)?;
    } else if !names.is_empty() {
        warn!("Page {}: watermark fonts {:?} are never selected", page_number, names);
    }

    let report = PageReport {
        page_number,
        watermark_fonts: names,
        kept: kept_count,
        dropped,
    };

    Ok((report, fonts))
}

/// Remove watermarks from every page of a loaded document
pub fn clean_document(doc: &mut Document) -> Result<Vec<PageReport>> {
    let pages = doc.get_pages();
    let mut reports = Vec::with_capacity(pages.len());
    let mut neutralized = Vec::with_capacity(pages.len());

    for (page_number, page_id) in pages {
        let (report, fonts) = clean_page(doc, page_number, page_id)?;
        reports.push(report);
        neutralized.push(fonts);
    }

    let written: usize = neutralized.iter().map(|fonts| fonts.write_back(doc)).sum();
    debug!("Neutralized {} font encodings", written);

    Ok(reports)
}

/// Remove watermarks from a PDF file and save the result
///
/// # Example
///
/// ```no_run
/// use pdf_unmark::pdf::{clean_pdf, CleanOptions};
/// use std::path::Path;
///
/// let options = CleanOptions { password: "secret".to_string() };
/// let report = clean_pdf(
///     Path::new("SEC504 - Book 1_1234567.pdf"),
///     Path::new("SEC504_Book_1.pdf"),
///     &options,
/// ).expect("Failed to clean PDF");
///
/// println!("{} watermarked pages", report.watermarked_pages());
/// ```
pub fn clean_pdf(input: &Path, output: &Path, options: &CleanOptions) -> Result<CleanReport> {
    let mut doc = open_document(input, &options.password)?;

    let pages = clean_document(&mut doc)?;

    let report = CleanReport {
        output_path: output.to_path_buf(),
        pages,
    };

    info!(
        "{}: removed {} operations from {} of {} pages",
        input.display(),
        report.dropped_operations(),
        report.watermarked_pages(),
        report.pages.len()
    );

    // Drop the replaced content streams before writing
    let pruned = doc.prune_objects();
    debug!("Pruned {} unreferenced objects", pruned.len());
    doc.compress();
    doc.save(output)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_clean_nonexistent_file() {
        let result = clean_pdf(
            Path::new("nonexistent.pdf"),
            Path::new("out.pdf"),
            &CleanOptions::default(),
        );
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_report_totals() {
        let report = CleanReport {
            output_path: PathBuf::from("out.pdf"),
            pages: vec![
                PageReport { page_number: 1, watermark_fonts: vec![], kept: 10, dropped: 0 },
                PageReport { page_number: 2, watermark_fonts: vec!["F2".to_string()], kept: 4, dropped: 6 },
                PageReport { page_number: 3, watermark_fonts: vec!["F2".to_string()], kept: 0, dropped: 3 },
            ],
        };

        assert_eq!(report.watermarked_pages(), 2);
        assert_eq!(report.dropped_operations(), 9);
    }
}
