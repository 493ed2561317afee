//! PDF Unmark Library
//!
//! Removes glyph-substitution watermarks from PDF pages. The watermark is
//! drawn with fonts whose `Encoding` carries a `Differences` array, selected
//! in a block appended after the page's real content. This library provides
//! functionality to:
//! - Detect watermark fonts in a page's font resources
//! - Cut the content stream at the first selection of a watermark font
//! - Clean whole documents, including encrypted ones
//! - Name output files (`_cleaned` suffix or the class path convention)
//!
//! # Example
//!
//! ```no_run
//! use pdf_unmark::pdf::{clean_pdf, CleanOptions};
//! use pdf_unmark::naming::output_path;
//! use std::path::Path;
//!
//! let input = Path::new("handout.pdf");
//! let output = output_path(input, Path::new("cleaned")).expect("Failed to name output");
//!
//! let options = CleanOptions { password: "letmein".to_string() };
//! clean_pdf(input, &output, &options).expect("Failed to clean PDF");
//! ```

pub mod error;
pub mod watermark;
pub mod pdf;
pub mod naming;
pub mod status;

// Re-export commonly used items
pub use error::{Error, Result};
