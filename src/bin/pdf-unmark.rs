//! PDF Unmark CLI tool
//!
//! A command-line tool for stripping font-substitution watermarks from PDFs.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::error;
use std::path::{Path, PathBuf};
use std::process;

use pdf_unmark::naming::{ensure_output_dir, find_pdfs, output_path};
use pdf_unmark::pdf::{clean_pdf, scan_pdf, CleanOptions};
use pdf_unmark::status::Status;

/// PDF Unmark - Remove font-substitution watermarks from PDFs
#[derive(Parser)]
#[command(name = "pdf-unmark")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Clean one file into ./cleaned
    pdf-unmark clean -f \"SEC504 - Book 1_1234567.pdf\" -p secret -o cleaned

    # Clean every PDF in a directory
    pdf-unmark clean -d books -p secret

    # Show which pages carry watermark fonts
    pdf-unmark scan handout.pdf -p secret")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove watermarks and save cleaned copies
    Clean {
        /// A PDF file to process
        #[arg(short, long, required_unless_present = "directory", conflicts_with = "directory")]
        file: Option<PathBuf>,

        /// A directory of PDF files to process
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Password for encrypted PDFs
        #[arg(short, long, default_value = "")]
        password: String,

        /// Directory for the cleaned PDFs (created if missing, defaults to the current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List the watermark fonts of each page without writing anything
    Scan {
        /// PDF file to inspect
        input: PathBuf,

        /// Password for encrypted PDFs
        #[arg(short, long, default_value = "")]
        password: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Clean { file, directory, password, output_dir } => {
            cmd_clean(file, directory, password, output_dir)
        }
        Commands::Scan { input, password } => {
            cmd_scan(input, password)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", Status::Error.line(format!("Error: {:#}", e)));
        process::exit(1);
    }
}

/// Clean a single file and report where it went
fn clean_file(input: &Path, output_dir: &Path, options: &CleanOptions) -> pdf_unmark::Result<()> {
    eprintln!("{}", Status::Info.line(format!("Cleaning {}...", input.display())));

    let output = output_path(input, output_dir)?;
    let report = clean_pdf(input, &output, options)?;

    if report.watermarked_pages() == 0 {
        eprintln!("{}", Status::Warn.line(format!("No watermark fonts found in {}", input.display())));
    }
    eprintln!("{}", Status::Success.line(format!("Saved pdf to {}", output.display())));

    Ok(())
}

/// Remove watermarks from one file or every PDF in a directory
fn cmd_clean(
    file: Option<PathBuf>,
    directory: Option<PathBuf>,
    password: String,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output_dir = output_dir.unwrap_or_default();
    ensure_output_dir(&output_dir).with_context(|| {
        format!(
            "{} is not a valid directory path and it was unable to be created",
            output_dir.display()
        )
    })?;

    let options = CleanOptions { password };

    match (file, directory) {
        (Some(file), _) => {
            if !file.is_file() {
                bail!("{} does not exist or is not a valid file", file.display());
            }
            clean_file(&file, &output_dir, &options)
                .with_context(|| format!("Couldn't process {}", file.display()))?;
        }
        (None, Some(directory)) => {
            let files = find_pdfs(&directory)
                .with_context(|| format!("{} is not a valid directory", directory.display()))?;

            if files.is_empty() {
                eprintln!("{}", Status::Warn.line(format!("No PDF files found in {}", directory.display())));
                return Ok(());
            }

            // One bad file must not stop the batch
            let mut failed = 0;
            for file in &files {
                if let Err(e) = clean_file(file, &output_dir, &options) {
                    error!("{}: {}", file.display(), e);
                    eprintln!(
                        "{}",
                        Status::Error.line(format!("Couldn't process {} because of: {}", file.display(), e))
                    );
                    failed += 1;
                }
                eprintln!();
            }

            eprintln!("{}", Status::Info.line(format!("Cleaned {} of {} files", files.len() - failed, files.len())));
            if failed > 0 {
                bail!("{} of {} files could not be processed", failed, files.len());
            }
        }
        (None, None) => bail!("Please include a file or directory to process"),
    }

    Ok(())
}

/// Show which pages of a PDF carry watermark fonts
fn cmd_scan(input: PathBuf, password: String) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let report = scan_pdf(&input, &password)?;

    println!("File: {}", input.display());
    println!("Pages: {}", report.page_count);

    let mut watermarked = 0;
    for page in report.watermarked() {
        println!(
            "Page {}: {} of {} fonts are watermark fonts ({})",
            page.page_number,
            page.watermark_fonts.len(),
            page.font_count,
            page.watermark_fonts.join(", ")
        );
        watermarked += 1;
    }

    if watermarked == 0 {
        println!("No watermark fonts found");
    }

    Ok(())
}
