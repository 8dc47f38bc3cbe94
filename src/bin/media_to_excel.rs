use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use log::warn;
use pdfium_render::prelude::Pdfium;

use mediasheet::excel::{self, MediaRow};
use mediasheet::{RunSummary, SOURCE_DPI, THUMBNAIL_SIZE, media, pdf};

/// Convert a folder of media files into an Excel workbook of thumbnails and
/// metadata.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder containing the media files
    #[arg(short, long)]
    input: PathBuf,

    /// Folder the workbook is written into
    #[arg(short, long)]
    output: PathBuf,

    /// Base name for the workbook (without .xlsx)
    #[arg(short, long, default_value = "media_info")]
    name: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let files = mediasheet::media_files(&args.input)?;
    if files.is_empty() {
        println!("No supported files found in '{}'", args.input.display());
        println!(
            "Supported extensions: {}",
            mediasheet::supported_extensions()
        );
        return Ok(());
    }

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create {}", args.output.display()))?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let base_name = args.name.trim_end_matches(".xlsx");
    let workbook_path = args.output.join(format!("{base_name}_{timestamp}.xlsx"));

    println!("Processing {} files...", files.len());

    // pdfium is only needed when the folder actually contains PDFs; without
    // it those files are skipped, not the whole run.
    let pdfium = if files.iter().any(|path| mediasheet::is_pdf(path)) {
        match pdf::bind() {
            Ok(pdfium) => Some(pdfium),
            Err(err) => {
                warn!("PDF files will be skipped: {err:#}");
                None
            }
        }
    } else {
        None
    };

    let mut rows = Vec::new();
    let mut summary = RunSummary::new();
    for path in &files {
        let name = mediasheet::file_name(path);
        match build_row(path, &name, pdfium.as_ref()) {
            Ok(row) => {
                rows.push(row);
                summary.converted();
            }
            Err(err) => {
                warn!("skipping {name}: {err:#}");
                summary.skip(&name, format!("{err:#}"));
            }
        }
    }

    excel::write_workbook(&rows, &workbook_path)?;
    println!("Excel sheet saved to:\n{}", workbook_path.display());
    summary.report();
    Ok(())
}

fn build_row(path: &Path, name: &str, pdfium: Option<&Pdfium>) -> Result<MediaRow> {
    let (image, mode, color_profile) = if mediasheet::is_pdf(path) {
        let pdfium = pdfium.ok_or_else(|| eyre!("pdfium library unavailable"))?;
        let image = pdf::render_first_page(pdfium, path, SOURCE_DPI)?;
        let mode = media::color_mode(image.color()).to_string();
        (image, mode, "Untagged".to_string())
    } else {
        let decoded = media::open_oriented(path)?;
        (
            decoded.image,
            decoded.mode.to_string(),
            decoded.color_profile,
        )
    };

    let (width, height) = (image.width(), image.height());
    let thumbnail = media::thumbnail(&image, THUMBNAIL_SIZE);
    let format = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_uppercase())
        .unwrap_or_default();

    Ok(MediaRow {
        filename: name.to_string(),
        width,
        height,
        width_in: width as f32 / SOURCE_DPI,
        height_in: height as f32 / SOURCE_DPI,
        mode,
        format,
        color_profile,
        thumbnail_png: media::png_bytes(&thumbnail)?,
    })
}
