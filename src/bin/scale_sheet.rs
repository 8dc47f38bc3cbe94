use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use image::DynamicImage;
use image::imageops::FilterType;
use log::{info, warn};
use pdfium_render::prelude::Pdfium;

use mediasheet::sheet::{self, SheetEntry};
use mediasheet::{
    MediaItem, OUTPUT_DPI, RunSummary, SOURCE_DPI, ScaleOptions, ScaledItem, media, pdf, scale,
};

/// Convert a folder of media files into Figma-ready SVG scale sheets with
/// dimension overlays, all scaled by one global factor so relative sizes
/// stay true.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder containing the media files
    #[arg(short, long)]
    input: PathBuf,

    /// Folder the SVG sheets are written into
    #[arg(short, long)]
    output: PathBuf,
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
    let folder = mediasheet::file_name(&args.input);

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

    println!("Processing {} files...", files.len());

    // Decode the whole folder first; the global factor needs every item's
    // dimensions before anything can be resized.
    let mut summary = RunSummary::new();
    let mut batch: Vec<(MediaItem, DynamicImage)> = Vec::new();
    for path in &files {
        match load(path, pdfium.as_ref()) {
            Ok(loaded) => batch.push(loaded),
            Err(err) => {
                let name = mediasheet::file_name(path);
                warn!("skipping {name}: {err:#}");
                summary.skip(&name, format!("{err:#}"));
            }
        }
    }
    if batch.is_empty() {
        summary.report();
        return Ok(());
    }

    let items: Vec<MediaItem> = batch.iter().map(|(item, _)| item.clone()).collect();
    let normalized = scale::normalize(&items, &ScaleOptions::default())?;
    info!("global scale factor: {:.4}", normalized.factor);

    for ((item, image), scaled) in batch.iter().zip(&normalized.items) {
        match write_sheet(&args.output, &folder, item, image, scaled) {
            Ok(out_path) => {
                println!("Saved: {}", out_path.display());
                summary.converted();
            }
            Err(err) => {
                warn!("skipping {}: {err:#}", item.name);
                summary.skip(&item.name, format!("{err:#}"));
            }
        }
    }

    summary.report();
    Ok(())
}

fn load(path: &Path, pdfium: Option<&Pdfium>) -> Result<(MediaItem, DynamicImage)> {
    let image = if mediasheet::is_pdf(path) {
        let pdfium = pdfium.ok_or_else(|| eyre!("pdfium library unavailable"))?;
        pdf::render_first_page(pdfium, path, SOURCE_DPI)?
    } else {
        media::open_oriented(path)?.image
    };
    let item = MediaItem::new(mediasheet::file_name(path), image.width(), image.height())?;
    Ok((item, image))
}

fn write_sheet(
    output_dir: &Path,
    folder: &str,
    item: &MediaItem,
    image: &DynamicImage,
    scaled: &ScaledItem,
) -> Result<PathBuf> {
    info!(
        "{}: {}x{} px -> {}x{} px at {} px/in",
        item.name, item.width, item.height, scaled.width, scaled.height, OUTPUT_DPI
    );

    let resized = image.resize_exact(scaled.width, scaled.height, FilterType::Lanczos3);
    let png = media::png_bytes(&resized)?;

    let size = item.physical_size(SOURCE_DPI);
    let entry = SheetEntry {
        name: item.name.clone(),
        folder: folder.to_string(),
        width: resized.width(),
        height: resized.height(),
        original_width: item.width,
        original_height: item.height,
        width_in: size.width_in,
        height_in: size.height_in,
    };
    let svg = sheet::render(&entry, &png);

    let stem = Path::new(&item.name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| item.name.clone());
    let out_path = output_dir.join(format!("{stem}_figma.svg"));
    fs::write(&out_path, svg).wrap_err_with(|| format!("Failed to write {}", out_path.display()))?;
    Ok(out_path)
}
