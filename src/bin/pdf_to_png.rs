use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use log::info;

use mediasheet::{SOURCE_DPI, pdf};

/// Rasterize every page of a PDF into numbered PNG files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the PDF to convert
    pdf: PathBuf,

    /// Output directory (default: a <name>_pngs directory beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render resolution in DPI
    #[arg(long, default_value_t = SOURCE_DPI)]
    dpi: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.pdf.is_file() {
        return Err(eyre!("File {} does not exist", args.pdf.display()));
    }
    let stem = args
        .pdf
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| eyre!("{} has no file name", args.pdf.display()))?;
    let output_dir = args
        .output
        .unwrap_or_else(|| args.pdf.with_file_name(format!("{stem}_pngs")));
    fs::create_dir_all(&output_dir)
        .wrap_err_with(|| format!("Failed to create {}", output_dir.display()))?;

    println!("Converting {} to PNG images...", args.pdf.display());
    let pdfium = pdf::bind()?;
    let pages = pdf::render_pages(&pdfium, &args.pdf, args.dpi)?;

    for (index, page) in pages.iter().enumerate() {
        let path = output_dir.join(format!("page_{:03}.png", index + 1));
        page.save(&path)
            .wrap_err_with(|| format!("Failed to save {}", path.display()))?;
        info!("saved page {} to {}", index + 1, path.display());
    }

    println!("\nConversion complete! {} pages converted.", pages.len());
    println!("Images saved in: {}", output_dir.display());
    Ok(())
}
