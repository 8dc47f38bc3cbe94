use std::path::Path;

use eyre::{Result, WrapErr, eyre};
use image::DynamicImage;
use pdfium_render::prelude::*;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Binds the pdfium library, preferring a copy next to the executable over a
/// system-wide install.
pub fn bind() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .wrap_err("Failed to bind to the pdfium library")?;
    Ok(Pdfium::new(bindings))
}

fn render_config(dpi: f32) -> PdfRenderConfig {
    PdfRenderConfig::new().scale_page_by_factor(dpi / POINTS_PER_INCH)
}

/// Rasterizes every page at `dpi`, in page order.
pub fn render_pages(pdfium: &Pdfium, path: &Path, dpi: f32) -> Result<Vec<DynamicImage>> {
    let document = pdfium
        .load_pdf_from_file(path, None)
        .wrap_err_with(|| format!("Failed to load PDF {}", path.display()))?;
    let config = render_config(dpi);

    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let bitmap = page.render_with_config(&config).wrap_err_with(|| {
            format!("Failed to render page {} of {}", index + 1, path.display())
        })?;
        pages.push(bitmap.as_image());
    }
    Ok(pages)
}

/// Rasterizes only the first page, the stand-in image for a whole document.
pub fn render_first_page(pdfium: &Pdfium, path: &Path, dpi: f32) -> Result<DynamicImage> {
    let document = pdfium
        .load_pdf_from_file(path, None)
        .wrap_err_with(|| format!("Failed to load PDF {}", path.display()))?;
    if document.pages().len() == 0 {
        return Err(eyre!("{} has no pages", path.display()));
    }
    let page = document
        .pages()
        .get(0)
        .wrap_err_with(|| format!("Failed to get first page of {}", path.display()))?;
    let bitmap = page
        .render_with_config(&render_config(dpi))
        .wrap_err_with(|| format!("Failed to render first page of {}", path.display()))?;
    Ok(bitmap.as_image())
}
