use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, eyre};

pub mod excel;
pub mod media;
pub mod pdf;
pub mod scale;
pub mod sheet;

pub use scale::{MediaItem, PhysicalSize, ScaleOptions, ScaledBatch, ScaledItem};

/// DPI the source material is assumed to have been scanned or exported at.
pub const SOURCE_DPI: f32 = 300.0;

/// Pixels per inch on the output scale sheets.
pub const OUTPUT_DPI: f32 = 100.0;

/// Figma rejects anything larger than this on either side.
pub const MAX_SHEET_DIMENSION: u32 = 4096;

/// Bounding box for spreadsheet thumbnails, in pixels.
pub const THUMBNAIL_SIZE: u32 = 256;

const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "pdf"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_pdf(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| ext == "pdf")
}

pub fn supported_extensions() -> String {
    SUPPORTED_EXTENSIONS.join(", ")
}

/// Lists the supported media files directly inside `dir`, sorted by name.
/// Subdirectories are not descended into.
pub fn media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(eyre!("'{}' is not a valid directory", dir.display()));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    files.sort();
    Ok(files)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Per-run outcome of a skip-and-continue batch: every input file either
/// converts or is recorded with the reason it was skipped.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub converted: usize,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converted(&mut self) {
        self.converted += 1;
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedFile {
            name: name.into(),
            reason: reason.to_string(),
        });
    }

    pub fn report(&self) {
        println!(
            "\nDone. {} file(s) converted, {} skipped.",
            self.converted,
            self.skipped.len()
        );
        for skipped in &self.skipped {
            println!("  skipped {}: {}", skipped.name, skipped.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported(Path::new("scan.png")));
        assert!(is_supported(Path::new("scan.JPG")));
        assert!(is_supported(Path::new("scan.TIFF")));
        assert!(is_supported(Path::new("doc.pdf")));
        assert!(!is_supported(Path::new("doc.svg")));
        assert!(!is_supported(Path::new("noextension")));
    }

    #[test]
    fn pdf_detection() {
        assert!(is_pdf(Path::new("doc.PDF")));
        assert!(!is_pdf(Path::new("scan.png")));
    }

    #[test]
    fn media_files_is_flat_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.pdf", "notes.txt", "c.JPEG"] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("d.png")).unwrap();

        let files = media_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["a.pdf", "b.png", "c.JPEG"]);
    }

    #[test]
    fn media_files_rejects_missing_directory() {
        assert!(media_files(Path::new("/nonexistent/surely")).is_err());
    }

    #[test]
    fn summary_counts_and_reasons() {
        let mut summary = RunSummary::new();
        summary.converted();
        summary.converted();
        summary.skip("bad.png", "decode failed");
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].name, "bad.png");
    }
}
