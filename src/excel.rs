use std::path::Path;

use eyre::{Result, WrapErr};
use rust_xlsxwriter::{Format, FormatAlign, Image, Workbook};

/// One worksheet row: the thumbnail plus the metadata columns.
pub struct MediaRow {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub width_in: f32,
    pub height_in: f32,
    pub mode: String,
    pub format: String,
    pub color_profile: String,
    pub thumbnail_png: Vec<u8>,
}

const HEADERS: [&str; 10] = [
    "Image",
    "Filename",
    "Width (px)",
    "Height (px)",
    "Width (in) @ 300 DPI",
    "Height (in) @ 300 DPI",
    "Print Dimensions @ 300DPI",
    "Mode",
    "Format",
    "Color Profile",
];

/// Row height in points that fits a 256 px thumbnail.
const ROW_HEIGHT: f64 = 192.0;

/// Width of the thumbnail column, which autofit must not squeeze.
const IMAGE_COLUMN_WIDTH: f64 = 35.0;

pub fn write_workbook(rows: &[MediaRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Media Info")?;

    let header_format = Format::new().set_bold();
    let cell_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = (index + 1) as u32;
        let thumbnail = Image::new_from_buffer(&row.thumbnail_png)
            .wrap_err_with(|| format!("{}: unusable thumbnail image", row.filename))?;
        worksheet.set_row_height(r, ROW_HEIGHT)?;
        worksheet.insert_image(r, 0, &thumbnail)?;

        worksheet.write_string_with_format(r, 1, &row.filename, &cell_format)?;
        worksheet.write_number_with_format(r, 2, row.width as f64, &cell_format)?;
        worksheet.write_number_with_format(r, 3, row.height as f64, &cell_format)?;
        worksheet.write_number_with_format(r, 4, round2(row.width_in), &cell_format)?;
        worksheet.write_number_with_format(r, 5, round2(row.height_in), &cell_format)?;
        let print_dims = format!("{:.2}\" x {:.2}\"", row.width_in, row.height_in);
        worksheet.write_string_with_format(r, 6, &print_dims, &cell_format)?;
        worksheet.write_string_with_format(r, 7, &row.mode, &cell_format)?;
        worksheet.write_string_with_format(r, 8, &row.format, &cell_format)?;
        worksheet.write_string_with_format(r, 9, &row.color_profile, &cell_format)?;
    }

    // Fit the text columns to their content; the image column keeps a fixed
    // width since autofit only sees cell text.
    worksheet.autofit();
    worksheet.set_column_width(0, IMAGE_COLUMN_WIDTH)?;

    workbook
        .save(path)
        .wrap_err_with(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

fn round2(value: f32) -> f64 {
    (value as f64 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media;
    use image::{DynamicImage, RgbaImage};

    fn row(name: &str) -> MediaRow {
        let thumb = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        MediaRow {
            filename: name.to_string(),
            width: 900,
            height: 1200,
            width_in: 3.0,
            height_in: 4.0,
            mode: "RGBA".to_string(),
            format: "PNG".to_string(),
            color_profile: "Untagged".to_string(),
            thumbnail_png: media::png_bytes(&thumb).unwrap(),
        }
    }

    #[test]
    fn writes_a_workbook_with_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media_info.xlsx");
        write_workbook(&[row("a.png"), row("b.png")], &path).unwrap();
        let written = std::fs::metadata(&path).unwrap();
        assert!(written.len() > 0);
    }

    #[test]
    fn writes_headers_even_for_an_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_workbook(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rejects_garbage_thumbnail_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = row("bad.png");
        bad.thumbnail_png = vec![0, 1, 2, 3];
        let result = write_workbook(&[bad], &dir.path().join("bad.xlsx"));
        assert!(result.is_err());
    }

    #[test]
    fn rounds_inches_to_cell_precision() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.0), 2.0);
    }
}
