use std::io::Cursor;
use std::path::Path;

use eyre::{Result, WrapErr};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use log::warn;

pub struct Decoded {
    pub image: DynamicImage,
    pub mode: &'static str,
    pub color_profile: String,
}

/// Opens an image file with its EXIF/TIFF orientation already applied, so
/// every dimension read afterwards is the displayed one.
pub fn open_oriented(path: &Path) -> Result<Decoded> {
    let mut decoder = ImageReader::open(path)
        .wrap_err_with(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .wrap_err_with(|| format!("Failed to probe format of {}", path.display()))?
        .into_decoder()
        .wrap_err_with(|| format!("Failed to decode {}", path.display()))?;

    let orientation = decoder.orientation().unwrap_or_else(|err| {
        warn!("{}: unreadable orientation tag: {err}", path.display());
        Orientation::NoTransforms
    });
    let icc = decoder.icc_profile().unwrap_or(None);

    let mut image = DynamicImage::from_decoder(decoder)
        .wrap_err_with(|| format!("Failed to decode {}", path.display()))?;
    image.apply_orientation(orientation);

    let mode = color_mode(image.color());
    let color_profile = match icc.as_deref() {
        Some(bytes) => {
            profile_description(bytes).unwrap_or_else(|| "Unknown Profile".to_string())
        }
        None => "Untagged".to_string(),
    };

    Ok(Decoded {
        image,
        mode,
        color_profile: sanitize(&color_profile),
    })
}

pub fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L16",
        ColorType::La16 => "LA16",
        ColorType::Rgb16 => "RGB16",
        ColorType::Rgba16 => "RGBA16",
        ColorType::Rgb32F => "RGB32F",
        ColorType::Rgba32F => "RGBA32F",
        _ => "Unknown",
    }
}

/// Aspect-preserving shrink into a `max_side` square. Images already inside
/// the box are returned as-is, never enlarged.
pub fn thumbnail(image: &DynamicImage, max_side: u32) -> DynamicImage {
    if image.width() <= max_side && image.height() <= max_side {
        image.clone()
    } else {
        image.resize(max_side, max_side, FilterType::Lanczos3)
    }
}

pub fn png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .wrap_err("Failed to encode PNG")?;
    Ok(buffer.into_inner())
}

/// Pulls the human-readable name out of an ICC profile's `desc` tag.
/// Handles textDescriptionType (v2 profiles) and multiLocalizedUnicodeType
/// (v4 profiles); anything else reads as unknown.
pub fn profile_description(icc: &[u8]) -> Option<String> {
    // 128-byte header, then the tag table: count, then 12-byte entries of
    // signature / offset / size.
    let tag_count = read_u32(icc, 128)? as usize;
    for i in 0..tag_count {
        let entry = 132 + i * 12;
        if icc.get(entry..entry + 4)? == b"desc" {
            let offset = read_u32(icc, entry + 4)? as usize;
            return parse_desc_tag(icc, offset);
        }
    }
    None
}

fn parse_desc_tag(icc: &[u8], start: usize) -> Option<String> {
    match icc.get(start..start + 4)? {
        b"desc" => {
            // type sig, reserved, ascii count (includes the trailing nul)
            let count = read_u32(icc, start + 8)? as usize;
            let bytes = icc.get(start + 12..start + 12 + count)?;
            let text: String = bytes
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect();
            (!text.is_empty()).then_some(text)
        }
        b"mluc" => {
            // type sig, reserved, record count, record size, then records of
            // language / country / byte length / offset from tag start.
            if read_u32(icc, start + 8)? == 0 {
                return None;
            }
            let length = read_u32(icc, start + 20)? as usize;
            let offset = read_u32(icc, start + 24)? as usize;
            let bytes = icc.get(start + offset..start + offset + length)?;
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            let text = String::from_utf16_lossy(&units)
                .trim_end_matches('\0')
                .to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Strips control characters that spreadsheet cells refuse.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}
