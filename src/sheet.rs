use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Height of the metadata backdrop at the top of each sheet, in pixels.
const OVERLAY_HEIGHT: u32 = 200;

/// Gap between the image and the below-image metadata block.
const TEXT_GAP: u32 = 50;

/// Everything the dimension overlay on one scale sheet shows. `width` and
/// `height` are the embedded raster's final (normalized) dimensions; the
/// original fields describe the source before scaling.
pub struct SheetEntry {
    pub name: String,
    pub folder: String,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub width_in: f32,
    pub height_in: f32,
}

/// Renders the Figma-ready SVG: the PNG embedded as a base64 data URI, a
/// semi-transparent metadata overlay on top and a plain-text copy below.
pub fn render(entry: &SheetEntry, png: &[u8]) -> String {
    let data = STANDARD.encode(png);
    let (base_size, small_size) = font_sizes(entry.width, entry.height);
    let width = entry.width;
    let height = entry.height;
    let total_height = height + OVERLAY_HEIGHT + TEXT_GAP;
    let bottom_offset = height + TEXT_GAP;
    let name = escape_xml(&entry.name);
    let folder = escape_xml(&entry.folder);
    let original = format!(
        "Original: {}x{} px | {:.2}in x {:.2}in",
        entry.original_width, entry.original_height, entry.width_in, entry.height_in
    );

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{width}" height="{total_height}" viewBox="0 0 {width} {total_height}" xmlns="http://www.w3.org/2000/svg">
    <image width="{width}" height="{height}" href="data:image/png;base64,{data}"/>
    <g id="TOP_METADATA_{name}">
        <rect width="{width}" height="{OVERLAY_HEIGHT}" fill="rgba(0,0,0,0.7)"/>
        <text x="20" y="70" fill="white" font-family="Arial" font-size="{base_size}">{name}</text>
        <text x="20" y="120" fill="white" font-family="Arial" font-size="{small_size}">Folder: {folder}</text>
        <text x="20" y="170" fill="white" font-family="Arial" font-size="{small_size}">{original}</text>
    </g>
    <g id="BOTTOM_METADATA_{name}" transform="translate(0, {bottom_offset})">
        <text x="20" y="70" fill="black" font-family="Arial" font-size="{base_size}">{name}</text>
        <text x="20" y="120" fill="black" font-family="Arial" font-size="{small_size}">Folder: {folder}</text>
        <text x="20" y="170" fill="black" font-family="Arial" font-size="{small_size}">{original}</text>
    </g>
</svg>
"#
    )
}

/// Overlay text scales with the sheet: the headline between 48 and 96 px,
/// the detail lines one step down but never below 48.
fn font_sizes(width: u32, height: u32) -> (u32, u32) {
    let base = (width.min(height) / 10).clamp(48, 96);
    let small = base.saturating_sub(48).max(48);
    (base, small)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
