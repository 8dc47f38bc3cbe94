//! Batch scale normalization.
//!
//! Given the pixel dimensions of every item in a run, computes one global
//! scale factor and per-item output dimensions so that every item fits the
//! canvas limit, each item keeps its own aspect ratio, and a physically
//! larger source still comes out larger than a smaller one.

use eyre::{Result, bail};

/// One source image or rasterized page, identified by filename.
///
/// Dimensions are post-orientation. Zero-sized items are rejected here so
/// they never reach the batch maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl MediaItem {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            bail!("{}: zero-sized image ({}x{})", name, width, height);
        }
        Ok(MediaItem {
            name,
            width,
            height,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn physical_size(&self, source_dpi: f32) -> PhysicalSize {
        PhysicalSize {
            width_in: self.width as f32 / source_dpi,
            height_in: self.height as f32 / source_dpi,
        }
    }
}

/// Physical dimensions in inches at the assumed source DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSize {
    pub width_in: f32,
    pub height_in: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleOptions {
    /// DPI the source pixels are assumed to have been produced at.
    pub source_dpi: f32,
    /// DPI of the output canvas.
    pub output_dpi: f32,
    /// Maximum output side length in pixels, width or height.
    pub max_dimension: u32,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            source_dpi: crate::SOURCE_DPI,
            output_dpi: crate::OUTPUT_DPI,
            max_dimension: crate::MAX_SHEET_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledItem {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledBatch {
    /// The single factor applied to every item; 1.0 when everything already
    /// fits the canvas.
    pub factor: f32,
    pub items: Vec<ScaledItem>,
}

/// Computes output dimensions for the whole batch.
///
/// Fails on an empty batch (the factor would be undefined) and on any
/// zero-sized item; it does not guess.
pub fn normalize(items: &[MediaItem], opts: &ScaleOptions) -> Result<ScaledBatch> {
    if items.is_empty() {
        bail!("cannot normalize an empty batch");
    }

    let mut max_w = 0f32;
    let mut max_h = 0f32;
    let mut targets = Vec::with_capacity(items.len());
    for item in items {
        if item.width == 0 || item.height == 0 {
            bail!("{}: zero-sized image ({}x{})", item.name, item.width, item.height);
        }
        let size = item.physical_size(opts.source_dpi);
        let target_w = size.width_in * opts.output_dpi;
        let target_h = size.height_in * opts.output_dpi;
        max_w = max_w.max(target_w);
        max_h = max_h.max(target_h);
        targets.push((target_w, target_h));
    }

    let limit = opts.max_dimension as f32;
    let factor = if max_w <= limit && max_h <= limit {
        1.0
    } else {
        (limit / max_w).min(limit / max_h)
    };

    let scaled = items
        .iter()
        .zip(targets)
        .map(|(item, (target_w, target_h))| {
            let (width, height) =
                fit_box(item.aspect_ratio(), target_w * factor, target_h * factor);
            ScaledItem {
                name: item.name.clone(),
                width,
                height,
            }
        })
        .collect();

    Ok(ScaledBatch {
        factor,
        items: scaled,
    })
}

/// Fits an aspect ratio into a target box, keeping the limiting dimension
/// exact and rounding the other to the nearest pixel, never below 1.
fn fit_box(aspect: f32, box_w: f32, box_h: f32) -> (u32, u32) {
    let (w, h) = if box_w / box_h > aspect {
        // box is proportionally wider than the item: height limits
        (box_h * aspect, box_h)
    } else {
        (box_w, box_w / aspect)
    };
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ScaleOptions {
        ScaleOptions {
            source_dpi: 300.0,
            output_dpi: 100.0,
            max_dimension: 4096,
        }
    }

    fn item(name: &str, w: u32, h: u32) -> MediaItem {
        MediaItem::new(name, w, h).unwrap()
    }

    #[test]
    fn within_canvas_is_untouched() {
        let batch = normalize(&[item("a.png", 900, 1200)], &opts()).unwrap();
        assert_eq!(batch.factor, 1.0);
        assert_eq!(batch.items[0].width, 300);
        assert_eq!(batch.items[0].height, 400);
    }

    #[test]
    fn global_factor_applies_to_every_item() {
        // 15000 px at 300 dpi is 50 in, so a 5000 px unscaled target.
        let batch = normalize(
            &[item("big.png", 15000, 3000), item("small.png", 3000, 3000)],
            &opts(),
        )
        .unwrap();
        assert!((batch.factor - 4096.0 / 5000.0).abs() < 1e-6);
        assert_eq!(batch.items[0].width, 4096);
        // The companion scales by the same factor, not one re-derived from
        // its own size.
        assert_eq!(batch.items[1].width, 819);
        assert_eq!(batch.items[1].height, 819);
    }

    #[test]
    fn aspect_ratio_is_preserved_within_rounding() {
        let items = [
            item("a.png", 900, 1200),
            item("b.png", 12345, 678),
            item("c.png", 333, 14000),
            item("d.png", 20000, 20000),
        ];
        let batch = normalize(&items, &opts()).unwrap();
        for (original, scaled) in items.iter().zip(&batch.items) {
            let got = scaled.width as f32 / scaled.height as f32;
            let relative = (got - original.aspect_ratio()).abs() / original.aspect_ratio();
            let tolerance = 1.0 / scaled.width.min(scaled.height) as f32;
            assert!(
                relative < tolerance,
                "{}: {} vs {}",
                original.name,
                got,
                original.aspect_ratio()
            );
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let items = [item("a.png", 15000, 3000), item("b.png", 900, 1200)];
        let first = normalize(&items, &opts()).unwrap();
        let second = normalize(&items, &opts()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_item_exactly_at_limit_keeps_factor_one() {
        // 12288 px / 300 dpi * 100 dpi = 4096 exactly.
        let batch = normalize(&[item("edge.png", 12288, 12288)], &opts()).unwrap();
        assert_eq!(batch.factor, 1.0);
        assert_eq!(batch.items[0].width, 4096);
        assert_eq!(batch.items[0].height, 4096);
    }

    #[test]
    fn single_oversized_item_shrinks_to_fit() {
        let batch = normalize(&[item("huge.png", 24576, 12288)], &opts()).unwrap();
        assert!(batch.factor < 1.0);
        assert_eq!(batch.items[0].width, 4096);
        assert_eq!(batch.items[0].height, 2048);
    }

    #[test]
    fn maxima_are_tracked_per_axis() {
        // A tall item and a wide item both over the limit on different axes;
        // the factor must satisfy both at once.
        let batch = normalize(
            &[item("wide.png", 24576, 300), item("tall.png", 300, 36864)],
            &opts(),
        )
        .unwrap();
        assert!((batch.factor - 4096.0 / 12288.0).abs() < 1e-6);
        for scaled in &batch.items {
            assert!(scaled.width <= 4096 && scaled.height <= 4096);
        }
    }

    #[test]
    fn larger_source_stays_larger() {
        let batch = normalize(
            &[item("poster.png", 18000, 18000), item("card.png", 1050, 600)],
            &opts(),
        )
        .unwrap();
        assert!(batch.items[0].width > batch.items[1].width);
        assert!(batch.items[0].height > batch.items[1].height);
    }

    #[test]
    fn dimensions_never_round_to_zero() {
        let batch = normalize(
            &[item("sliver.png", 30000, 2), item("big.png", 30000, 30000)],
            &opts(),
        )
        .unwrap();
        assert!(batch.items[0].height >= 1);
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(normalize(&[], &opts()).is_err());
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(MediaItem::new("bad.png", 0, 100).is_err());
        assert!(MediaItem::new("bad.png", 100, 0).is_err());

        let broken = MediaItem {
            name: "bad.png".into(),
            width: 0,
            height: 100,
        };
        assert!(normalize(&[broken], &opts()).is_err());
    }

    #[test]
    fn physical_size_is_pixels_over_dpi() {
        let size = item("a.png", 900, 1200).physical_size(300.0);
        assert_eq!(size.width_in, 3.0);
        assert_eq!(size.height_in, 4.0);
    }
}
