//! Pixel geometry for photo regions.
//!
//! Templates do not carry reliable column/row metrics through the reader, so
//! regions are sized from the default Excel cell metrics at 96 dpi. Images
//! are scaled to fit their region while preserving aspect ratio and are never
//! upscaled past their natural resolution.

/// Default column width in pixels (Excel standard width, 96 dpi).
pub const DEFAULT_COL_WIDTH_PX: u32 = 64;
/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 20;

/// Fallback region for a placeholder that is not part of a merged range.
pub const FALLBACK_REGION_COLS: u32 = 4;
pub const FALLBACK_REGION_ROWS: u32 = 14;

/// Overflow region per photo, appended below the last used row.
pub const OVERFLOW_REGION_COLS: u32 = 6;
pub const OVERFLOW_REGION_ROWS: u32 = 16;
/// Blank rows between overflow photos.
pub const OVERFLOW_GAP_ROWS: u32 = 2;

/// Pixel size of a cell region spanning `rows` x `cols` default cells.
pub fn region_px(rows: u32, cols: u32) -> (u32, u32) {
    (cols * DEFAULT_COL_WIDTH_PX, rows * DEFAULT_ROW_HEIGHT_PX)
}

/// Uniform scale fitting a `natural` image into a `target` box, capped at 1.0.
pub fn fit_scale(natural_w: u32, natural_h: u32, target_w: u32, target_h: u32) -> f64 {
    if natural_w == 0 || natural_h == 0 {
        return 1.0;
    }
    let sw = target_w as f64 / natural_w as f64;
    let sh = target_h as f64 / natural_h as f64;
    sw.min(sh).min(1.0)
}

/// Final embedded size for an image fitted into a target box.
pub fn scaled_size(natural_w: u32, natural_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let scale = fit_scale(natural_w, natural_h, target_w, target_h);
    (
        (natural_w as f64 * scale).round() as u32,
        (natural_h as f64 * scale).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_px() {
        assert_eq!(region_px(14, 4), (256, 280));
        assert_eq!(region_px(1, 1), (64, 20));
    }

    #[test]
    fn test_fit_scale_downscales() {
        // 4000x3000 photo into a 256x280 region: width is the binding side.
        let scale = fit_scale(4000, 3000, 256, 280);
        assert!((scale - 0.064).abs() < 1e-9);
    }

    #[test]
    fn test_fit_scale_never_upscales() {
        assert_eq!(fit_scale(100, 50, 1000, 1000), 1.0);
    }

    #[test]
    fn test_scaled_size_preserves_aspect() {
        let (w, h) = scaled_size(4000, 3000, 400, 400);
        assert_eq!(w, 400);
        assert_eq!(h, 300);
        assert!(w <= 400 && h <= 400);
    }

    #[test]
    fn test_scaled_size_degenerate_input() {
        assert_eq!(scaled_size(0, 0, 400, 400), (0, 0));
    }
}
