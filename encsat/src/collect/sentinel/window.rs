use anyhow::{Context, Result};
use image::RgbImage;

use super::tile_collect::TileSource;

/// Assemble a `width` x `height` window whose top-left corner is global pixel (x, y)
/// Every tile the window overlaps is fetched once and the overlapping part copied in
pub fn load_window<S: TileSource + ?Sized>(
    source: &S,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let tile_size = source.tile_size() as i64;
    let mut window = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return Ok(window);
    }

    let (x_end, y_end) = x
        .checked_add(width as i64)
        .zip(y.checked_add(height as i64))
        .context("Window lies outside the pixel grid")?;

    for col in x.div_euclid(tile_size)..=(x_end - 1).div_euclid(tile_size) {
        for row in y.div_euclid(tile_size)..=(y_end - 1).div_euclid(tile_size) {
            let tile = source
                .fetch_tile(col, row)
                .with_context(|| format!("Failed to fetch tile col={} row={}", col, row))?;

            let tile_x = col * tile_size;
            let tile_y = row * tile_size;

            // Intersection of the window and this tile, in global pixels
            let left = x.max(tile_x);
            let top = y.max(tile_y);
            let right = x_end.min(tile_x.saturating_add(tile_size));
            let bottom = y_end.min(tile_y.saturating_add(tile_size));

            for gy in top..bottom {
                for gx in left..right {
                    let (sx, sy) = ((gx - tile_x) as u32, (gy - tile_y) as u32);
                    if sx >= tile.width() || sy >= tile.height() {
                        continue;
                    }
                    let pixel = *tile.get_pixel(sx, sy);
                    window.put_pixel((gx - x) as u32, (gy - y) as u32, pixel);
                }
            }
        }
    }

    Ok(window)
}
