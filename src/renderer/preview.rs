//! Live-view presentation: orient, fit to screen width, optionally dim.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::compositor::Rotation;
use crate::geometry::Dimensions;

/// A preview ready to blit at `(0, offset_y)`.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub image: RgbImage,
    pub offset_y: i64,
}

/// Turn a raw camera preview into what the screen shows.
///
/// The frame is rotated, scaled to the screen width keeping its aspect ratio
/// and vertically centered. When `dim` is set the frame is cropped to the
/// visible window and every channel is halved, which reads as a dark overlay
/// behind the call-to-action text.
pub fn prepare_preview(
    frame: &RgbImage,
    rotation: Rotation,
    screen: Dimensions,
    dim: bool,
) -> PreparedFrame {
    let oriented = rotation.apply(frame.clone());
    let (width, height) = oriented.dimensions();
    if width == 0 || height == 0 || screen.width == 0 || screen.height == 0 {
        return PreparedFrame {
            image: RgbImage::new(0, 0),
            offset_y: 0,
        };
    }

    let new_height = ((screen.width as f64 * height as f64 / width as f64) as u32).max(1);
    // Nearest is noticeably cheaper than smooth scaling at preview rates
    let scaled = imageops::resize(&oriented, screen.width, new_height, FilterType::Nearest);
    let tb_crop = (new_height as i64 - screen.height as i64) / 2;

    if !dim {
        return PreparedFrame {
            image: scaled,
            offset_y: -tb_crop,
        };
    }

    let mut visible = if tb_crop > 0 {
        imageops::crop_imm(&scaled, 0, tb_crop as u32, screen.width, screen.height).to_image()
    } else {
        scaled
    };
    for pixel in visible.pixels_mut() {
        pixel.0 = pixel.0.map(|c| c / 2);
    }
    PreparedFrame {
        image: visible,
        offset_y: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_tall_preview_is_centered() {
        // 4x2 landscape -> 2x4 portrait, screen 2x2 => 1 row overflow each side
        let frame = RgbImage::from_pixel(4, 2, Rgb([100, 100, 100]));
        let prepared = prepare_preview(&frame, Rotation::Clockwise90, Dimensions::new(2, 2), false);
        assert_eq!(prepared.image.dimensions(), (2, 4));
        assert_eq!(prepared.offset_y, -1);
    }

    #[test]
    fn test_dim_crops_and_halves() {
        let mut frame = RgbImage::from_pixel(2, 4, Rgb([200, 100, 51]));
        // Mark the first row, which falls outside the visible window
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([255, 0, 0]));

        let prepared = prepare_preview(&frame, Rotation::None, Dimensions::new(2, 2), true);
        assert_eq!(prepared.image.dimensions(), (2, 2));
        assert_eq!(prepared.offset_y, 0);
        for pixel in prepared.image.pixels() {
            assert_eq!(pixel, &Rgb([100, 50, 25]));
        }
    }

    #[test]
    fn test_dim_short_preview_keeps_full_frame() {
        let frame = RgbImage::from_pixel(4, 1, Rgb([10, 11, 12]));
        let prepared = prepare_preview(&frame, Rotation::None, Dimensions::new(4, 4), true);
        assert_eq!(prepared.image.dimensions(), (4, 1));
        assert_eq!(prepared.image.get_pixel(0, 0), &Rgb([5, 5, 6]));
    }

    #[test]
    fn test_empty_screen_yields_empty_frame() {
        let frame = RgbImage::new(4, 4);
        let prepared = prepare_preview(&frame, Rotation::None, Dimensions::new(0, 10), false);
        assert_eq!(prepared.image.dimensions(), (0, 0));
    }
}
