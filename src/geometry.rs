//! Cover-scaling math for fitting camera images into fixed print slots.
//!
//! The source is scaled so it fully covers the target rectangle and the
//! excess is cropped evenly from both sides of the overflowing axis.

use std::fmt;

/// Width and height in pixels. Both are strictly positive once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an image buffer.
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    fn validate(self) -> Result<Self, GeometryError> {
        if self.width == 0 || self.height == 0 {
            return Err(GeometryError::InvalidDimensions(format!(
                "{} has a zero component",
                self
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Accepts an untyped `[w, h]` pair, as read from configuration files.
impl TryFrom<&[i64]> for Dimensions {
    type Error = GeometryError;

    fn try_from(pair: &[i64]) -> Result<Self, Self::Error> {
        let [width, height] = pair else {
            return Err(GeometryError::InvalidDimensions(format!(
                "expected exactly two dimensions, got {}",
                pair.len()
            )));
        };
        let convert = |v: i64| -> Result<u32, GeometryError> {
            u32::try_from(v)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    GeometryError::InvalidDimensions(format!("{} is not a positive dimension", v))
                })
        };
        Ok(Self {
            width: convert(*width)?,
            height: convert(*height)?,
        })
    }
}

/// Result of [`resize_transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeTransform {
    /// Uniform scale factor applied to the source
    pub scale: f64,
    /// Source dimensions after scaling
    pub scaled: Dimensions,
    /// Pixels to remove on each axis so the scaled image equals the target
    pub crop: Dimensions,
}

impl ResizeTransform {
    /// Top-left corner of the centered crop window inside the scaled image.
    pub fn crop_origin(&self) -> (u32, u32) {
        (self.crop.width / 2, self.crop.height / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Compute the cover-scale dimensions and crop needed to fit `current` into `desired`.
///
/// The scale factor is the larger of the two per-axis ratios, so the scaled
/// image is never smaller than `desired` on either axis. Rounding artifacts
/// that would leave an axis a pixel short are clamped up to `desired`.
pub fn resize_transform(
    current: Dimensions,
    desired: Dimensions,
) -> Result<ResizeTransform, GeometryError> {
    let current = current.validate()?;
    let desired = desired.validate()?;

    let w_ratio = desired.width as f64 / current.width as f64;
    let h_ratio = desired.height as f64 / current.height as f64;
    let scale = w_ratio.max(h_ratio);

    let scaled = Dimensions {
        width: scale_axis(current.width, scale).max(desired.width),
        height: scale_axis(current.height, scale).max(desired.height),
    };
    let crop = Dimensions {
        width: scaled.width.saturating_sub(desired.width),
        height: scaled.height.saturating_sub(desired.height),
    };

    Ok(ResizeTransform {
        scale,
        scaled,
        crop,
    })
}

fn scale_axis(length: u32, scale: f64) -> u32 {
    (length as f64 * scale).round().min(u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let dims = Dimensions::new(533, 833);
        let t = resize_transform(dims, dims).unwrap();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.scaled, dims);
        assert_eq!(t.crop, Dimensions::new(0, 0));
    }

    #[test]
    fn test_landscape_into_portrait_crops_width() {
        // 3:2 camera frame already rotated to portrait (2000x3000) into 533x833
        let t = resize_transform(Dimensions::new(2000, 3000), Dimensions::new(533, 833)).unwrap();
        assert_eq!(t.scaled.height, 833);
        assert_eq!(t.scaled.width, 555);
        assert_eq!(t.crop, Dimensions::new(22, 0));
        assert_eq!(t.crop_origin(), (11, 0));
    }

    #[test]
    fn test_upscales_small_source() {
        let t = resize_transform(Dimensions::new(10, 10), Dimensions::new(40, 20)).unwrap();
        assert_eq!(t.scale, 4.0);
        assert_eq!(t.scaled, Dimensions::new(40, 40));
        assert_eq!(t.crop, Dimensions::new(0, 20));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = resize_transform(Dimensions::new(0, 10), Dimensions::new(5, 5)).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidDimensions(_)));

        let err = resize_transform(Dimensions::new(10, 10), Dimensions::new(5, 0)).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidDimensions(_)));
    }

    #[test]
    fn test_try_from_pair() {
        let dims = Dimensions::try_from(&[533i64, 833][..]).unwrap();
        assert_eq!(dims, Dimensions::new(533, 833));
    }

    #[test]
    fn test_try_from_wrong_length() {
        assert!(Dimensions::try_from(&[1i64][..]).is_err());
        assert!(Dimensions::try_from(&[1i64, 2, 3][..]).is_err());
    }

    #[test]
    fn test_try_from_non_positive() {
        assert!(Dimensions::try_from(&[0i64, 5][..]).is_err());
        assert!(Dimensions::try_from(&[5i64, -3][..]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640x480");
    }
}
