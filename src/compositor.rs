//! Lays a session's captures into the printable strip template.
//!
//! Each capture is rotated to the template's orientation, cover-scaled into
//! its slot, center-cropped to the exact slot size and pasted at the slot's
//! top-left corner. A strip is only written when every slot was filled.

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::geometry::{resize_transform, Dimensions, GeometryError};

/// Fixed rotation applied to every capture before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    None,
    /// Landscape camera output turned to portrait
    #[default]
    Clockwise90,
    Half,
    Counterclockwise90,
}

impl Rotation {
    pub fn apply(self, image: RgbImage) -> RgbImage {
        match self {
            Rotation::None => image,
            Rotation::Clockwise90 => imageops::rotate90(&image),
            Rotation::Half => imageops::rotate180(&image),
            Rotation::Counterclockwise90 => imageops::rotate270(&image),
        }
    }
}

/// One photo position on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    pub size: Dimensions,
}

/// Background image plus the ordered slots photos are pasted into.
#[derive(Debug, Clone)]
pub struct StripTemplate {
    background: RgbImage,
    slots: Vec<Slot>,
    rotation: Rotation,
}

impl StripTemplate {
    pub fn new(background: RgbImage, slots: Vec<Slot>, rotation: Rotation) -> Self {
        Self {
            background,
            slots,
            rotation,
        }
    }

    /// Build slots of a common size from their top-left corners.
    pub fn uniform_slots(origins: &[[u32; 2]], size: Dimensions) -> Vec<Slot> {
        origins
            .iter()
            .map(|[x, y]| Slot { x: *x, y: *y, size })
            .collect()
    }

    /// Load the background image from disk.
    pub fn load(
        path: &Path,
        slots: Vec<Slot>,
        rotation: Rotation,
    ) -> Result<Self, image::ImageError> {
        let background = image::open(path)?.to_rgb8();
        log::info!(
            "Loaded strip template {} ({}x{}, {} slots)",
            path.display(),
            background.width(),
            background.height(),
            slots.len()
        );
        Ok(Self::new(background, slots, rotation))
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// Errors that abort a strip.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("Template has {slots} slot(s) but {images} image(s) were supplied")]
    TemplateMismatch { images: usize, slots: usize },

    #[error("Failed to decode '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to fit '{}' into its slot: {source}", path.display())]
    Geometry {
        path: PathBuf,
        source: GeometryError,
    },

    #[error("Failed to write strip '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Composites captures into the strip template.
#[derive(Debug, Clone)]
pub struct StripCompositor {
    template: StripTemplate,
    filter: FilterType,
}

impl StripCompositor {
    pub fn new(template: StripTemplate) -> Self {
        Self {
            template,
            filter: FilterType::Lanczos3,
        }
    }

    /// Fill every slot with the matching image, in order.
    ///
    /// Fails without producing anything if the counts differ or any image
    /// cannot be decoded.
    pub fn compose(&self, images: &[PathBuf]) -> Result<RgbImage, CompositeError> {
        let slots = self.template.slots();
        if images.len() != slots.len() {
            return Err(CompositeError::TemplateMismatch {
                images: images.len(),
                slots: slots.len(),
            });
        }

        let mut canvas = self.template.background.clone();
        for (path, slot) in images.iter().zip(slots) {
            let piece = self.fit(path, slot.size)?;
            imageops::replace(&mut canvas, &piece, slot.x as i64, slot.y as i64);
        }
        Ok(canvas)
    }

    /// Compose and write the strip to `output`, returning the written path.
    pub fn compose_to(
        &self,
        images: &[PathBuf],
        output: &Path,
    ) -> Result<PathBuf, CompositeError> {
        let canvas = self.compose(images)?;
        canvas.save(output).map_err(|e| CompositeError::Encode {
            path: output.to_path_buf(),
            source: e,
        })?;
        Ok(output.to_path_buf())
    }

    /// Decode, orient, cover-scale and center-crop one capture to `size`.
    fn fit(&self, path: &Path, size: Dimensions) -> Result<RgbImage, CompositeError> {
        let decoded = image::open(path).map_err(|e| CompositeError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?;
        let oriented = self.template.rotation.apply(decoded.to_rgb8());

        let transform = resize_transform(Dimensions::of(&oriented), size).map_err(|e| {
            CompositeError::Geometry {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        let scaled = imageops::resize(
            &oriented,
            transform.scaled.width,
            transform.scaled.height,
            self.filter,
        );
        let (x, y) = transform.crop_origin();
        Ok(imageops::crop_imm(&scaled, x, y, size.width, size.height).to_image())
    }
}
