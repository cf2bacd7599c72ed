//! Camera driver interface and error types.

use image::RgbImage;
use std::path::{Path, PathBuf};

/// Preview and still-capture primitives the booth needs from a camera.
///
/// Both calls block the caller. A slow camera is absorbed by the longer
/// post-capture phase in the shoot sequencer rather than by polling.
pub trait CameraDriver {
    /// Grab a low-resolution live view frame.
    fn capture_preview(&mut self) -> Result<RgbImage, CameraError>;

    /// Take a full-resolution still and write it to `path`.
    fn capture_still(&mut self, path: &Path) -> Result<(), CameraError>;
}

impl<T: CameraDriver + ?Sized> CameraDriver for Box<T> {
    fn capture_preview(&mut self) -> Result<RgbImage, CameraError> {
        (**self).capture_preview()
    }

    fn capture_still(&mut self, path: &Path) -> Result<(), CameraError> {
        (**self).capture_still(path)
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Camera tool is not installed
    #[error("{} not found. Please install gphoto2", .0.display())]
    ToolNotFound(PathBuf),

    /// Still capture failed (device busy, I/O error, ...)
    #[error("Capture to '{}' failed: {message}", path.display())]
    CaptureFailed { path: PathBuf, message: String },

    /// Live view frame could not be grabbed
    #[error("Preview capture failed: {0}")]
    PreviewFailed(String),

    /// Preview frame was written but is not a readable image
    #[error("Failed to decode preview '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Camera I/O error: {0}")]
    Io(#[from] std::io::Error),
}
