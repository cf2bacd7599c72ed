//! Display and text-entry collaborators used by the booth.
//!
//! The booth draws through [`Renderer`] and asks for email addresses through
//! [`TextEntry`]. Concrete terminal implementations live in
//! [`crate::terminal`]; tests substitute recording fakes.

mod preview;

pub use preview::{prepare_preview, PreparedFrame};

use image::RgbImage;

use crate::bridge::BoothEvent;
use crate::geometry::Dimensions;

/// Overlay text sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Small,
    /// Call-to-action banner
    Large,
    /// Countdown digits
    Huge,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Display I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-tick drawing surface and local input source.
pub trait Renderer {
    /// Drawable area in pixels.
    fn screen_size(&self) -> Dimensions;

    /// Collect local input (keyboard, window close) since the last poll.
    fn poll_events(&mut self) -> Result<Vec<BoothEvent>, RenderError>;

    /// Blit a frame with its top-left corner at `(x, y)`; may be off-screen.
    fn draw_frame(&mut self, frame: &RgbImage, x: i64, y: i64) -> Result<(), RenderError>;

    /// Draw outlined text centered on screen.
    fn draw_centered_text(&mut self, text: &str, style: TextStyle) -> Result<(), RenderError>;

    /// Leave or re-enter fullscreen, used around modal prompts.
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), RenderError>;

    /// Flip the finished frame to the display.
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Blocking modal text prompt. `None` means the guest cancelled.
pub trait TextEntry {
    fn prompt(&mut self, title: &str, message: &str) -> Option<String>;
}
