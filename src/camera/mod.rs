//! Camera access for the booth.
//!
//! This module provides:
//! - The driver interface via [`CameraDriver`]
//! - A gphoto2-backed implementation via [`GphotoCamera`]

mod gphoto;
mod types;

pub use gphoto::GphotoCamera;
pub use types::{CameraDriver, CameraError};
