//! Camera driver backed by the `gphoto2` command-line tool.

use image::RgbImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use super::types::{CameraDriver, CameraError};

/// Drives a tethered DSLR through `gphoto2`.
///
/// Preview frames are staged at `preview_path` (ideally on a ramdisk) and
/// decoded from there.
#[derive(Debug, Clone)]
pub struct GphotoCamera {
    binary: PathBuf,
    preview_path: PathBuf,
}

impl GphotoCamera {
    pub fn new(binary: impl Into<PathBuf>, preview_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            preview_path: preview_path.into(),
        }
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    fn preview_args(&self) -> Vec<OsString> {
        vec![
            "--capture-preview".into(),
            "--filename".into(),
            self.preview_path.clone().into_os_string(),
            "--force-overwrite".into(),
        ]
    }

    fn still_args(path: &Path) -> Vec<OsString> {
        vec![
            "--capture-image-and-download".into(),
            "--filename".into(),
            path.as_os_str().to_os_string(),
            "--force-overwrite".into(),
        ]
    }

    /// Run gphoto2 to completion, returning stderr text on failure.
    fn run(&self, args: &[OsString]) -> Result<Result<(), String>, CameraError> {
        let output: Output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CameraError::ToolNotFound(self.binary.clone())
                } else {
                    CameraError::Io(e)
                }
            })?;

        if output.status.success() {
            return Ok(Ok(()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        for line in stderr.lines() {
            log::debug!("[gphoto2] {}", line);
        }
        Ok(Err(format!("exit code {:?}: {}", output.status.code(), stderr)))
    }
}

impl CameraDriver for GphotoCamera {
    fn capture_preview(&mut self) -> Result<RgbImage, CameraError> {
        self.run(&self.preview_args())?
            .map_err(CameraError::PreviewFailed)?;

        let image = image::open(&self.preview_path).map_err(|e| CameraError::Decode {
            path: self.preview_path.clone(),
            source: e,
        })?;
        Ok(image.to_rgb8())
    }

    fn capture_still(&mut self, path: &Path) -> Result<(), CameraError> {
        self.run(&Self::still_args(path))?
            .map_err(|message| CameraError::CaptureFailed {
                path: path.to_path_buf(),
                message,
            })?;
        log::info!("Captured {}", path.display());
        Ok(())
    }
}
