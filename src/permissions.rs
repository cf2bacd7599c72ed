//! Startup precondition checks.
//!
//! The preview frame is rewritten several times a second, so its directory
//! must be writable (ideally a ramdisk) before the booth starts.

use std::path::Path;

use crate::config::{BoothConfig, ConfigError};

/// Check whether the current process may write into `dir`.
#[cfg(unix)]
pub fn is_writable_dir(dir: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    if !dir.is_dir() {
        return false;
    }
    let Ok(c_path) = CString::new(dir.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_writable_dir(dir: &Path) -> bool {
    std::fs::metadata(dir)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false)
}

/// Verify the preview directory is writable.
pub fn check_preview_dir(config: &BoothConfig) -> Result<(), ConfigError> {
    let dir = config.preview_dir();
    if is_writable_dir(dir) {
        Ok(())
    } else {
        Err(ConfigError::PreviewDirNotWritable {
            dir: dir.to_path_buf(),
        })
    }
}

/// Create the capture store if it does not exist yet.
pub fn ensure_store_dir(config: &BoothConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&config.store_dir).map_err(|e| ConfigError::StoreDir {
        path: config.store_dir.clone(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tempdir_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable_dir(dir.path()));
    }

    #[test]
    fn test_missing_dir_is_not_writable() {
        assert!(!is_writable_dir(Path::new("/nonexistent/photobooth/preview")));
    }

    #[test]
    fn test_check_preview_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoothConfig {
            preview_path: dir.path().join("preview.jpg"),
            ..BoothConfig::default()
        };
        assert!(check_preview_dir(&config).is_ok());

        let config = BoothConfig {
            preview_path: PathBuf::from("/nonexistent/photobooth/preview.jpg"),
            ..BoothConfig::default()
        };
        match check_preview_dir(&config) {
            Err(ConfigError::PreviewDirNotWritable { dir }) => {
                assert_eq!(dir, PathBuf::from("/nonexistent/photobooth"))
            }
            other => panic!("Expected PreviewDirNotWritable, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_store_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoothConfig {
            store_dir: dir.path().join("a").join("images"),
            ..BoothConfig::default()
        };
        ensure_store_dir(&config).unwrap();
        assert!(config.store_dir.is_dir());
    }
}
