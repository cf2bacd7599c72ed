//! Configuration file handling for the booth.
//!
//! Loads configuration from `$PHOTOBOOTH_CONFIG`, or from
//! `~/.config/photobooth/config.toml` when the variable is unset. Every
//! field has a built-in default so a missing file is not an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compositor::Rotation;
use crate::geometry::{Dimensions, GeometryError};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PHOTOBOOTH_CONFIG";

/// Environment variable holding the SMTP password.
pub const SMTP_PASSWORD_ENV: &str = "PHOTOBOOTH_SMTP_PASSWORD";

/// Top-level booth configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Where the camera preview frame is staged (should live on a ramdisk)
    pub preview_path: PathBuf,
    /// Directory receiving captures and strips
    pub store_dir: PathBuf,
    pub save_prefix: String,
    pub strip_suffix: String,
    /// Restore fullscreen around the email prompt
    pub fullscreen: bool,
    pub timing: TimingConfig,
    pub shoot: ShootConfig,
    pub template: TemplateConfig,
    pub mail: MailConfig,
    pub serial: SerialConfig,
    pub camera: CameraConfig,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            preview_path: PathBuf::from("/mnt/tmp/preview.jpg"),
            store_dir: PathBuf::from("images"),
            save_prefix: "Booth".to_string(),
            strip_suffix: "Strip".to_string(),
            fullscreen: false,
            timing: TimingConfig::default(),
            shoot: ShootConfig::default(),
            template: TemplateConfig::default(),
            mail: MailConfig::default(),
            serial: SerialConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds the "Get Ready!" prompt stays up
    pub ready_wait_secs: f64,
    /// Seconds between 3..2..1
    pub countdown_wait_secs: f64,
    /// Render rate while waiting for a guest
    pub idle_fps: u32,
    /// Render rate during a shoot
    pub shooting_fps: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ready_wait_secs: 5.0,
            countdown_wait_secs: 1.0,
            idle_fps: 5,
            shooting_fps: 60,
        }
    }
}

/// Longest phase duration accepted from the config file.
const MAX_PHASE_SECS: f64 = 3600.0;

impl TimingConfig {
    pub fn ready_wait(&self) -> Duration {
        phase_duration(self.ready_wait_secs)
    }

    pub fn countdown_wait(&self) -> Duration {
        phase_duration(self.countdown_wait_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("timing.ready_wait_secs", self.ready_wait_secs),
            ("timing.countdown_wait_secs", self.countdown_wait_secs),
        ] {
            if !secs.is_finite() || !(0.0..=MAX_PHASE_SECS).contains(&secs) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0 and {} seconds, got {}",
                    name, MAX_PHASE_SECS, secs
                )));
            }
        }
        if self.idle_fps == 0 || self.shooting_fps == 0 {
            return Err(ConfigError::Invalid(
                "timing fps values must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unvalidated values never panic: NaN and negatives become zero, overflow saturates.
fn phase_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_PHASE_SECS)).unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShootConfig {
    /// Photos per session
    pub shot_count: u32,
    /// Consecutive capture failures tolerated before the session is abandoned
    pub max_capture_attempts: u32,
}

impl Default for ShootConfig {
    fn default() -> Self {
        Self {
            shot_count: 3,
            max_capture_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Background image for the printed strip
    pub path: PathBuf,
    /// Size of every photo slot, `[width, height]`
    pub slot_size: Vec<i64>,
    /// Top-left corner of each slot, in shot order
    pub slots: Vec<[u32; 2]>,
    /// Rotation normalizing camera output to the slot orientation
    pub rotation: Rotation,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("photobooth_template_portrait.jpg"),
            slot_size: vec![533, 833],
            slots: vec![[60, 60], [607, 60], [60, 907]],
            rotation: Rotation::Clockwise90,
        }
    }
}

impl TemplateConfig {
    pub fn slot_dimensions(&self) -> Result<Dimensions, GeometryError> {
        Dimensions::try_from(self.slot_size.as_slice())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub from: String,
    /// SMTP relay, contacted with STARTTLS
    pub host: String,
    pub port: Option<u16>,
    /// Defaults to `from` when unset
    pub username: Option<String>,
    /// Name announced in EHLO
    pub client_name: String,
    pub subject: String,
    pub body: String,
    /// Addresses ending in this suffix are never mailed
    pub excluded_domain: String,
    /// Address guests type to opt out
    pub null_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: "auto-mailer@newport.net.nz".to_string(),
            host: "mail.newport.net.nz".to_string(),
            port: None,
            username: None,
            client_name: "photobooth".to_string(),
            subject: "Your Photobooth Strip!".to_string(),
            body: "Thanks for coming along to our party!\nYour photobooth strip is attached"
                .to_string(),
            excluded_domain: "example.com".to_string(),
            null_address: "null@catalyst.net.nz".to_string(),
        }
    }
}

impl MailConfig {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.from)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device the button controller reports on
    pub device: PathBuf,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyACM0"),
            baud_rate: 9600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// gphoto2 executable
    pub gphoto_binary: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            gphoto_binary: PathBuf::from("gphoto2"),
        }
    }
}

impl BoothConfig {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            Self::from_toml(&content).map_err(|e| match e {
                ConfigError::Parse { source, .. } => ConfigError::Parse {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: BoothConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shoot.shot_count == 0 {
            return Err(ConfigError::Invalid(
                "shoot.shot_count must be at least 1".to_string(),
            ));
        }
        if self.shoot.max_capture_attempts == 0 {
            return Err(ConfigError::Invalid(
                "shoot.max_capture_attempts must be at least 1".to_string(),
            ));
        }
        if self.template.slots.len() != self.shoot.shot_count as usize {
            return Err(ConfigError::SlotMismatch {
                shots: self.shoot.shot_count,
                slots: self.template.slots.len(),
            });
        }
        self.template
            .slot_dimensions()
            .map_err(|e| ConfigError::Invalid(format!("template.slot_size: {}", e)))?;
        self.timing.validate()
    }

    /// Directory that must be writable for preview frames.
    pub fn preview_dir(&self) -> &Path {
        match self.preview_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

/// Errors that can occur when loading configuration or checking startup preconditions.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Template has {slots} slot(s) but each session takes {shots} shot(s)")]
    SlotMismatch { shots: u32, slots: usize },

    #[error(
        "Directory {} is not writable. Ensure it exists and is writable.\n\n\
         Try `mount -t tmpfs -o size=100m tmpfs {}` to create a ramdisk in that location",
        dir.display(),
        dir.display()
    )]
    PreviewDirNotWritable { dir: PathBuf },

    #[error("Failed to load strip template '{}': {source}", path.display())]
    Template {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to create storage directory '{}': {source}", path.display())]
    StoreDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .map(|d| d.join("photobooth").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/photobooth/config.toml")
        })
}
