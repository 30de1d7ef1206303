// Configuration management
//
// Emulator settings persisted as a TOML file: region override, audio
// delivery parameters, and the scheduler's runaway-frame guard.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Default configuration file path
const CONFIG_FILE: &str = "nes_core.toml";

/// Errors from loading or saving the configuration
#[derive(Debug)]
pub enum ConfigError {
    /// I/O failure
    Io(io::Error),
    /// TOML parse failure
    Parse(toml::de::Error),
    /// TOML serialize failure
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Console region selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegionChoice {
    /// Follow the ROM header
    #[default]
    Auto,
    /// Force NTSC timing
    Ntsc,
    /// Force PAL timing
    Pal,
}

/// Audio delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Host sample rate in Hz
    pub sample_rate: u32,

    /// Samples per chunk pushed to the sink
    pub chunk_size: usize,

    /// Master volume (0.0 to 1.0)
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sample_rate: crate::audio::DEFAULT_SAMPLE_RATE,
            chunk_size: crate::audio::DEFAULT_CHUNK_SIZE,
            volume: 1.0,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum CPU steps per frame before bailing out with a
    /// partial frame (a frame normally needs about 10-15k)
    pub step_limit: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            step_limit: 200_000,
        }
    }
}

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmulatorConfig {
    /// Region override
    pub region: RegionChoice,

    /// Audio settings
    pub audio: AudioConfig,

    /// Scheduler settings
    pub run: RunConfig,
}

impl EmulatorConfig {
    /// Load from the default path, falling back to defaults on any
    /// missing or malformed file
    pub fn load_or_default() -> Self {
        Self::load_from(CONFIG_FILE.into()).unwrap_or_default()
    }

    /// Load from an explicit path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(ConfigError::Parse)
    }

    /// Save to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(CONFIG_FILE.into())
    }

    /// Save to an explicit path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, text)?;
        Ok(())
    }
}
