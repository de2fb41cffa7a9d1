use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::ExportSettings;
use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Voice used for every cue
    #[serde(default)]
    pub voice: Voice,

    /// Speech backend settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// MP3 encoder settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Voices offered by the OpenAI speech endpoint
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    /// Every accepted voice, in documentation order
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    // @returns: Identifier sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }

    // @returns: Comma separated list of voice names
    pub fn valid_names() -> String {
        Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Voice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::Validation(format!(
                "Invalid voice '{}'. Valid voices are: {}",
                s, Self::valid_names()
            )))
    }
}

impl TryFrom<String> for Voice {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Speech backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    // @field: TTS model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key, usually supplied through the environment instead
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay in milliseconds between consecutive synthesis calls
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
        }
    }
}

/// MP3 encoder configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Constant bitrate handed to LAME, e.g. "192k"
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    /// LAME quality, 0 (best) to 9
    #[serde(default)]
    pub quality: u8,

    /// Path or name of the ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            bitrate: default_bitrate(),
            quality: 0,
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "tts-1".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms default delay between requests
}

fn default_bitrate() -> String {
    "192k".to_string()
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

/// Check presence and shape of an OpenAI API key
pub fn validate_api_key(api_key: &str) -> Result<(), AppError> {
    if api_key.trim().is_empty() {
        return Err(AppError::Validation(
            "OpenAI API key must be provided either via --api-key argument \
             or OPENAI_API_KEY environment variable".to_string(),
        ));
    }
    if !(api_key.starts_with("sk-") || api_key.starts_with("org-")) {
        return Err(AppError::Validation("Invalid OpenAI API key format".to_string()));
    }
    Ok(())
}

impl Config {
    /// Load the configuration at `path`, writing a default one if the file is missing
    ///
    /// An unreadable or malformed file, including an unknown voice name, is a
    /// validation error.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path).map_err(|e| AppError::Validation(format!(
                "Failed to open config file {}: {}", path.display(), e
            )))?;
            return serde_json::from_reader(BufReader::new(file)).map_err(|e| AppError::Validation(format!(
                "Invalid config file {}: {}", path.display(), e
            )));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .map_err(|e| AppError::File(format!("Failed to serialize default config: {}", e)))?;
        std::fs::write(path, config_json).map_err(|e| AppError::File(format!(
            "Failed to write default config to file {}: {}", path.display(), e
        )))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        validate_api_key(&self.speech.api_key)?;

        if self.speech.model.trim().is_empty() {
            return Err(AppError::Validation("Speech model must not be empty".to_string()));
        }

        url::Url::parse(&self.speech.endpoint).map_err(|e| AppError::Validation(format!(
            "Invalid speech endpoint '{}': {}", self.speech.endpoint, e
        )))?;

        let bitrate = self.export.bitrate.trim_end_matches(['k', 'K']);
        if bitrate.is_empty() || bitrate.parse::<u32>().is_err() {
            return Err(AppError::Validation(format!(
                "Invalid MP3 bitrate '{}', expected something like 192k", self.export.bitrate
            )));
        }

        if self.export.quality > 9 {
            return Err(AppError::Validation(format!(
                "Invalid MP3 quality {}, expected 0-9", self.export.quality
            )));
        }

        Ok(())
    }

    /// Encoder settings derived from the export section
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            ffmpeg_path: self.export.ffmpeg_path.clone(),
            bitrate: self.export.bitrate.clone(),
            quality: self.export.quality,
            ..ExportSettings::default()
        }
    }

    /// Pause inserted between synthesis calls
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.speech.rate_limit_delay_ms)
    }
}
