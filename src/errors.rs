/*!
 * Error types for the srtnarrate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when calling a speech synthesis backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Text handed to the synthesizer was empty or whitespace
    #[error("Empty text provided for speech conversion")]
    EmptyInput,
}

/// Errors that can occur while reading a subtitle file
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file does not exist
    #[error("SRT file not found: {0}")]
    NotFound(String),

    /// The file does not carry the .srt extension
    #[error("Input file must have .srt extension: {0}")]
    WrongExtension(String),

    /// The file could not be read
    #[error("Failed to read subtitle file {path}: {message}")]
    Unreadable {
        /// Offending path
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The content is not valid SRT or holds no entries
    #[error("Invalid SRT file format: {0}")]
    InvalidFormat(String),

    /// A single timestamp could not be parsed
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
}

/// Errors produced by audio handling and export
#[derive(Error, Debug)]
pub enum AudioError {
    /// Output path has the wrong extension
    #[error("Output file must have .mp3 extension")]
    WrongExtension,

    /// Output directory could not be created
    #[error("Cannot create output directory: {0}")]
    CreateDir(String),

    /// Output file exists but is read-only
    #[error("Output file exists and is not writable: {0}")]
    FileNotWritable(String),

    /// Output directory does not accept new files
    #[error("Output directory is not writable: {0}")]
    DirNotWritable(String),

    /// Synthesized bytes could not be decoded into samples
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Intermediate WAV could not be written
    #[error("Failed to write intermediate audio: {0}")]
    Wav(#[from] hound::Error),

    /// The external encoder failed
    #[error("Error exporting audio file: {0}")]
    Encoder(String),

    /// Plain I/O failure while exporting
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Whether this error stems from checking the destination rather than from encoding
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::WrongExtension | Self::CreateDir(_) | Self::FileNotWritable(_) | Self::DirNotWritable(_)
        )
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected before any work started
    #[error("{0}")]
    Validation(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    /// Error from audio export
    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl AppError {
    /// Whether the error belongs to the up-front validation class
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Subtitle(_) => true,
            Self::Provider(ProviderError::EmptyInput) => true,
            Self::Audio(e) => e.is_validation(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
