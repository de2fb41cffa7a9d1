/*!
 * # srtnarrate - narrate SRT subtitles into a single MP3 track
 *
 * Each subtitle cue is spoken by a text-to-speech service and the clips are laid
 * out on a timeline that follows the cue timings, with silence in the gaps.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and voice selection
 * - `subtitle_processor`: SRT parsing into ordered cues
 * - `timeline`: Sequential timeline assembly
 * - `audio`: In-memory PCM buffers and MP3 export through ffmpeg
 * - `providers`: Speech synthesis backends:
 *   - `providers::openai`: OpenAI speech endpoint client
 *   - `providers::mock`: Deterministic synthesizer for tests
 * - `file_utils`: Output path validation
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::{Config, Voice};
pub use audio::{AudioBuffer, AudioClip};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use timeline::{AssemblyOutcome, AssemblyReport, TimelineAssembler};
pub use errors::{AppError, AudioError, ProviderError, SubtitleError};
