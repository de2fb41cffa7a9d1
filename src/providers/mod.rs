/*!
 * Speech synthesis backends.
 *
 * This module contains client implementations for text-to-speech services:
 * - OpenAI: the `/audio/speech` endpoint
 * - Mock: deterministic in-process synthesizer for tests and benches
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::audio::AudioClip;
use crate::errors::ProviderError;

/// Common trait for all speech synthesis backends
///
/// The timeline assembler only sees this trait, so any backend that turns text
/// into a clip can be plugged in.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize one piece of text into a clip
    ///
    /// # Arguments
    /// * `text` - The text to speak, must not be blank
    ///
    /// # Returns
    /// * `Result<AudioClip, ProviderError>` - The synthesized clip or an error
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError>;

    /// Sample rate of the clips this backend produces
    fn sample_rate(&self) -> u32;
}

pub mod openai;
pub mod mock;
