/*!
 * Mock synthesizer for testing.
 *
 * Produces silent clips of a fixed or text-derived length without touching the network:
 * - `MockSynthesizer::fixed(ms)` - every call returns a clip of `ms` milliseconds
 * - `MockSynthesizer::failing()` - every call fails
 * - `MockSynthesizer::intermittent(n, ms)` - every n-th call fails
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::audio::{AudioClip, DEFAULT_SAMPLE_RATE};
use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always returns a clip of the given length
    Fixed { duration_ms: u64 },
    /// Clip length proportional to the text length
    PerChar { ms_per_char: u64 },
    /// Fails on every `fail_every`-th call (1-based), otherwise like `Fixed`
    Intermittent { fail_every: usize, duration_ms: u64 },
    /// Always fails with an error
    Failing,
}

/// Deterministic stand-in for a remote speech service
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    behavior: MockBehavior,
    sample_rate: u32,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
}

impl MockSynthesizer {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            sample_rate: DEFAULT_SAMPLE_RATE,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Every call returns a clip of `duration_ms`
    pub fn fixed(duration_ms: u64) -> Self {
        Self::new(MockBehavior::Fixed { duration_ms })
    }

    /// Clip length grows with the text
    pub fn per_char(ms_per_char: u64) -> Self {
        Self::new(MockBehavior::PerChar { ms_per_char })
    }

    /// Every `fail_every`-th call fails
    pub fn intermittent(fail_every: usize, duration_ms: u64) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every, duration_ms })
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Fail whenever the text equals `text`, regardless of behavior
    pub fn fail_on_text(mut self, text: impl Into<String>) -> Self {
        self.fail_on = Some(text.into());
        self
    }

    /// Produce clips at a different sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Number of synthesize calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.to_string());
        }

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        if self.fail_on.as_deref() == Some(text) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure for '{}'", text),
            });
        }

        let duration_ms = match self.behavior {
            MockBehavior::Fixed { duration_ms } => duration_ms,
            MockBehavior::PerChar { ms_per_char } => ms_per_char * text.chars().count() as u64,
            MockBehavior::Intermittent { fail_every, duration_ms } => {
                if fail_every > 0 && call % fail_every == 0 {
                    return Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure on call {}", call),
                    });
                }
                duration_ms
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("Simulated connection failure".to_string()));
            }
        };

        Ok(AudioClip::silent(duration_ms, self.sample_rate))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
