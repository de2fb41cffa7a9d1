/*!
 * In-memory audio used by the timeline assembler.
 *
 * Audio is kept as mono 16-bit PCM. Every clip carries its sample rate so the
 * assembler can refuse clips that do not match the output buffer.
 */

use crate::errors::AudioError;

pub mod export;

pub use export::{AudioExporter, ExportSettings};

/// Sample rate of raw PCM returned by the OpenAI speech endpoint
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Sample index of a millisecond position at the given rate
pub fn ms_to_samples(ms: u64, sample_rate: u32) -> usize {
    (ms * u64::from(sample_rate) / 1000) as usize
}

/// Sample count to whole milliseconds, rounded down
pub fn samples_to_ms(samples: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    samples as u64 * 1000 / u64::from(sample_rate)
}

/// A synthesized speech clip
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioClip {
    /// Wrap already decoded samples
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Decode raw little-endian signed 16-bit mono PCM
    pub fn from_pcm16_le(bytes: &[u8], sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::Decode("sample rate must be positive".to_string()));
        }
        if bytes.len() % 2 != 0 {
            return Err(AudioError::Decode(format!(
                "PCM payload has odd length {}", bytes.len()
            )));
        }

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self::new(samples, sample_rate))
    }

    /// A clip of digital silence, mostly useful for stubs and tests
    pub fn silent(duration_ms: u64, sample_rate: u32) -> Self {
        Self::new(vec![0; ms_to_samples(duration_ms, sample_rate)], sample_rate)
    }

    /// Clip length in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), self.sample_rate)
    }

    pub fn len_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}

/// Append-only output track
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create an empty buffer at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self { samples: Vec::new(), sample_rate }
    }

    /// Pad with silence until the buffer reaches `position_ms`; returns the samples added
    ///
    /// Positions are compared in samples, so clips that are not a whole number of
    /// milliseconds long never shift later placements.
    pub fn pad_to_ms(&mut self, position_ms: u64) -> usize {
        let target = ms_to_samples(position_ms, self.sample_rate);
        let count = target.saturating_sub(self.samples.len());
        self.samples.resize(self.samples.len() + count, 0);
        count
    }

    /// Append `clip` in full, preceded by silence up to `start_ms` if the buffer is shorter
    ///
    /// Returns the number of silent samples inserted. A clip at another sample
    /// rate is refused and the buffer is left untouched.
    pub fn place_clip(&mut self, start_ms: u64, clip: &AudioClip) -> Result<usize, AudioError> {
        if clip.sample_rate != self.sample_rate {
            return Err(AudioError::Decode(format!(
                "clip sample rate {} Hz does not match output rate {} Hz",
                clip.sample_rate, self.sample_rate
            )));
        }
        let padded = self.pad_to_ms(start_ms);
        self.samples.extend_from_slice(&clip.samples);
        Ok(padded)
    }

    /// Buffer length in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), self.sample_rate)
    }

    pub fn len_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}
