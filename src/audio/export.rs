use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, error};
use tokio::process::Command;

use crate::audio::AudioBuffer;
use crate::errors::AudioError;

// @module: MP3 export through ffmpeg

/// Encoder settings for the final MP3
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// ffmpeg binary to invoke
    pub ffmpeg_path: PathBuf,
    /// Target bitrate, e.g. "192k"
    pub bitrate: String,
    /// LAME VBR quality (0 is best)
    pub quality: u8,
    /// Upper bound for a single encoder run
    pub timeout: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            bitrate: "192k".to_string(),
            quality: 0,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Writes a finished buffer to disk as MP3
#[derive(Debug, Clone, Default)]
pub struct AudioExporter {
    settings: ExportSettings,
}

impl AudioExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Write the buffer as a 16-bit mono WAV file
    pub fn write_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<(), AudioError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Encoder arguments for one run
    pub fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(), "error".to_string(),
            "-i".to_string(), input.to_string_lossy().into_owned(),
            "-codec:a".to_string(), "libmp3lame".to_string(),
            "-b:a".to_string(), self.settings.bitrate.clone(),
            "-q:a".to_string(), self.settings.quality.to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Encode the buffer to `output`; the destination must already be validated
    pub async fn export(&self, buffer: &AudioBuffer, output: &Path) -> Result<(), AudioError> {
        let wav = tempfile::Builder::new()
            .prefix("srtnarrate-")
            .suffix(".wav")
            .tempfile()?;
        Self::write_wav(buffer, wav.path())?;
        debug!("Wrote {} samples to {:?}", buffer.len_samples(), wav.path());

        let ffmpeg_future = Command::new(&self.settings.ffmpeg_path)
            .args(self.ffmpeg_args(wav.path(), output))
            .output();

        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| AudioError::Encoder(format!(
                    "failed to run {}: {}", self.settings.ffmpeg_path.display(), e
                )))?
            },
            _ = tokio::time::sleep(self.settings.timeout) => {
                return Err(AudioError::Encoder(format!(
                    "ffmpeg timed out after {}s", self.settings.timeout.as_secs()
                )));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = Self::filter_ffmpeg_stderr(&stderr);
            error!("MP3 encoding failed: {}", filtered);
            return Err(AudioError::Encoder(filtered));
        }

        Ok(())
    }

    /// Keep only the lines of ffmpeg stderr that carry an actual message
    fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Output #",
            "Metadata:",
            "Duration:",
            "Stream #",
            "Stream mapping:",
            "Press [q]",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}
