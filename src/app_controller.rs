use log::{info, debug};
use std::path::Path;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::audio::AudioExporter;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::SpeechSynthesizer;
use crate::providers::openai::OpenAISpeech;
use crate::subtitle_processor::SubtitleCollection;
use crate::timeline::{AssemblyOutcome, AssemblyReport, TimelineAssembler};

// @module: Application controller for subtitle narration

/// Main application controller: validate, assemble, export
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Narrate `input` into `output` using the configured OpenAI voice
    pub async fn run(&self, input: &Path, output: &Path) -> Result<AssemblyReport, AppError> {
        self.config.validate()?;
        let synthesizer = OpenAISpeech::from_config(&self.config.speech, self.config.voice);
        self.run_with_synthesizer(&synthesizer, input, output).await
    }

    /// Full workflow against any synthesizer
    pub async fn run_with_synthesizer<S: SpeechSynthesizer + ?Sized>(
        &self,
        synthesizer: &S,
        input: &Path,
        output: &Path,
    ) -> Result<AssemblyReport, AppError> {
        let start_time = Instant::now();

        // Everything that can be rejected is rejected before the first request
        let subtitles = SubtitleCollection::from_file(input)?;
        FileManager::validate_output_path(output)?;

        info!(
            "Narrating {} cues from {} with voice '{}'",
            subtitles.entries.len(),
            input.display(),
            self.config.voice
        );

        let outcome = self.assemble_with_progress(synthesizer, &subtitles).await;

        let exporter = AudioExporter::new(self.config.export_settings());
        exporter.export(&outcome.buffer, output).await?;

        info!("Audio file created successfully: {}", output.display());
        info!("Finished in {}", Self::format_duration(start_time.elapsed()));

        Ok(outcome.report)
    }

    /// Assemble the narrated track for a parsed collection, with a progress bar
    pub async fn assemble_with_progress<S: SpeechSynthesizer + ?Sized>(
        &self,
        synthesizer: &S,
        subtitles: &SubtitleCollection,
    ) -> AssemblyOutcome {
        let progress_bar = ProgressBar::new(subtitles.entries.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("#>-"));
        if log::max_level() < log::LevelFilter::Info {
            progress_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let pb = progress_bar.clone();
        let outcome = TimelineAssembler::new(synthesizer)
            .with_delay(self.config.rate_limit_delay())
            .assemble_with_progress(&subtitles.entries, move |done, _total| {
                pb.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();
        debug!("Cursor trajectory: {:?}", outcome.report.cursor_trajectory());

        outcome
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
