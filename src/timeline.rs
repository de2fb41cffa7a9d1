/*!
 * Timeline assembly: places synthesized speech on a track that mirrors cue timings.
 *
 * Cues are handled strictly in input order. For each cue the assembler synthesizes
 * the text, pads the track with silence up to the cue start, then appends the clip
 * in full. A clip longer than its window is never trimmed; it pushes the cursor
 * past the next cue's start and the drift carries forward. After the last cue the
 * track is padded with silence up to the last cue's end time.
 *
 * The cursor is the buffer's own length: placement is decided in samples and only
 * reported in milliseconds, so rounding never accumulates across cues.
 */

use std::time::Duration;
use log::{debug, error, info, warn};

use crate::audio::{self, AudioBuffer, AudioClip};
use crate::providers::SpeechSynthesizer;
use crate::subtitle_processor::SubtitleEntry;

/// Why a cue contributed nothing to the track
#[derive(Debug, Clone, PartialEq)]
pub enum CueSkip {
    /// End time is not after start time
    InvalidTiming,
    /// The synthesizer returned an error or an unusable clip
    SynthesisFailed(String),
}

/// What happened to one cue
#[derive(Debug, Clone, PartialEq)]
pub enum CueOutcome {
    Placed {
        silence_ms: u64,
        speech_ms: u64,
        /// How far the clip runs past the cue end, zero when it fits
        overrun_ms: u64,
    },
    Skipped(CueSkip),
}

/// Per-cue record kept in the report
#[derive(Debug, Clone, PartialEq)]
pub struct CueReport {
    pub seq_num: usize,
    pub outcome: CueOutcome,
    /// Cursor after this cue was handled
    pub cursor_ms: u64,
}

/// Summary of one assembly run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyReport {
    pub cues: Vec<CueReport>,
    pub trailing_silence_ms: u64,
    /// Last cue's end time
    pub target_duration_ms: u64,
    /// Final cursor, including trailing silence
    pub final_cursor_ms: u64,
}

impl AssemblyReport {
    pub fn placed_count(&self) -> usize {
        self.cues.iter().filter(|c| matches!(c.outcome, CueOutcome::Placed { .. })).count()
    }

    pub fn invalid_timing_count(&self) -> usize {
        self.cues.iter()
            .filter(|c| c.outcome == CueOutcome::Skipped(CueSkip::InvalidTiming))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.cues.iter()
            .filter(|c| matches!(c.outcome, CueOutcome::Skipped(CueSkip::SynthesisFailed(_))))
            .count()
    }

    pub fn overrun_count(&self) -> usize {
        self.cues.iter()
            .filter(|c| matches!(c.outcome, CueOutcome::Placed { overrun_ms, .. } if overrun_ms > 0))
            .count()
    }

    /// Cursor value after every cue, in order
    pub fn cursor_trajectory(&self) -> Vec<u64> {
        self.cues.iter().map(|c| c.cursor_ms).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} placed, {} skipped (invalid timing), {} failed, {} overrun(s), {} ms total",
            self.placed_count(),
            self.invalid_timing_count(),
            self.failed_count(),
            self.overrun_count(),
            self.final_cursor_ms
        )
    }
}

/// Finished track plus the report describing how it was built
#[derive(Debug)]
pub struct AssemblyOutcome {
    pub buffer: AudioBuffer,
    pub report: AssemblyReport,
}

/// Sequential assembler over a speech synthesizer
#[derive(Debug)]
pub struct TimelineAssembler<'a, S: SpeechSynthesizer + ?Sized> {
    synthesizer: &'a S,
    delay_between_requests: Duration,
}

impl<'a, S: SpeechSynthesizer + ?Sized> TimelineAssembler<'a, S> {
    pub fn new(synthesizer: &'a S) -> Self {
        Self {
            synthesizer,
            delay_between_requests: Duration::ZERO,
        }
    }

    /// Pause between consecutive synthesis calls
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_requests = delay;
        self
    }

    /// Build the track for `cues`
    pub async fn assemble(&self, cues: &[SubtitleEntry]) -> AssemblyOutcome {
        self.assemble_with_progress(cues, |_, _| {}).await
    }

    /// Build the track, reporting `(handled, total)` after every cue
    pub async fn assemble_with_progress<F>(&self, cues: &[SubtitleEntry], mut on_progress: F) -> AssemblyOutcome
    where
        F: FnMut(usize, usize),
    {
        let sample_rate = self.synthesizer.sample_rate();
        let mut buffer = AudioBuffer::new(sample_rate);
        let mut report = AssemblyReport {
            target_duration_ms: cues.last().map_or(0, |c| c.end_time_ms),
            ..AssemblyReport::default()
        };
        let mut requested_before = false;

        for (idx, cue) in cues.iter().enumerate() {
            debug!(
                "Subtitle {}: '{}' {} -> {} ({} ms)",
                cue.seq_num,
                cue.text,
                SubtitleEntry::format_timestamp(cue.start_time_ms),
                SubtitleEntry::format_timestamp(cue.end_time_ms),
                cue.end_time_ms as i64 - cue.start_time_ms as i64
            );

            if cue.has_valid_timing() {
                if requested_before && !self.delay_between_requests.is_zero() {
                    tokio::time::sleep(self.delay_between_requests).await;
                }
                requested_before = true;
            }

            let placed = self.synthesize_cue(cue).await
                .and_then(|clip| Self::place(&mut buffer, cue, &clip));

            let outcome = match placed {
                Ok(placed) => placed,
                Err(skip) => {
                    match &skip {
                        CueSkip::InvalidTiming => {
                            warn!("Invalid timing in subtitle {}, skipping", cue.seq_num);
                        }
                        CueSkip::SynthesisFailed(reason) => {
                            error!("Error processing subtitle {}: {}", cue.seq_num, reason);
                        }
                    }
                    CueOutcome::Skipped(skip)
                }
            };

            report.cues.push(CueReport {
                seq_num: cue.seq_num,
                outcome,
                cursor_ms: buffer.duration_ms(),
            });
            on_progress(idx + 1, cues.len());
        }

        let trailing = buffer.pad_to_ms(report.target_duration_ms);
        report.trailing_silence_ms = audio::samples_to_ms(trailing, sample_rate);
        report.final_cursor_ms = buffer.duration_ms();

        info!("Timeline assembled: {}", report.summary());

        AssemblyOutcome { buffer, report }
    }

    /// Synthesize one cue, refusing cues whose timing makes no sense
    async fn synthesize_cue(&self, cue: &SubtitleEntry) -> Result<AudioClip, CueSkip> {
        if !cue.has_valid_timing() {
            return Err(CueSkip::InvalidTiming);
        }

        self.synthesizer.synthesize(&cue.text).await
            .map_err(|e| CueSkip::SynthesisFailed(e.to_string()))
    }

    /// Put `clip` on the track at the cue start, or right after the cursor when it has drifted past
    fn place(buffer: &mut AudioBuffer, cue: &SubtitleEntry, clip: &AudioClip) -> Result<CueOutcome, CueSkip> {
        let sample_rate = buffer.sample_rate();
        let available_ms = cue.end_time_ms as i64 - buffer.duration_ms() as i64;
        let available = audio::ms_to_samples(cue.end_time_ms, sample_rate) as i64 - buffer.len_samples() as i64;
        let overrun = (clip.len_samples() as i64 - available).max(0) as usize;

        let silence = buffer.place_clip(cue.start_time_ms, clip)
            .map_err(|e| CueSkip::SynthesisFailed(e.to_string()))?;

        let speech_ms = clip.duration_ms();
        let overrun_ms = audio::samples_to_ms(overrun, sample_rate);
        if overrun > 0 {
            warn!(
                "Speech duration ({}ms) exceeds available time ({}ms) for subtitle {}",
                speech_ms, available_ms, cue.seq_num
            );
        }

        Ok(CueOutcome::Placed {
            silence_ms: audio::samples_to_ms(silence, sample_rate),
            speech_ms,
            overrun_ms,
        })
    }
}
