/*!
 * Tests for timeline assembly
 */

use std::time::Duration;
use srtnarrate::audio::DEFAULT_SAMPLE_RATE;
use srtnarrate::providers::SpeechSynthesizer;
use srtnarrate::providers::mock::MockSynthesizer;
use srtnarrate::{AudioClip, ProviderError};
use srtnarrate::timeline::{CueOutcome, CueSkip, TimelineAssembler};
use crate::common::{self, cue};

/// Two cues with a gap and 400 ms clips produce exactly the last end time
#[tokio::test]
async fn test_assemble_withHelloWorldScenario_shouldProduce2500ms() {
    let synth = MockSynthesizer::fixed(400);
    let cues = vec![cue(1, 0, 1000, "Hello"), cue(2, 1500, 2500, "World")];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(outcome.buffer.duration_ms(), 2500);
    assert_eq!(outcome.report.final_cursor_ms, 2500);
    assert_eq!(outcome.report.trailing_silence_ms, 600);
    assert_eq!(
        outcome.report.cues[0].outcome,
        CueOutcome::Placed { silence_ms: 0, speech_ms: 400, overrun_ms: 0 }
    );
    assert_eq!(
        outcome.report.cues[1].outcome,
        CueOutcome::Placed { silence_ms: 1100, speech_ms: 400, overrun_ms: 0 }
    );
}

#[tokio::test]
async fn test_assemble_withSingleExactCue_shouldProduce500ms() {
    let synth = MockSynthesizer::fixed(500);
    let cues = vec![cue(1, 0, 500, "Exact")];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(outcome.buffer.duration_ms(), 500);
    assert_eq!(outcome.report.trailing_silence_ms, 0);
    assert_eq!(outcome.report.overrun_count(), 0);
}

#[tokio::test]
async fn test_assemble_withNoOverruns_shouldMatchLastEndTime() {
    let synth = MockSynthesizer::fixed(300);
    let cues: Vec<_> = (0..20u64)
        .map(|i| cue(i as usize + 1, i * 1000 + 100, i * 1000 + 800, "line"))
        .collect();

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(outcome.buffer.duration_ms(), 19_800);
    assert_eq!(outcome.report.placed_count(), 20);
}

#[tokio::test]
async fn test_assemble_withInvalidTiming_shouldSkipWithoutCallingSynthesizer() {
    let synth = MockSynthesizer::fixed(200);
    let cues = vec![
        cue(1, 0, 1000, "first"),
        cue(2, 2000, 2000, "zero length"),
        cue(3, 3000, 2500, "inverted"),
        cue(4, 3000, 4000, "last"),
    ];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(synth.request_count(), 2);
    assert_eq!(synth.requests(), vec!["first".to_string(), "last".to_string()]);
    assert_eq!(outcome.report.invalid_timing_count(), 2);
    assert_eq!(outcome.report.cursor_trajectory(), vec![200, 200, 200, 3200]);
    assert_eq!(outcome.buffer.duration_ms(), 4000);
}

#[tokio::test]
async fn test_assemble_withFailedSynthesis_shouldLeaveCursorAndContinue() {
    common::init_logging();
    let synth = MockSynthesizer::fixed(400).fail_on_text("broken");
    let cues = vec![
        cue(1, 0, 1000, "ok"),
        cue(2, 1000, 2000, "broken"),
        cue(3, 2000, 3000, "fine"),
    ];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert!(matches!(
        outcome.report.cues[1].outcome,
        CueOutcome::Skipped(CueSkip::SynthesisFailed(_))
    ));
    assert_eq!(outcome.report.cues[1].cursor_ms, 400);
    assert_eq!(
        outcome.report.cues[2].outcome,
        CueOutcome::Placed { silence_ms: 1600, speech_ms: 400, overrun_ms: 0 }
    );
    assert_eq!(outcome.buffer.duration_ms(), 3000);
}

#[tokio::test]
async fn test_assemble_withAllFailures_shouldProduceSilentTrack() {
    let synth = MockSynthesizer::failing();
    let cues = vec![cue(1, 0, 1000, "a"), cue(2, 1000, 2000, "b")];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(outcome.report.failed_count(), 2);
    assert_eq!(outcome.report.trailing_silence_ms, 2000);
    assert!(outcome.buffer.samples().iter().all(|&s| s == 0));
    assert_eq!(outcome.buffer.duration_ms(), 2000);
}

#[tokio::test]
async fn test_assemble_withOverrun_shouldDriftLaterCues() {
    let synth = MockSynthesizer::fixed(1500);
    let cues = vec![cue(1, 0, 1000, "long"), cue(2, 1200, 4000, "next")];

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(
        outcome.report.cues[0].outcome,
        CueOutcome::Placed { silence_ms: 0, speech_ms: 1500, overrun_ms: 500 }
    );
    // No silence is inserted and nothing is trimmed once the cursor is past the start
    assert_eq!(
        outcome.report.cues[1].outcome,
        CueOutcome::Placed { silence_ms: 0, speech_ms: 1500, overrun_ms: 0 }
    );
    assert_eq!(outcome.report.trailing_silence_ms, 1000);
    assert_eq!(outcome.buffer.duration_ms(), 4000);
}

#[tokio::test]
async fn test_assemble_withMismatchedSampleRate_shouldSkipCue() {
    let synth = MockSynthesizer::fixed(400);
    let other = MockSynthesizer::fixed(400).with_sample_rate(16_000);
    let cues = vec![cue(1, 0, 1000, "x")];

    // Output rate follows `synth`, clips come from `other`
    let outcome = TimelineAssembler::new(&MismatchedRate { rate: synth, clips: other })
        .assemble(&cues)
        .await;

    assert_eq!(outcome.report.failed_count(), 1);
    assert_eq!(outcome.buffer.duration_ms(), 1000);
}

#[tokio::test]
async fn test_assemble_withDeterministicStub_shouldBeRepeatable() {
    let cues = vec![
        cue(1, 0, 900, "one"),
        cue(2, 700, 1500, "two two"),
        cue(3, 5000, 5200, "three three three"),
    ];

    let first = TimelineAssembler::new(&MockSynthesizer::per_char(60)).assemble(&cues).await;
    let second = TimelineAssembler::new(&MockSynthesizer::per_char(60)).assemble(&cues).await;

    assert_eq!(first.buffer.len_samples(), second.buffer.len_samples());
    assert_eq!(first.report.cursor_trajectory(), second.report.cursor_trajectory());
    assert_eq!(first.report, second.report);
}

#[tokio::test]
async fn test_assemble_withEmptyCueList_shouldProduceEmptyBuffer() {
    let synth = MockSynthesizer::fixed(100);
    let outcome = TimelineAssembler::new(&synth).assemble(&[]).await;

    assert!(outcome.buffer.is_empty());
    assert_eq!(outcome.report.final_cursor_ms, 0);
}

#[tokio::test]
async fn test_assemble_withProgressCallback_shouldReportEveryCue() {
    let synth = MockSynthesizer::fixed(100);
    let cues = vec![cue(1, 0, 500, "a"), cue(2, 500, 400, "b"), cue(3, 600, 900, "c")];
    let mut seen = Vec::new();

    TimelineAssembler::new(&synth)
        .assemble_with_progress(&cues, |done, total| seen.push((done, total)))
        .await;

    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

/// Clips of 24_023 samples are just under 1001 ms; the remainder must not push later cues back
#[tokio::test]
async fn test_assemble_withFractionalMillisecondClips_shouldKeepCuesOnTime() {
    let synth = FixedSamples { samples: 24_023 };
    let cues: Vec<_> = (0..100u64)
        .map(|i| cue(i as usize + 1, i * 2000, i * 2000 + 1500, "line"))
        .collect();

    let outcome = TimelineAssembler::new(&synth).assemble(&cues).await;

    assert_eq!(outcome.report.target_duration_ms, 199_500);
    assert_eq!(outcome.buffer.duration_ms(), 199_500);
    assert_eq!(outcome.report.final_cursor_ms, outcome.buffer.duration_ms());
    for (i, report) in outcome.report.cues.iter().enumerate() {
        assert_eq!(report.cursor_ms, i as u64 * 2000 + 1000);
    }

    // The last clip starts exactly on its cue's first sample
    let last_start = 198_000 * DEFAULT_SAMPLE_RATE as usize / 1000;
    assert_eq!(outcome.buffer.samples()[last_start - 1], 0);
    assert_eq!(outcome.buffer.samples()[last_start], 1);
}

#[tokio::test(start_paused = true)]
async fn test_assemble_withDelay_shouldPauseOnlyBetweenSynthesisCalls() {
    let synth = MockSynthesizer::fixed(100);
    let cues = vec![
        cue(1, 0, 500, "first"),
        cue(2, 600, 500, "inverted"),
        cue(3, 700, 900, "second"),
        cue(4, 1000, 1500, "third"),
    ];

    let started = tokio::time::Instant::now();
    TimelineAssembler::new(&synth)
        .with_delay(Duration::from_millis(500))
        .assemble(&cues)
        .await;
    let elapsed = started.elapsed();

    // Three synthesis calls, so two pauses; none before the first call or for the inverted cue
    assert_eq!(synth.request_count(), 3);
    assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_assemble_withDelayAndSingleCue_shouldNotPause() {
    let synth = MockSynthesizer::fixed(100);
    let started = tokio::time::Instant::now();

    TimelineAssembler::new(&synth)
        .with_delay(Duration::from_secs(5))
        .assemble(&[cue(1, 0, 500, "only")])
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Always returns a clip of exactly `samples` samples at the default rate
#[derive(Debug)]
struct FixedSamples {
    samples: usize,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for FixedSamples {
    async fn synthesize(&self, _text: &str) -> Result<AudioClip, ProviderError> {
        Ok(AudioClip::new(vec![1; self.samples], DEFAULT_SAMPLE_RATE))
    }

    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }
}

/// Reports one sample rate but returns clips from another synthesizer
#[derive(Debug)]
struct MismatchedRate {
    rate: MockSynthesizer,
    clips: MockSynthesizer,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for MismatchedRate {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        self.clips.synthesize(text).await
    }

    fn sample_rate(&self) -> u32 {
        self.rate.sample_rate()
    }
}
