/*!
 * Integration tests for the narration workflow, using the mock synthesizer
 */

use anyhow::Result;
use srtnarrate::app_config::Config;
use srtnarrate::app_controller::Controller;
use srtnarrate::audio::{AudioExporter, ExportSettings};
use srtnarrate::errors::{AppError, AudioError};
use srtnarrate::providers::mock::MockSynthesizer;
use srtnarrate::subtitle_processor::SubtitleCollection;
use crate::common;

fn test_controller() -> Controller {
    let mut config = Config::default();
    config.speech.api_key = "sk-test".to_string();
    config.speech.rate_limit_delay_ms = 0;
    Controller::with_config(config)
}

/// Parse a file and assemble it end to end without touching the network
#[tokio::test]
async fn test_assemble_fromSrtFile_shouldSpanLastCueEnd() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let subtitles = SubtitleCollection::from_file(&path)?;
    let synth = MockSynthesizer::fixed(1000);

    let outcome = test_controller().assemble_with_progress(&synth, &subtitles).await;

    assert_eq!(synth.request_count(), 3);
    assert_eq!(outcome.report.cursor_trajectory(), vec![2000, 6000, 11000]);
    assert_eq!(outcome.buffer.duration_ms(), 14_000);
    Ok(())
}

/// A cue with no text is skipped by the synthesizer but still sets the track length
#[tokio::test]
async fn test_assemble_withBlankLastCue_shouldPadToItsEnd() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "blank.srt",
        "1\n00:00:00,000 --> 00:00:01,000\nHello\n\n2\n00:00:09,000 --> 00:00:10,000\n\n",
    )?;
    let subtitles = SubtitleCollection::from_file(&path)?;
    let synth = MockSynthesizer::fixed(800);

    let outcome = test_controller().assemble_with_progress(&synth, &subtitles).await;

    assert_eq!(outcome.report.placed_count(), 1);
    assert_eq!(outcome.report.failed_count(), 1);
    assert_eq!(outcome.report.trailing_silence_ms, 9200);
    assert_eq!(outcome.buffer.duration_ms(), 10_000);
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFailValidationBeforeSynthesis() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let synth = MockSynthesizer::fixed(100);

    let result = test_controller()
        .run_with_synthesizer(&synth, &temp_dir.path().join("nope.srt"), &temp_dir.path().join("out.mp3"))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(synth.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withWrongOutputExtension_shouldFailValidationBeforeSynthesis() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let synth = MockSynthesizer::fixed(100);

    let result = test_controller()
        .run_with_synthesizer(&synth, &input, &temp_dir.path().join("out.wav"))
        .await;

    assert!(matches!(result, Err(AppError::Audio(AudioError::WrongExtension))));
    assert_eq!(synth.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withMalformedSrt_shouldFailValidation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "bad.srt", "hello there\n")?;
    let synth = MockSynthesizer::fixed(100);

    let result = test_controller()
        .run_with_synthesizer(&synth, &input, &temp_dir.path().join("out.mp3"))
        .await;

    assert!(matches!(result, Err(AppError::Subtitle(_))));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingEncoder_shouldFailAsRuntimeError() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let synth = MockSynthesizer::fixed(100);

    let mut config = Config::default();
    config.speech.rate_limit_delay_ms = 0;
    config.export.ffmpeg_path = temp_dir.path().join("no-such-ffmpeg");
    let controller = Controller::with_config(config);

    let result = controller
        .run_with_synthesizer(&synth, &input, &temp_dir.path().join("out.mp3"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::Audio(AudioError::Encoder(_))));
    assert!(!err.is_validation());
    assert_eq!(synth.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_write_wav_withAssembledBuffer_shouldRoundTripLength() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let synth = MockSynthesizer::fixed(250);
    let cues = vec![common::cue(1, 0, 500, "a"), common::cue(2, 1000, 1500, "b")];
    let outcome = srtnarrate::TimelineAssembler::new(&synth).assemble(&cues).await;

    let wav_path = temp_dir.path().join("track.wav");
    AudioExporter::write_wav(&outcome.buffer, &wav_path)?;

    let reader = hound::WavReader::open(&wav_path)?;
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, outcome.buffer.sample_rate());
    assert_eq!(reader.len() as usize, outcome.buffer.len_samples());
    Ok(())
}

#[tokio::test]
async fn test_export_withMissingEncoder_shouldReportEncoderError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let exporter = AudioExporter::new(ExportSettings {
        ffmpeg_path: temp_dir.path().join("absent-ffmpeg"),
        ..ExportSettings::default()
    });
    let buffer = srtnarrate::AudioBuffer::new(24_000);

    let result = exporter.export(&buffer, &temp_dir.path().join("out.mp3")).await;
    assert!(matches!(result, Err(AudioError::Encoder(_))));
    Ok(())
}
