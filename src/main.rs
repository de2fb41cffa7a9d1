// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use srtnarrate::app_config::{self, Config, Voice};
use srtnarrate::app_controller::Controller;
use srtnarrate::errors::AppError;

/// CLI Wrapper for Voice to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliVoice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl From<CliVoice> for Voice {
    fn from(cli_voice: CliVoice) -> Self {
        match cli_voice {
            CliVoice::Alloy => Voice::Alloy,
            CliVoice::Echo => Voice::Echo,
            CliVoice::Fable => Voice::Fable,
            CliVoice::Onyx => Voice::Onyx,
            CliVoice::Nova => Voice::Nova,
            CliVoice::Shimmer => Voice::Shimmer,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for srtnarrate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// srtnarrate - narrate SRT subtitles into an MP3 track
///
/// Every subtitle cue is spoken with OpenAI text-to-speech and placed at its
/// start time; gaps between cues are filled with silence.
#[derive(Parser, Debug)]
#[command(name = "srtnarrate")]
#[command(version)]
#[command(about = "Convert SRT subtitles to MP3 audio using OpenAI TTS")]
#[command(subcommand_negates_reqs = true)]
#[command(long_about = "srtnarrate converts an SRT subtitle file into a single narrated MP3 track.

EXAMPLES:
    srtnarrate -i subtitles.srt -o output.mp3
    srtnarrate -i subtitles.srt -o output.mp3 -v nova
    srtnarrate -i subtitles.srt -o output.mp3 --api-key sk-...
    srtnarrate completions bash > srtnarrate.bash

CONFIGURATION:
    Settings can be stored in a JSON file passed with --config. If the file does
    not exist, a default one is created. Command line flags override the file.

REQUIREMENTS:
    ffmpeg with libmp3lame must be on PATH (or set export.ffmpeg_path).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input SRT file path
    #[arg(short, long, required = true)]
    input: Option<PathBuf>,

    /// Output MP3 file path
    #[arg(short, long, required = true)]
    output: Option<PathBuf>,

    /// OpenAI voice to use (default: alloy)
    #[arg(short, long, value_enum)]
    voice: Option<CliVoice>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TTS model name (default: tts-1)
    #[arg(short, long)]
    model: Option<String>,

    /// Delay between synthesis requests in milliseconds (default: 500)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The effective level is governed by log::max_level, which may be raised after init
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    let cli = CommandLineOptions::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::from(1)
        }
    }
}

// @returns: Line printed on failure, prefixed by error class
fn error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<AppError>() {
        Some(app_error) if app_error.is_validation() => format!("Validation Error: {}", app_error),
        _ => format!("Error: {:#}", e),
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "srtnarrate", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = match &cli.config_path {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };

    // Override config with CLI options if provided
    if let Some(voice) = cli.voice {
        config.voice = voice.into();
    }
    if let Some(api_key) = cli.api_key {
        config.speech.api_key = api_key;
    }
    if let Some(model) = cli.model {
        config.speech.model = model;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.speech.rate_limit_delay_ms = delay_ms;
    }
    match cli.log_level {
        Some(log_level) => config.log_level = log_level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    let input = cli.input.context("--input is required")?;
    let output = cli.output.context("--output is required")?;

    let controller = Controller::with_config(config);
    controller.run(&input, &output).await?;

    Ok(())
}
