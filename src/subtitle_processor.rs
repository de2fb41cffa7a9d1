use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};
use crate::errors::SubtitleError;

// @module: Subtitle file reading

// @const: SRT timing line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{3})")
        .expect("timestamp regex is valid")
});

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// Whether the cue spans a positive amount of time
    pub fn has_valid_timing(&self) -> bool {
        self.end_time_ms > self.start_time_ms
    }

    /// Nominal cue length, zero for inverted timings
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse()
                .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)
    }
}

/// Ordered cues read from one subtitle file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a collection from already-parsed entries
    pub fn new(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection { source_file, entries }
    }

    /// Check that the path exists and names an SRT file
    pub fn validate_path(path: &Path) -> Result<(), SubtitleError> {
        if !path.exists() {
            return Err(SubtitleError::NotFound(path.display().to_string()));
        }

        let is_srt = path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
            .unwrap_or(false);
        if !is_srt {
            return Err(SubtitleError::WrongExtension(path.display().to_string()));
        }

        Ok(())
    }

    /// Validate and parse an SRT file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        Self::validate_path(path)?;

        let bytes = fs::read(path).map_err(|e| SubtitleError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let entries = Self::parse_srt_string(&content)?;
        debug!("Parsed {} subtitle entries from {}", entries.len(), path.display());

        Ok(Self::new(path.to_path_buf(), entries))
    }

    /// End time of the last cue in file order, the length of the narrated track
    pub fn total_duration_ms(&self) -> u64 {
        self.entries.last().map_or(0, |entry| entry.end_time_ms)
    }

    /// Parse SRT format string into subtitle entries, keeping file order
    ///
    /// Entries whose end does not come after their start, and entries with no
    /// text, are kept: the assembler reports and skips them, and their end time
    /// still counts toward the track length. A timestamp with minutes or seconds
    /// out of range fails the whole file.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let content = content.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let flush = |seq_num: Option<usize>, times: Option<(u64, u64)>, text: &mut String, entries: &mut Vec<SubtitleEntry>| {
            if let Some((start_ms, end_ms)) = times {
                let seq = seq_num.unwrap_or(entries.len() + 1);
                if text.trim().is_empty() {
                    warn!("Subtitle entry {} has no text", seq);
                }
                entries.push(SubtitleEntry::new(seq, start_ms, end_ms, text.trim()));
            }
            text.clear();
        };

        for (line_idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_times.is_some() {
                    flush(current_seq_num.take(), current_times.take(), &mut current_text, &mut entries);
                }
                continue;
            }

            if current_times.is_none() {
                if current_seq_num.is_none() {
                    if let Ok(num) = trimmed.parse::<usize>() {
                        current_seq_num = Some(num);
                        continue;
                    }
                }

                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    let start_ms = SubtitleEntry::parse_timestamp(&caps[1])?;
                    let end_ms = SubtitleEntry::parse_timestamp(&caps[2])?;
                    current_times = Some((start_ms, end_ms));
                    continue;
                }

                warn!("Unexpected text at line {} before timestamp: {}", line_idx + 1, trimmed);
                continue;
            }

            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        }

        flush(current_seq_num, current_times, &mut current_text, &mut entries);

        if entries.is_empty() {
            return Err(SubtitleError::InvalidFormat(
                "no subtitle entries were found".to_string(),
            ));
        }

        Ok(entries)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        writeln!(f, "Duration: {}", SubtitleEntry::format_timestamp(self.total_duration_ms()))
    }
}
