use std::fs;
use std::path::{Path, PathBuf};
use log::debug;

use crate::errors::AudioError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Check whether `ext` matches the path extension, ignoring case
    pub fn has_extension<P: AsRef<Path>>(path: P, ext: &str) -> bool {
        path.as_ref()
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext.trim_start_matches('.')))
            .unwrap_or(false)
    }

    /// Directory the output file will be written into
    pub fn parent_dir<P: AsRef<Path>>(path: P) -> PathBuf {
        match path.as_ref().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Probe whether new files can be created in `dir`
    pub fn is_dir_writable<P: AsRef<Path>>(dir: P) -> bool {
        tempfile::Builder::new()
            .prefix(".srtnarrate-probe-")
            .tempfile_in(dir.as_ref())
            .is_ok()
    }

    /// Validate an MP3 destination, creating its directory when missing
    pub fn validate_output_path<P: AsRef<Path>>(output: P) -> Result<(), AudioError> {
        let output = output.as_ref();

        if !Self::has_extension(output, "mp3") {
            return Err(AudioError::WrongExtension);
        }

        let output_dir = Self::parent_dir(output);
        if !output_dir.exists() {
            Self::ensure_dir(&output_dir).map_err(|e| AudioError::CreateDir(e.to_string()))?;
            debug!("Created output directory {}", output_dir.display());
        }

        if output.exists() {
            let writable = fs::metadata(output)
                .map(|meta| meta.is_file() && !meta.permissions().readonly())
                .unwrap_or(false);
            if !writable {
                return Err(AudioError::FileNotWritable(output.display().to_string()));
            }
        }

        if !Self::is_dir_writable(&output_dir) {
            return Err(AudioError::DirNotWritable(output_dir.display().to_string()));
        }

        Ok(())
    }
}
