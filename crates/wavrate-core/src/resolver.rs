//! Turn a user supplied path into a directory and the .wav files to convert

use crate::error::InputResolutionError;
use crate::source::SourceSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, warn};

/// Recognized audio extension (matched case-sensitively)
pub const AUDIO_EXTENSION: &str = ".wav";

/// Outcome of resolving an input path
///
/// Every variant except `Found` means there is nothing to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Directory plus sorted file names (a single name for a file input)
    Found { directory: PathBuf, names: Vec<String> },
    /// The directory was listed but holds no .wav files
    Empty { directory: PathBuf },
    /// Listing failed (not a directory, permissions, ...)
    Unreadable { directory: PathBuf, reason: String },
    /// The input path does not exist
    NotFound { input: PathBuf },
}

impl Resolution {
    /// Resolved directory; empty for a nonexistent input
    pub fn directory(&self) -> &Path {
        match self {
            Resolution::Found { directory, .. }
            | Resolution::Empty { directory }
            | Resolution::Unreadable { directory, .. } => directory,
            Resolution::NotFound { .. } => Path::new(""),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            Resolution::Found { names, .. } => names,
            _ => &[],
        }
    }

    pub fn into_source_set(self) -> Result<SourceSet, InputResolutionError> {
        match self {
            Resolution::Found { directory, names } => Ok(SourceSet::from_listing(directory, names)),
            Resolution::Empty { directory } => Err(InputResolutionError::NoAudioFiles(directory)),
            Resolution::Unreadable { directory, reason } => {
                Err(InputResolutionError::Unreadable { directory, reason })
            }
            Resolution::NotFound { input } => Err(InputResolutionError::NotFound(input)),
        }
    }
}

/// Resolve `input` to a directory and the .wav files it designates
pub async fn resolve(input: &str) -> Resolution {
    let normalized = trim_trailing_separators(input);
    let path = PathBuf::from(normalized);

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if !normalized.is_empty() => metadata,
        _ => {
            debug!("Input path does not exist: {:?}", input);
            return Resolution::NotFound { input: path };
        }
    };

    if metadata.is_file() && normalized.ends_with(AUDIO_EXTENSION) {
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            return Resolution::Found {
                names: vec![name.to_string()],
                directory,
            };
        }
    }

    list_audio_files(path).await
}

async fn list_audio_files(directory: PathBuf) -> Resolution {
    match read_audio_names(&directory).await {
        Ok(names) if names.is_empty() => Resolution::Empty { directory },
        Ok(names) => {
            debug!("Found {} audio file(s) in {}", names.len(), directory.display());
            Resolution::Found { directory, names }
        }
        Err(e) => {
            warn!("Could not list {}: {}", directory.display(), e);
            Resolution::Unreadable {
                directory,
                reason: e.to_string(),
            }
        }
    }
}

async fn read_audio_names(directory: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };
        if !name.ends_with(AUDIO_EXTENSION) {
            continue;
        }
        // follows symlinks, so a link to a .wav file counts
        match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) if metadata.is_file() => names.push(name),
            _ => debug!("Skipping {}: not a regular file", name),
        }
    }

    names.sort();
    Ok(names)
}

fn trim_trailing_separators(input: &str) -> &str {
    let trimmed = input.trim_end_matches(|c: char| c == '/' || c == MAIN_SEPARATOR);
    if trimmed.is_empty() && !input.is_empty() {
        // keep the filesystem root intact
        &input[..1]
    } else {
        trimmed
    }
}
