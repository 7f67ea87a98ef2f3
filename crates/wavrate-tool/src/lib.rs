//! External audio tool bridge for wavrate
//!
//! Resampling and metadata extraction are delegated to a command line tool:
//! - sox: `sox in.wav -r RATE out.wav`, metadata from `sox --i`
//! - FFmpeg: `ffmpeg -i in.wav -ar RATE out.wav`, metadata from the stream banner

mod error;
mod ffmpeg;
mod info;
mod sox;

pub use error::ToolError;
pub use ffmpeg::Ffmpeg;
pub use info::AudioInfo;
pub use sox::Sox;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

/// Call contract for the tool that does the actual audio work.
///
/// The pipeline only ever needs two operations: read the metadata of a file
/// and write a copy of it at another sample rate.
pub trait AudioTool: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Read sample rate, channels, duration and friends
    fn info(&self, path: &Path) -> impl Future<Output = Result<AudioInfo, ToolError>> + Send;

    /// Write `input` resampled to `sample_rate` at `output`
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> impl Future<Output = Result<(), ToolError>> + Send;
}

/// Backend selection as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolBackend {
    Sox,
    Ffmpeg,
}

impl std::fmt::Display for ToolBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolBackend::Sox => write!(f, "sox"),
            ToolBackend::Ffmpeg => write!(f, "ffmpeg"),
        }
    }
}

/// A located external tool of either backend
#[derive(Debug, Clone)]
pub enum ExternalTool {
    Sox(Sox),
    Ffmpeg(Ffmpeg),
}

impl ExternalTool {
    /// Locate the binary for `backend`, preferring an explicitly configured path
    pub fn locate(backend: ToolBackend, configured: Option<PathBuf>) -> Result<Self, ToolError> {
        let tool = match backend {
            ToolBackend::Sox => ExternalTool::Sox(Sox::locate(configured)?),
            ToolBackend::Ffmpeg => ExternalTool::Ffmpeg(Ffmpeg::locate(configured)?),
        };
        info!("Using {} as audio tool", tool.name());
        Ok(tool)
    }

    pub fn backend(&self) -> ToolBackend {
        match self {
            ExternalTool::Sox(_) => ToolBackend::Sox,
            ExternalTool::Ffmpeg(_) => ToolBackend::Ffmpeg,
        }
    }

    /// Binary the tool runs
    pub fn binary(&self) -> &Path {
        match self {
            ExternalTool::Sox(sox) => sox.path(),
            ExternalTool::Ffmpeg(ffmpeg) => ffmpeg.path(),
        }
    }
}

impl AudioTool for ExternalTool {
    fn name(&self) -> &'static str {
        match self {
            ExternalTool::Sox(sox) => sox.name(),
            ExternalTool::Ffmpeg(ffmpeg) => ffmpeg.name(),
        }
    }

    async fn info(&self, path: &Path) -> Result<AudioInfo, ToolError> {
        match self {
            ExternalTool::Sox(sox) => sox.info(path).await,
            ExternalTool::Ffmpeg(ffmpeg) => ffmpeg.info(path).await,
        }
    }

    async fn convert(&self, input: &Path, output: &Path, sample_rate: u32) -> Result<(), ToolError> {
        match self {
            ExternalTool::Sox(sox) => sox.convert(input, output, sample_rate).await,
            ExternalTool::Ffmpeg(ffmpeg) => ffmpeg.convert(input, output, sample_rate).await,
        }
    }
}
