//! FFmpeg backend

use crate::info::parse_ffmpeg_info;
use crate::{AudioInfo, AudioTool, ToolError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg_path: PathBuf,
}

impl Ffmpeg {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Use the configured binary or find `ffmpeg` on `PATH`
    pub fn locate(configured: Option<PathBuf>) -> Result<Self, ToolError> {
        match configured {
            Some(path) => Ok(Self::new(path)),
            None => which::which("ffmpeg")
                .map(Self::new)
                .map_err(|_| ToolError::FfmpegNotFound),
        }
    }

    pub fn path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

impl AudioTool for Ffmpeg {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn info(&self, path: &Path) -> Result<AudioInfo, ToolError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ToolError::InputMissing(path.to_path_buf()));
        }

        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-i")
            .arg(path)
            .args(["-f", "null", "-"])
            .output()
            .await
            .map_err(spawn_error)?;

        // FFmpeg outputs info to stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "ffmpeg",
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        parse_ffmpeg_info(&stderr)
    }

    async fn convert(&self, input: &Path, output: &Path, sample_rate: u32) -> Result<(), ToolError> {
        if !tokio::fs::try_exists(input).await? {
            return Err(ToolError::InputMissing(input.to_path_buf()));
        }

        info!("Resampling {} to {} Hz", input.display(), sample_rate);

        let result = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(input)
            .args(["-ar", &sample_rate.to_string()])
            .arg("-y")
            .arg(output)
            .output()
            .await
            .map_err(spawn_error)?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if !result.status.success() {
            return Err(ToolError::Failed {
                tool: "ffmpeg",
                code: result.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!("Resampled to: {}", output.display());
        Ok(())
    }
}

fn spawn_error(err: std::io::Error) -> ToolError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ToolError::FfmpegNotFound
    } else {
        ToolError::Io(err)
    }
}
