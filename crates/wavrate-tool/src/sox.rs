//! sox backend

use crate::info::parse_sox_info;
use crate::{AudioInfo, AudioTool, ToolError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Sox {
    sox_path: PathBuf,
}

impl Sox {
    pub fn new(sox_path: PathBuf) -> Self {
        Self { sox_path }
    }

    /// Use the configured binary or find `sox` on `PATH`
    pub fn locate(configured: Option<PathBuf>) -> Result<Self, ToolError> {
        match configured {
            Some(path) => Ok(Self::new(path)),
            None => which::which("sox")
                .map(Self::new)
                .map_err(|_| ToolError::SoxNotFound),
        }
    }

    pub fn path(&self) -> &Path {
        &self.sox_path
    }
}

impl AudioTool for Sox {
    fn name(&self) -> &'static str {
        "sox"
    }

    async fn info(&self, path: &Path) -> Result<AudioInfo, ToolError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ToolError::InputMissing(path.to_path_buf()));
        }

        let output = Command::new(&self.sox_path)
            .arg("--i")
            .arg(path)
            .output()
            .await
            .map_err(spawn_error)?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "sox",
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_sox_info(&String::from_utf8_lossy(&output.stdout))
    }

    async fn convert(&self, input: &Path, output: &Path, sample_rate: u32) -> Result<(), ToolError> {
        if !tokio::fs::try_exists(input).await? {
            return Err(ToolError::InputMissing(input.to_path_buf()));
        }

        info!("Resampling {} to {} Hz", input.display(), sample_rate);

        // -r placed before the output file applies to the output side
        let result = Command::new(&self.sox_path)
            .arg("-q")
            .arg(input)
            .args(["-r", &sample_rate.to_string()])
            .arg(output)
            .output()
            .await
            .map_err(spawn_error)?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stderr.is_empty() {
            debug!("sox stderr: {}", stderr);
        }

        if !result.status.success() {
            return Err(ToolError::Failed {
                tool: "sox",
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
        ToolError::SoxNotFound
    } else {
        ToolError::Io(err)
    }
}
