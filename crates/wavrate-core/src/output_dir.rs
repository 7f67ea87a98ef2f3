//! Output directory preparation

use crate::error::OutputDirError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ensure `root/dir_name` exists and return it.
///
/// `root` itself must already be a directory; only the dedicated
/// subdirectory is created.
pub async fn prepare_output_dir(root: &Path, dir_name: &str) -> Result<PathBuf, OutputDirError> {
    let is_dir = tokio::fs::metadata(root)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(OutputDirError::NotADirectory(root.to_path_buf()));
    }

    let output_dir = root.join(dir_name);
    match tokio::fs::create_dir(&output_dir).await {
        Ok(()) => debug!("Created output directory: {}", output_dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            if !tokio::fs::metadata(&output_dir).await?.is_dir() {
                return Err(OutputDirError::NotADirectory(output_dir));
            }
        }
        Err(e) => return Err(e.into()),
    }

    Ok(output_dir)
}
