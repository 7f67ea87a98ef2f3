//! Staging of uploaded blobs as temporary files

use crate::cleanup::CleanupCoordinator;
use crate::error::StagingError;
use crate::resolver::AUDIO_EXTENSION;
use crate::source::SourceSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Content of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadBody {
    Bytes(Vec<u8>),
    /// Copied from this file while staging
    File(PathBuf),
}

/// One uploaded file under the name the user gave it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub display_name: String,
    pub body: UploadBody,
}

impl Upload {
    pub fn new(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            display_name: display_name.into(),
            body: UploadBody::Bytes(bytes),
        }
    }

    pub fn from_file(display_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            display_name: display_name.into(),
            body: UploadBody::File(path),
        }
    }
}

#[derive(Debug)]
pub struct UploadStager {
    scratch_dir: PathBuf,
}

impl UploadStager {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    /// Write every upload to its own temporary file in the scratch directory.
    ///
    /// Names are validated before anything touches the disk. Each staged path
    /// is registered with `cleanup` before its bytes are written.
    pub async fn stage(
        &self,
        uploads: Vec<Upload>,
        cleanup: &mut CleanupCoordinator,
    ) -> Result<SourceSet, StagingError> {
        validate_names(&uploads)?;

        info!("Staging {} upload(s) in {}", uploads.len(), self.scratch_dir.display());

        let mut pairs = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let staged = self.stage_one(&upload, cleanup).await?;
            debug!("Staged {} as {}", upload.display_name, staged);
            pairs.push((upload.display_name, staged));
        }

        SourceSet::from_staged(self.scratch_dir.clone(), pairs)
    }

    async fn stage_one(
        &self,
        upload: &Upload,
        cleanup: &mut CleanupCoordinator,
    ) -> Result<String, StagingError> {
        let write_error = |source: std::io::Error| StagingError::Write {
            name: upload.display_name.clone(),
            source,
        };

        // The suffix lets the audio tool detect the format from the name
        let temp = tempfile::Builder::new()
            .prefix("wavrate-")
            .suffix(AUDIO_EXTENSION)
            .tempfile_in(&self.scratch_dir)
            .map_err(write_error)?;
        cleanup.register(temp.path());

        let (file, path) = temp.keep().map_err(|e| write_error(e.error))?;
        let mut file = tokio::fs::File::from_std(file);
        match &upload.body {
            UploadBody::Bytes(bytes) => file.write_all(bytes).await.map_err(write_error)?,
            UploadBody::File(source) => {
                let mut source = tokio::fs::File::open(source).await.map_err(write_error)?;
                tokio::io::copy(&mut source, &mut file)
                    .await
                    .map_err(write_error)?;
            }
        }
        file.flush().await.map_err(write_error)?;

        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| StagingError::InvalidName(path.display().to_string()))
    }
}

fn validate_names(uploads: &[Upload]) -> Result<(), StagingError> {
    if uploads.is_empty() {
        return Err(StagingError::NoUploads);
    }

    let mut seen = HashSet::with_capacity(uploads.len());
    for upload in uploads {
        let name = upload.display_name.as_str();
        let plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        if !plain || !name.ends_with(AUDIO_EXTENSION) || name == AUDIO_EXTENSION {
            return Err(StagingError::InvalidName(name.to_string()));
        }
        if !seen.insert(name) {
            return Err(StagingError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}
