//! Zip packaging of converted files for upload-originated runs

use crate::cleanup::CleanupCoordinator;
use crate::error::PackagingError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write `files` into a zip at `archive_path`, each under its base name.
///
/// The archive path is registered with `cleanup` before it is created, so a
/// partial archive from a failed write is removed with the rest of the run.
pub async fn package(
    files: &[PathBuf],
    archive_path: &Path,
    cleanup: &mut CleanupCoordinator,
) -> Result<PathBuf, PackagingError> {
    if files.is_empty() {
        return Err(PackagingError::NothingToPackage);
    }

    cleanup.register(archive_path);
    info!("Packaging {} file(s) into {}", files.len(), archive_path.display());

    let files = files.to_vec();
    let target = archive_path.to_path_buf();
    tokio::task::spawn_blocking(move || write_archive(&files, &target))
        .await
        .map_err(|e| PackagingError::Task(e.to_string()))??;

    Ok(archive_path.to_path_buf())
}

/// Base name under which `path` is stored in the archive
pub fn entry_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

fn write_archive(files: &[PathBuf], archive_path: &Path) -> Result<(), PackagingError> {
    let archive = File::create(archive_path)?;
    let mut zip = ZipWriter::new(archive);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = entry_name(path).ok_or_else(|| PackagingError::Read {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no usable file name"),
        })?;
        let mut source = File::open(path).map_err(|source| PackagingError::Read {
            path: path.clone(),
            source,
        })?;

        zip.start_file(name.as_str(), options)?;
        std::io::copy(&mut source, &mut zip)?;
        debug!("Added {} to archive", name);
    }

    zip.finish()?;
    Ok(())
}
