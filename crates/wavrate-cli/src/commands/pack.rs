use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::mpsc;

use super::{build_pipeline, print_preview, spawn_progress, target_rate};
use crate::args::ConvertOptions;
use wavrate_core::{pipeline::UploadRequest, stager::Upload};

pub async fn run(
    files: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let (config, pipeline) = build_pipeline(config_path)?;
    let rate = target_rate(options, &config)?;

    if !output.is_dir() {
        bail!("Output directory does not exist: {}", output.display());
    }

    let uploads = try_join_all(files.iter().map(|p| open_upload(p))).await?;

    let (tx, rx) = mpsc::unbounded_channel();
    let progress = spawn_progress(rx)?;

    let result = pipeline
        .run_upload(
            UploadRequest {
                uploads,
                rate,
                preview: options.preview.clone(),
            },
            |stage| {
                let _ = tx.send(stage);
            },
        )
        .await;
    drop(tx);
    progress.await?;

    let delivery = match result {
        Ok(delivery) => delivery,
        Err(e) => {
            eprintln!("\nError: {}", e);
            eprintln!("Run stopped, please retry.");
            return Err(e.into());
        }
    };

    let target = output.join(&delivery.file_name);
    fs::write(&target, &delivery.bytes)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    if let Some(preview) = &delivery.preview {
        print_preview(preview);
    }
    println!("\nArchive: {} ({} entries)", target.display(), delivery.entries.len());
    for entry in &delivery.entries {
        println!("  {}", entry);
    }
    Ok(())
}

/// Check the file up front; its bytes are copied while staging
async fn open_upload(path: &Path) -> Result<Upload> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let metadata = fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Not a regular file: {}", path.display());
    }
    Ok(Upload::from_file(name, path.to_path_buf()))
}
