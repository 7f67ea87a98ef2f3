use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::{build_pipeline, print_preview, spawn_progress, target_rate};
use crate::args::ConvertOptions;
use wavrate_core::{pipeline::PathRequest, WavrateError};

pub async fn run(
    input: &str,
    output: Option<PathBuf>,
    options: &ConvertOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let (config, pipeline) = build_pipeline(config_path)?;
    let rate = target_rate(options, &config)?;

    let request = PathRequest {
        input: input.to_string(),
        output_root: output.or_else(|| config.output.default_directory.clone()),
        rate,
        preview: options.preview.clone(),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let progress = spawn_progress(rx)?;

    let result = pipeline
        .run_path(request, |stage| {
            let _ = tx.send(stage);
        })
        .await;
    drop(tx);
    progress.await?;

    match result {
        Ok(report) => {
            if let Some(preview) = &report.preview {
                print_preview(preview);
            }
            println!("\nOutput: {}", report.output_dir.display());
            Ok(())
        }
        Err(WavrateError::Input(e)) => {
            tracing::warn!("{}", e);
            println!("No WAV files to convert, check the input path.");
            Ok(())
        }
        Err(e) => {
            if let WavrateError::Conversion(conversion) = &e {
                let converted = conversion.converted();
                if !converted.is_empty() {
                    eprintln!("\n{} file(s) were converted before the failure:", converted.len());
                    for path in converted {
                        eprintln!("  {}", path.display());
                    }
                }
            }
            eprintln!("\nError: {}", e);
            eprintln!("Run stopped, please retry.");
            Err(e.into())
        }
    }
}
