pub mod config;
pub mod convert;
pub mod doctor;
pub mod info;
pub mod pack;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::args::ConvertOptions;
use wavrate_core::{
    config::Config,
    engine::TargetRate,
    pipeline::{Pipeline, PipelineSettings, PipelineStage, Preview},
    ExternalTool,
};

/// Load config and locate the audio tool
pub fn build_pipeline(config_path: Option<&Path>) -> Result<(Config, Pipeline<ExternalTool>)> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let tool = config.audio_tool().context("No usable audio tool (try `wavrate doctor`)")?;
    let pipeline = Pipeline::new(tool, PipelineSettings::from_config(&config));
    Ok((config, pipeline))
}

pub fn target_rate(options: &ConvertOptions, config: &Config) -> Result<TargetRate> {
    match options.rate {
        Some(rate) => Ok(rate.into()),
        None => Ok(config.default_rate()?),
    }
}

/// Drive a progress bar from pipeline stages until the sender is dropped
pub fn spawn_progress(mut rx: mpsc::UnboundedReceiver<PipelineStage>) -> Result<JoinHandle<()>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    Ok(tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Resolving { input } => {
                    pb.set_message(format!("Looking for WAV files in {}", input));
                }
                PipelineStage::Resolved { directory, count } => {
                    pb.set_length(count as u64);
                    pb.set_message(format!("{} file(s) in {}", count, directory.display()));
                }
                PipelineStage::Staging { count } => {
                    pb.set_length(count as u64);
                    pb.set_message(format!("Staging {} upload(s)", count));
                }
                PipelineStage::Converting(p) => {
                    pb.set_length(p.total_count as u64);
                    pb.set_position(p.completed_count as u64);
                    pb.set_message(format!(
                        "converted {}/{}, elapsed {:.0}s or {:.2}m",
                        p.completed_count,
                        p.total_count,
                        p.elapsed_seconds,
                        p.elapsed_seconds / 60.0
                    ));
                }
                PipelineStage::Packaging { files } => {
                    pb.set_message(format!("Packaging {} file(s)", files));
                }
                PipelineStage::Complete { converted, duration } => {
                    pb.finish_with_message(format!(
                        "Done: {} file(s) ({:.1}s)",
                        converted,
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
        if !pb.is_finished() {
            pb.finish_and_clear();
        }
    }))
}

pub fn print_preview(preview: &Preview) {
    println!("\n{}", preview.name);
    println!(
        "  before: {} Hz, {} ch, {:.2}s",
        preview.before.sample_rate, preview.before.channels, preview.before.duration
    );
    println!(
        "  after:  {} Hz, {} ch, {:.2}s",
        preview.after.sample_rate, preview.after.channels, preview.after.duration
    );
}
