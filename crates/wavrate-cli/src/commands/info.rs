use anyhow::{Context, Result};
use std::path::Path;

use super::build_pipeline;
use wavrate_core::AudioTool;

pub async fn run(input: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    let (_, pipeline) = build_pipeline(config_path)?;
    let info = pipeline
        .tool()
        .info(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}\n", input.display());
    println!("  sample rate: {} Hz", info.sample_rate);
    println!("  channels:    {}", info.channels);
    match info.bit_depth {
        Some(bits) => println!("  bit depth:   {}", bits),
        None => println!("  bit depth:   (unknown)"),
    }
    println!("  duration:    {:.3}s", info.duration);
    if let Some(samples) = info.num_samples {
        println!("  samples:     {}", samples);
    }
    if let Some(ref encoding) = info.encoding {
        println!("  encoding:    {}", encoding);
    }
    println!(
        "  via:         {} ({})",
        pipeline.tool().name(),
        pipeline.tool().binary().display()
    );

    Ok(())
}
