use anyhow::Result;
use std::path::Path;
use wavrate_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("wavrate configuration\n");
    print!("{}", config.to_toml()?);

    if config.temp.directory.is_none() {
        println!("\n# temp.directory unset, scratch files go to {}", config.temp_dir().display());
    }

    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(p) = Config::default_location() {
        println!("  2. {}", p.display());
    }
    println!("  3. Environment variables (WAVRATE_*, nested keys joined with __)");

    Ok(())
}
