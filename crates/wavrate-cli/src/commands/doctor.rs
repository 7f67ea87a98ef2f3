use anyhow::Result;
use std::path::Path;
use std::process::Command;
use which::which;

use wavrate_core::{config::Config, ToolBackend};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    println!("wavrate dependency check\n");

    let config = Config::load(config_path)?;

    let sox_ok = check("sox", &["--version"], "brew install sox  |  apt install sox");
    let ffmpeg_ok = check("ffmpeg", &["-version"], "brew install ffmpeg  |  apt install ffmpeg");

    println!("\nConfigured backend: {}", config.tool.backend);

    let backend_ok = match config.tool.backend {
        ToolBackend::Sox => sox_ok || config.tool.sox.as_ref().is_some_and(|p| p.exists()),
        ToolBackend::Ffmpeg => ffmpeg_ok || config.tool.ffmpeg.as_ref().is_some_and(|p| p.exists()),
    };

    println!();
    if backend_ok {
        println!("All dependencies OK!");
    } else {
        println!(
            "The configured backend ({}) is missing. Install it or set tool.backend.",
            config.tool.backend
        );
    }

    Ok(())
}

fn check(binary: &str, version_args: &[&str], install_hint: &str) -> bool {
    print!("{:<8}", format!("{}:", binary));
    match which(binary) {
        Ok(path) => match Command::new(&path).args(version_args).output() {
            Ok(out) => {
                let first_line = String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .to_string();
                let version = first_line
                    .split_whitespace()
                    .find(|w| w.chars().next().is_some_and(|c| c.is_ascii_digit() || c == 'v'))
                    .unwrap_or("unknown")
                    .to_string();
                println!("OK ({})", version);
                true
            }
            Err(_) => {
                println!("FOUND but failed to get version");
                false
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("        Install with: {}", install_hint);
            false
        }
    }
}
