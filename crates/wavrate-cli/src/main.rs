mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "wavrate=info,wavrate_core=info,wavrate_tool=info",
        1 => "wavrate=debug,wavrate_core=debug,wavrate_tool=debug",
        2 => "wavrate=trace,wavrate_core=trace,wavrate_tool=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            options,
        }) => commands::convert::run(&input, output, &options, config_path).await,
        Some(Commands::Pack {
            files,
            output,
            options,
        }) => commands::pack::run(&files, &output, &options, config_path).await,
        Some(Commands::Info { input, json }) => commands::info::run(&input, json, config_path).await,
        Some(Commands::Doctor) => commands::doctor::run(config_path).await,
        Some(Commands::Config) => commands::config::run(config_path).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
