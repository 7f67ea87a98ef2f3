use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wavrate_core::engine::TargetRate;

#[derive(Parser)]
#[command(name = "wavrate")]
#[command(author, version, about = "Batch WAV sample-rate conversion")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a WAV file or every WAV file in a directory
    Convert {
        /// WAV file or directory
        input: String,

        /// Root under which `convert_samplerate/` is created (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// Convert files as uploads and write a zip of the results
    Pack {
        /// WAV files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory the archive is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// Show audio metadata of a WAV file
    Info {
        /// WAV file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that an audio tool is installed
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone)]
pub struct ConvertOptions {
    /// Target sample rate (falls back to `convert.default_rate`)
    #[arg(short, long, value_enum)]
    pub rate: Option<Rate>,

    /// File to show metadata for before and after conversion
    #[arg(long, value_name = "NAME")]
    pub preview: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rate {
    /// 11025 Hz
    #[value(name = "11k")]
    Hz11025,
    /// 16000 Hz
    #[value(name = "16k")]
    Hz16000,
}

impl From<Rate> for TargetRate {
    fn from(rate: Rate) -> Self {
        match rate {
            Rate::Hz11025 => TargetRate::Hz11025,
            Rate::Hz16000 => TargetRate::Hz16000,
        }
    }
}
