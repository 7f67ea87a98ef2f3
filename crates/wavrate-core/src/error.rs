//! Error types for wavrate-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WavrateError>;

#[derive(Error, Debug)]
pub enum WavrateError {
    #[error("Nothing to convert: {0}")]
    Input(#[from] InputResolutionError),

    #[error("Staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Packaging failed: {0}")]
    Packaging(#[from] PackagingError),

    #[error("Output directory unusable: {0}")]
    OutputDir(#[from] OutputDirError),

    #[error("Audio tool error: {0}")]
    Tool(#[from] wavrate_tool::ToolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WavrateError {
    /// Input problems only mean the run never started
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WavrateError::Input(_))
    }

    /// Pipeline stage the error belongs to, for progress reporting
    pub fn stage(&self) -> &'static str {
        match self {
            WavrateError::Input(_) => "resolve",
            WavrateError::Staging(_) => "stage",
            WavrateError::Conversion(_) => "convert",
            WavrateError::Packaging(_) => "package",
            WavrateError::OutputDir(_) => "prepare",
            WavrateError::Tool(_) => "tool",
            WavrateError::Config(_) => "config",
            WavrateError::Io(_) => "io",
        }
    }
}

#[derive(Error, Debug)]
pub enum InputResolutionError {
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("no .wav files found in {0}")]
    NoAudioFiles(PathBuf),

    #[error("could not list {directory}: {reason}")]
    Unreadable { directory: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("no files were uploaded")]
    NoUploads,

    #[error("duplicate upload name: {0}")]
    DuplicateName(String),

    #[error("not a plain .wav file name: {0:?}")]
    InvalidName(String),

    #[error("could not stage {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),

    #[error("{name} ({position}/{total}): {cause}")]
    Item {
        name: String,
        /// 1-based position of the failing item
        position: usize,
        total: usize,
        /// Outputs written before the failure
        converted: Vec<PathBuf>,
        #[source]
        cause: ItemFailure,
    },
}

impl ConversionError {
    pub fn converted(&self) -> &[PathBuf] {
        match self {
            ConversionError::OutputDirMissing(_) => &[],
            ConversionError::Item { converted, .. } => converted,
        }
    }
}

#[derive(Error, Debug)]
pub enum ItemFailure {
    #[error("name has no staged file")]
    Unmapped,

    #[error(transparent)]
    Tool(#[from] wavrate_tool::ToolError),
}

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("no converted files to package")]
    NothingToPackage,

    #[error("could not add {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("packaging task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OutputDirError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("output directory is the input directory: {0}")]
    SameAsInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
