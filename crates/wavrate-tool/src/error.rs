//! Error types for the audio tool bridge

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("sox not found. Install with: brew install sox")]
    SoxNotFound,

    #[error("FFmpeg not found. Install with: brew install ffmpeg")]
    FfmpegNotFound,

    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("{tool} failed with exit code {code:?}: {stderr}")]
    Failed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Could not read audio info from {tool} output: {detail}")]
    InfoParse { tool: &'static str, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
