//! wavrate-core: batch WAV sample-rate conversion with transient file cleanup

pub mod cleanup;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod output_dir;
pub mod packager;
pub mod pipeline;
pub mod resolver;
pub mod source;
pub mod stager;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{Result, WavrateError};
pub use wavrate_tool::{AudioInfo, AudioTool, ExternalTool, ToolBackend, ToolError};
