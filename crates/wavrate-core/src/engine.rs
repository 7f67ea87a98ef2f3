//! Sequential batch conversion through the external audio tool

use crate::context::RunContext;
use crate::error::{ConfigError, ConversionError, ItemFailure};
use crate::source::SourceSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn};
use wavrate_tool::AudioTool;

/// Supported output sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRate {
    Hz11025,
    Hz16000,
}

impl TargetRate {
    pub const ALL: [TargetRate; 2] = [TargetRate::Hz11025, TargetRate::Hz16000];

    pub fn hz(&self) -> u32 {
        match self {
            TargetRate::Hz11025 => 11025,
            TargetRate::Hz16000 => 16000,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            TargetRate::Hz11025 => "11k",
            TargetRate::Hz16000 => "16k",
        }
    }

    pub fn from_token(token: &str) -> Result<Self, ConfigError> {
        match token {
            "11k" => Ok(TargetRate::Hz11025),
            "16k" => Ok(TargetRate::Hz16000),
            other => Err(ConfigError::InvalidValue(format!(
                "unsupported sample rate {:?} (expected \"11k\" or \"16k\")",
                other
            ))),
        }
    }
}

impl FromStr for TargetRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl std::fmt::Display for TargetRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} Hz)", self.token(), self.hz())
    }
}

/// One batch to convert, consumed by `ConversionEngine::convert_all`
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source: SourceSet,
    pub target_rate: TargetRate,
    pub output_directory: PathBuf,
}

/// Snapshot handed to the progress observer after every item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionProgress {
    pub completed_count: usize,
    pub total_count: usize,
    pub elapsed_seconds: f64,
}

impl ConversionProgress {
    pub fn is_complete(&self) -> bool {
        self.completed_count == self.total_count
    }
}

#[derive(Debug)]
pub struct ConversionEngine<'a, T: AudioTool> {
    tool: &'a T,
}

impl<'a, T: AudioTool> ConversionEngine<'a, T> {
    pub fn new(tool: &'a T) -> Self {
        Self { tool }
    }

    /// Convert every item of `job` in display order.
    ///
    /// Each output is written as `output_directory/<display name>`. The first
    /// failing item stops the batch; nothing after it is attempted.
    pub async fn convert_all<F>(
        &self,
        job: ConversionJob,
        ctx: &mut RunContext,
        mut on_progress: F,
    ) -> Result<Vec<PathBuf>, ConversionError>
    where
        F: FnMut(&ConversionProgress),
    {
        let total = job.source.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let output_ok = tokio::fs::metadata(&job.output_directory)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !output_ok {
            return Err(ConversionError::OutputDirMissing(job.output_directory));
        }

        info!(
            "Converting {} file(s) to {} with {}",
            total,
            job.target_rate,
            self.tool.name()
        );

        let start = Instant::now();
        let mut converted = Vec::with_capacity(total);

        for (index, name) in job.source.display_names().iter().enumerate() {
            let position = index + 1;

            let Some(input) = job.source.input_path(name) else {
                return Err(ConversionError::Item {
                    name: name.clone(),
                    position,
                    total,
                    converted,
                    cause: ItemFailure::Unmapped,
                });
            };
            let output = job.output_directory.join(name);
            ctx.track_output(&output);

            debug!("[{}/{}] {} -> {}", position, total, input.display(), output.display());

            if let Err(e) = self.tool.convert(&input, &output, job.target_rate.hz()).await {
                warn!(
                    "Conversion of {} failed, skipping {} remaining item(s)",
                    name,
                    total - position
                );
                discard_partial_output(&output).await;
                return Err(ConversionError::Item {
                    name: name.clone(),
                    position,
                    total,
                    converted,
                    cause: e.into(),
                });
            }
            converted.push(output);

            on_progress(&ConversionProgress {
                completed_count: position,
                total_count: total,
                elapsed_seconds: start.elapsed().as_secs_f64(),
            });
        }

        info!(
            "Converted {} file(s) in {:.1}s",
            converted.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(converted)
    }
}

/// Remove whatever a failed tool run left at `output`
async fn discard_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial output {}: {}", output.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SourceOrigin;
    use crate::testing::{write_wav, FakeTool};
    use tempfile::TempDir;

    fn source_with(dir: &TempDir, names: &[&str]) -> SourceSet {
        for (i, name) in names.iter().enumerate() {
            write_wav(&dir.path().join(name), 8000, 8, 400 + i * 100);
        }
        SourceSet::from_listing(
            dir.path().to_path_buf(),
            names.iter().map(|n| n.to_string()).collect(),
        )
    }

    #[test]
    fn test_rate_tokens() {
        assert_eq!(TargetRate::from_token("11k").unwrap().hz(), 11025);
        assert_eq!("16k".parse::<TargetRate>().unwrap().hz(), 16000);
        assert!(TargetRate::from_token("44k").is_err());
        assert!(TargetRate::from_token("16000").is_err());
        for rate in TargetRate::ALL {
            assert_eq!(TargetRate::from_token(rate.token()).unwrap(), rate);
        }
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ordered() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let tool = FakeTool::new();
        let job = ConversionJob {
            source: source_with(&input, &["a.wav", "b.wav", "c.wav"]),
            target_rate: TargetRate::Hz16000,
            output_directory: output.path().to_path_buf(),
        };

        let mut snapshots = Vec::new();
        let mut ctx = RunContext::new(SourceOrigin::Path);
        let converted = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |p| snapshots.push(*p))
            .await
            .unwrap();

        assert_eq!(
            converted,
            vec![
                output.path().join("a.wav"),
                output.path().join("b.wav"),
                output.path().join("c.wav"),
            ]
        );
        assert_eq!(snapshots.len(), 3);
        for (i, snapshot) in snapshots.iter().enumerate() {
            assert_eq!(snapshot.completed_count, i + 1);
            assert_eq!(snapshot.total_count, 3);
        }
        for pair in snapshots.windows(2) {
            assert!(pair[1].elapsed_seconds >= pair[0].elapsed_seconds);
        }
        assert!(snapshots.last().unwrap().is_complete());
        assert_eq!(tool.converted_inputs(), vec![
            input.path().join("a.wav"),
            input.path().join("b.wav"),
            input.path().join("c.wav"),
        ]);
        // path input: outputs belong to the user
        assert!(ctx.cleanup().is_empty());
    }

    #[tokio::test]
    async fn test_outputs_use_display_names() {
        let scratch = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_wav(&scratch.path().join("wavrate-x1.wav"), 8000, 8, 200);

        let source = SourceSet::from_staged(
            scratch.path().to_path_buf(),
            vec![("voice.wav".to_string(), "wavrate-x1.wav".to_string())],
        )
        .unwrap();
        let job = ConversionJob {
            source,
            target_rate: TargetRate::Hz11025,
            output_directory: output.path().to_path_buf(),
        };

        let tool = FakeTool::new();
        let mut ctx = RunContext::new(SourceOrigin::Upload);
        let converted = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |_| {})
            .await
            .unwrap();

        let expected = output.path().join("voice.wav");
        assert_eq!(converted, vec![expected.clone()]);
        assert_eq!(tool.info(&expected).await.unwrap().sample_rate, 11025);
        assert!(ctx.cleanup().is_registered(&expected));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_items() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let tool = FakeTool::failing_on("b.wav");
        let job = ConversionJob {
            source: source_with(&input, &["a.wav", "b.wav", "c.wav", "d.wav"]),
            target_rate: TargetRate::Hz16000,
            output_directory: output.path().to_path_buf(),
        };

        let mut progress_calls = 0;
        let mut ctx = RunContext::new(SourceOrigin::Path);
        let err = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |_| progress_calls += 1)
            .await
            .unwrap_err();

        match &err {
            ConversionError::Item {
                name,
                position,
                total,
                converted,
                ..
            } => {
                assert_eq!(name, "b.wav");
                assert_eq!(*position, 2);
                assert_eq!(*total, 4);
                assert_eq!(converted, &vec![output.path().join("a.wav")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(progress_calls, 1);
        assert_eq!(tool.attempts(), 2);
        assert!(output.path().join("a.wav").exists());
        // the tool's truncated b.wav must not survive
        assert!(!output.path().join("b.wav").exists());
        assert!(!output.path().join("c.wav").exists());
        assert!(!output.path().join("d.wav").exists());
    }

    #[tokio::test]
    async fn test_empty_source_never_calls_tool() {
        let tool = FakeTool::new();
        let job = ConversionJob {
            source: SourceSet::from_listing(PathBuf::from("/nowhere"), Vec::new()),
            target_rate: TargetRate::Hz16000,
            output_directory: PathBuf::from("/also/nowhere"),
        };

        let mut ctx = RunContext::new(SourceOrigin::Path);
        let converted = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |_| panic!("no progress expected"))
            .await
            .unwrap();

        assert!(converted.is_empty());
        assert_eq!(tool.attempts(), 0);
    }

    #[tokio::test]
    async fn test_missing_output_directory() {
        let input = TempDir::new().unwrap();
        let tool = FakeTool::new();
        let job = ConversionJob {
            source: source_with(&input, &["a.wav"]),
            target_rate: TargetRate::Hz16000,
            output_directory: input.path().join("missing"),
        };

        let mut ctx = RunContext::new(SourceOrigin::Path);
        let err = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::OutputDirMissing(_)));
        assert_eq!(tool.attempts(), 0);
    }

    #[tokio::test]
    async fn test_missing_input_is_item_failure() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = SourceSet::from_listing(
            input.path().to_path_buf(),
            vec!["gone.wav".to_string()],
        );
        let tool = FakeTool::new();
        let job = ConversionJob {
            source,
            target_rate: TargetRate::Hz16000,
            output_directory: output.path().to_path_buf(),
        };

        let mut ctx = RunContext::new(SourceOrigin::Path);
        let err = ConversionEngine::new(&tool)
            .convert_all(job, &mut ctx, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Item {
                position: 1,
                cause: ItemFailure::Tool(wavrate_tool::ToolError::InputMissing(_)),
                ..
            }
        ));
    }
}
