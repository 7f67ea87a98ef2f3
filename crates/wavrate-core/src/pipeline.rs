//! Pipeline orchestration for path and upload conversion runs

use crate::context::{RunContext, SourceOrigin};
use crate::engine::{ConversionEngine, ConversionJob, ConversionProgress, TargetRate};
use crate::error::{OutputDirError, WavrateError};
use crate::output_dir::prepare_output_dir;
use crate::packager::{self, entry_name};
use crate::resolver::resolve;
use crate::source::SourceSet;
use crate::stager::{Upload, UploadStager};
use crate::Config;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wavrate_tool::{AudioInfo, AudioTool};

/// Where converted files and staged uploads go
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub scratch_dir: PathBuf,
    pub dir_name: String,
    pub archive_name: String,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: config.temp_dir(),
            dir_name: config.output.dir_name.clone(),
            archive_name: config.output.archive_name.clone(),
        }
    }
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Resolving { input: String },
    Resolved { directory: PathBuf, count: usize },
    Staging { count: usize },
    Converting(ConversionProgress),
    Packaging { files: usize },
    Complete { converted: usize, duration: Duration },
    Failed { stage: String, error: String },
}

/// Convert files that already live on the user's filesystem
#[derive(Debug, Clone)]
pub struct PathRequest {
    pub input: String,
    /// Root under which the output subdirectory is created (input directory if unset)
    pub output_root: Option<PathBuf>,
    pub rate: TargetRate,
    /// Display name to inspect before and after conversion (first file if unset)
    pub preview: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PathReport {
    pub output_dir: PathBuf,
    pub converted: Vec<PathBuf>,
    pub elapsed: Duration,
    pub preview: Option<Preview>,
}

/// Convert uploaded blobs and hand back a single archive
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub uploads: Vec<Upload>,
    pub rate: TargetRate,
    pub preview: Option<String>,
}

/// The archive offered for download. Its server-side file is already gone.
#[derive(Debug, Clone)]
pub struct ArchiveDelivery {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entries: Vec<String>,
    pub elapsed: Duration,
    pub preview: Option<Preview>,
}

/// Metadata of one selected file before and after conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub name: String,
    pub before: AudioInfo,
    pub after: AudioInfo,
}

/// Main processing pipeline
#[derive(Debug)]
pub struct Pipeline<T: AudioTool> {
    tool: T,
    settings: PipelineSettings,
}

impl<T: AudioTool> Pipeline<T> {
    pub fn new(tool: T, settings: PipelineSettings) -> Self {
        Self { tool, settings }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Resolve `request.input`, convert into `<root>/<dir_name>/` and leave
    /// the results on disk.
    ///
    /// Input problems come back as `WavrateError::Input` before any work is
    /// done. A failed conversion keeps the files converted so far; the error
    /// lists them.
    pub async fn run_path<F>(&self, request: PathRequest, mut observer: F) -> Result<PathReport, WavrateError>
    where
        F: FnMut(PipelineStage),
    {
        let start = Instant::now();
        let mut ctx = RunContext::new(SourceOrigin::Path);

        let result = self.path_run(request, &mut ctx, &mut observer).await;
        ctx.release();

        match result {
            Ok((output_dir, converted, preview)) => {
                let elapsed = start.elapsed();
                info!(
                    "Run {} complete: {} file(s) in {} ({:.1}s)",
                    ctx.id(),
                    converted.len(),
                    output_dir.display(),
                    elapsed.as_secs_f32()
                );
                observer(PipelineStage::Complete {
                    converted: converted.len(),
                    duration: elapsed,
                });
                Ok(PathReport {
                    output_dir,
                    converted,
                    elapsed,
                    preview,
                })
            }
            Err(e) => {
                if e.is_fatal() {
                    observer(PipelineStage::Failed {
                        stage: e.stage().to_string(),
                        error: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    async fn path_run<F>(
        &self,
        request: PathRequest,
        ctx: &mut RunContext,
        observer: &mut F,
    ) -> Result<(PathBuf, Vec<PathBuf>, Option<Preview>), WavrateError>
    where
        F: FnMut(PipelineStage),
    {
        observer(PipelineStage::Resolving {
            input: request.input.clone(),
        });
        let source = resolve(&request.input).await.into_source_set()?;
        observer(PipelineStage::Resolved {
            directory: source.directory().to_path_buf(),
            count: source.len(),
        });

        let output_root = request
            .output_root
            .clone()
            .unwrap_or_else(|| source.directory().to_path_buf());
        let output_dir = prepare_output_dir(&output_root, &self.settings.dir_name).await?;
        if same_directory(&output_dir, source.directory()).await {
            return Err(OutputDirError::SameAsInput(output_dir).into());
        }

        let (preview_name, before) = self.inspect_before(&source, request.preview.as_deref()).await;

        let job = ConversionJob {
            source,
            target_rate: request.rate,
            output_directory: output_dir.clone(),
        };
        let converted = ConversionEngine::new(&self.tool)
            .convert_all(job, ctx, |p| observer(PipelineStage::Converting(*p)))
            .await?;

        let preview = self.inspect_after(preview_name, before, &output_dir).await;
        Ok((output_dir, converted, preview))
    }

    /// Stage the uploads, convert them in a run directory under the scratch
    /// directory, zip the results and return the archive bytes.
    ///
    /// Every staged input, converted output and the archive itself are
    /// removed before this returns, on success and on failure.
    pub async fn run_upload<F>(&self, request: UploadRequest, mut observer: F) -> Result<ArchiveDelivery, WavrateError>
    where
        F: FnMut(PipelineStage),
    {
        let start = Instant::now();
        let mut ctx = RunContext::new(SourceOrigin::Upload);

        let result = self.upload_run(request, &mut ctx, &mut observer).await;

        let report = ctx.release();
        if !report.is_clean() {
            warn!(
                "Run {} left {} transient path(s) behind",
                ctx.id(),
                report.failed.len()
            );
        }

        match result {
            Ok(mut delivery) => {
                delivery.elapsed = start.elapsed();
                info!(
                    "Run {} complete: {} ({} entries, {:.1}s)",
                    ctx.id(),
                    delivery.file_name,
                    delivery.entries.len(),
                    delivery.elapsed.as_secs_f32()
                );
                observer(PipelineStage::Complete {
                    converted: delivery.entries.len(),
                    duration: delivery.elapsed,
                });
                Ok(delivery)
            }
            Err(e) => {
                observer(PipelineStage::Failed {
                    stage: e.stage().to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn upload_run<F>(
        &self,
        request: UploadRequest,
        ctx: &mut RunContext,
        observer: &mut F,
    ) -> Result<ArchiveDelivery, WavrateError>
    where
        F: FnMut(PipelineStage),
    {
        tokio::fs::create_dir_all(&self.settings.scratch_dir).await?;

        observer(PipelineStage::Staging {
            count: request.uploads.len(),
        });
        let stager = UploadStager::new(self.settings.scratch_dir.clone());
        let source = stager.stage(request.uploads, ctx.cleanup_mut()).await?;

        let run_dir = self.settings.scratch_dir.join(format!("wavrate-{}", ctx.id()));
        ctx.cleanup_mut().register(&run_dir);
        tokio::fs::create_dir(&run_dir).await?;
        let output_dir = prepare_output_dir(&run_dir, &self.settings.dir_name).await?;
        debug!("Run directory: {}", run_dir.display());

        let (preview_name, before) = self.inspect_before(&source, request.preview.as_deref()).await;

        let job = ConversionJob {
            source,
            target_rate: request.rate,
            output_directory: output_dir.clone(),
        };
        let converted = ConversionEngine::new(&self.tool)
            .convert_all(job, ctx, |p| observer(PipelineStage::Converting(*p)))
            .await?;

        let preview = self.inspect_after(preview_name, before, &output_dir).await;

        observer(PipelineStage::Packaging {
            files: converted.len(),
        });
        let archive_path = run_dir.join(&self.settings.archive_name);
        packager::package(&converted, &archive_path, ctx.cleanup_mut()).await?;
        let bytes = tokio::fs::read(&archive_path).await?;

        Ok(ArchiveDelivery {
            file_name: self.settings.archive_name.clone(),
            bytes,
            entries: converted.iter().filter_map(|p| entry_name(p)).collect(),
            elapsed: Duration::ZERO,
            preview,
        })
    }

    /// Pick the preview file and read its metadata before conversion
    async fn inspect_before(
        &self,
        source: &SourceSet,
        requested: Option<&str>,
    ) -> (Option<String>, Option<AudioInfo>) {
        let name = match requested {
            Some(name) if source.contains(name) => name.to_string(),
            Some(name) => {
                warn!("Preview file {:?} is not part of the batch, using the first file", name);
                match source.display_names().first() {
                    Some(first) => first.clone(),
                    None => return (None, None),
                }
            }
            None => match source.display_names().first() {
                Some(first) => first.clone(),
                None => return (None, None),
            },
        };

        let info = match source.input_path(&name) {
            Some(path) => self.read_info(&path).await,
            None => None,
        };
        (Some(name), info)
    }

    async fn inspect_after(
        &self,
        name: Option<String>,
        before: Option<AudioInfo>,
        output_dir: &Path,
    ) -> Option<Preview> {
        let name = name?;
        let before = before?;
        let after = self.read_info(&output_dir.join(&name)).await?;
        Some(Preview { name, before, after })
    }

    async fn read_info(&self, path: &Path) -> Option<AudioInfo> {
        match self.tool.info(path).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Could not read audio info for {}: {}", path.display(), e);
                None
            }
        }
    }
}

async fn same_directory(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
