//! End-to-end upload run against an in-process resampler

use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use wavrate_core::engine::TargetRate;
use wavrate_core::pipeline::{Pipeline, PipelineSettings, PipelineStage, UploadRequest};
use wavrate_core::stager::Upload;
use wavrate_core::{AudioInfo, AudioTool, ToolError};

struct HoundTool;

fn failed(e: hound::Error) -> ToolError {
    ToolError::Failed {
        tool: "hound",
        code: None,
        stderr: e.to_string(),
    }
}

impl AudioTool for HoundTool {
    fn name(&self) -> &'static str {
        "hound"
    }

    async fn info(&self, path: &Path) -> Result<AudioInfo, ToolError> {
        let reader = hound::WavReader::open(path).map_err(failed)?;
        let spec = reader.spec();
        Ok(AudioInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bit_depth: Some(spec.bits_per_sample),
            duration: reader.duration() as f64 / spec.sample_rate as f64,
            num_samples: Some(reader.duration() as u64),
            encoding: None,
        })
    }

    async fn convert(&self, input: &Path, output: &Path, sample_rate: u32) -> Result<(), ToolError> {
        let mut reader = hound::WavReader::open(input).map_err(failed)?;
        let spec = reader.spec();
        let samples: Vec<i32> = reader
            .samples::<i32>()
            .collect::<Result<_, _>>()
            .map_err(failed)?;

        let out_len = samples.len() as u64 * sample_rate as u64 / spec.sample_rate as u64;
        let mut writer = hound::WavWriter::create(output, hound::WavSpec { sample_rate, ..spec })
            .map_err(failed)?;
        for i in 0..out_len as usize {
            let src = i * spec.sample_rate as usize / sample_rate as usize;
            writer.write_sample(samples[src]).map_err(failed)?;
        }
        writer.finalize().map_err(failed)
    }
}

fn pcm8_wav(sample_rate: u32, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i % 100) as i8).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[tokio::test]
async fn test_uploads_come_back_as_zip_at_target_rate() {
    let scratch = TempDir::new().unwrap();
    let settings = PipelineSettings {
        scratch_dir: scratch.path().to_path_buf(),
        dir_name: "convert_samplerate".to_string(),
        archive_name: "convert_samplerate.zip".to_string(),
    };
    let pipeline = Pipeline::new(HoundTool, settings);

    let request = UploadRequest {
        uploads: vec![
            Upload::new("a.wav", pcm8_wav(8000, 8000)),
            Upload::new("b.wav", pcm8_wav(22050, 11025)),
        ],
        rate: TargetRate::Hz16000,
        preview: Some("b.wav".to_string()),
    };

    let mut converting = Vec::new();
    let delivery = pipeline
        .run_upload(request, |stage| {
            if let PipelineStage::Converting(p) = stage {
                converting.push(p.completed_count);
            }
        })
        .await
        .unwrap();

    assert_eq!(converting, vec![1, 2]);
    assert_eq!(delivery.file_name, "convert_samplerate.zip");
    assert_eq!(delivery.entries, vec!["a.wav", "b.wav"]);

    let preview = delivery.preview.unwrap();
    assert_eq!(preview.name, "b.wav");
    assert_eq!(preview.before.sample_rate, 22050);
    assert_eq!(preview.after.sample_rate, 16000);

    // the archive was read into memory; unpack it somewhere else and inspect
    let unpacked = TempDir::new().unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(delivery.bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    for name in ["a.wav", "b.wav"] {
        let mut entry = archive.by_name(name).unwrap();
        let target = unpacked.path().join(name);
        let mut file = std::fs::File::create(&target).unwrap();
        std::io::copy(&mut entry, &mut file).unwrap();
        drop(file);

        let info = HoundTool.info(&target).await.unwrap();
        assert_eq!(info.sample_rate, 16000);
        assert_eq!(info.bit_depth, Some(8));
        assert!((info.duration - 0.5).abs() < 0.01 || (info.duration - 1.0).abs() < 0.01);
    }

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
