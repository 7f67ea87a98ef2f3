//! In-process stand-in for the external audio tool

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wavrate_tool::{AudioInfo, AudioTool, ToolError};

/// Write a mono PCM WAV file with a simple ramp signal
pub(crate) fn write_wav(path: &Path, sample_rate: u32, bits_per_sample: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        match bits_per_sample {
            8 => writer.write_sample(((i % 200) as i16 - 100) as i8).unwrap(),
            _ => writer.write_sample(((i % 2000) as i16 - 1000) * 8).unwrap(),
        }
    }
    writer.finalize().unwrap();
}

/// Nearest-neighbour resampler backed by `hound`.
///
/// Can be told to fail on one output name, in which case it leaves a
/// truncated output file behind like a crashed tool would.
#[derive(Debug, Default)]
pub(crate) struct FakeTool {
    fail_on: Option<String>,
    attempts: Mutex<usize>,
    converted: Mutex<Vec<PathBuf>>,
}

impl FakeTool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub(crate) fn converted_inputs(&self) -> Vec<PathBuf> {
        self.converted.lock().unwrap().clone()
    }
}

fn hound_error(e: hound::Error) -> ToolError {
    ToolError::Failed {
        tool: "fake",
        code: None,
        stderr: e.to_string(),
    }
}

impl AudioTool for FakeTool {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn info(&self, path: &Path) -> Result<AudioInfo, ToolError> {
        if !path.exists() {
            return Err(ToolError::InputMissing(path.to_path_buf()));
        }
        let reader = hound::WavReader::open(path).map_err(hound_error)?;
        let spec = reader.spec();
        let frames = reader.duration();
        Ok(AudioInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bit_depth: Some(spec.bits_per_sample),
            duration: frames as f64 / spec.sample_rate as f64,
            num_samples: Some(frames as u64),
            encoding: Some("Signed Integer PCM".to_string()),
        })
    }

    async fn convert(&self, input: &Path, output: &Path, sample_rate: u32) -> Result<(), ToolError> {
        *self.attempts.lock().unwrap() += 1;

        if !input.exists() {
            return Err(ToolError::InputMissing(input.to_path_buf()));
        }

        let output_name = output.file_name().and_then(|n| n.to_str());
        if output_name.is_some() && output_name == self.fail_on.as_deref() {
            std::fs::write(output, b"RIFF")?;
            return Err(ToolError::Failed {
                tool: "fake",
                code: Some(2),
                stderr: "simulated failure".to_string(),
            });
        }

        let mut reader = hound::WavReader::open(input).map_err(hound_error)?;
        let spec = reader.spec();
        let samples: Vec<i32> = reader
            .samples::<i32>()
            .collect::<Result<_, _>>()
            .map_err(hound_error)?;

        let channels = spec.channels as usize;
        let frames = samples.len() / channels;
        let new_frames = (frames as u64 * sample_rate as u64 / spec.sample_rate as u64) as usize;

        let out_spec = hound::WavSpec {
            sample_rate,
            ..spec
        };
        let mut writer = hound::WavWriter::create(output, out_spec).map_err(hound_error)?;
        for frame in 0..new_frames {
            let src = frame * spec.sample_rate as usize / sample_rate as usize;
            for ch in 0..channels {
                writer
                    .write_sample(samples[src * channels + ch])
                    .map_err(hound_error)?;
            }
        }
        writer.finalize().map_err(hound_error)?;

        self.converted.lock().unwrap().push(input.to_path_buf());
        Ok(())
    }
}
