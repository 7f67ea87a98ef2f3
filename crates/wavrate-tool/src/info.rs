//! Audio metadata as reported by the external tool

use crate::ToolError;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: Option<u16>,
    /// Duration in seconds
    pub duration: f64,
    pub num_samples: Option<u64>,
    pub encoding: Option<String>,
}

/// Parse the report printed by `sox --i <file>`
///
/// ```text
/// Channels       : 1
/// Sample Rate    : 16000
/// Precision      : 16-bit
/// Duration       : 00:00:01.00 = 16000 samples ~ 75 CDDA sectors
/// Sample Encoding: 16-bit Signed Integer PCM
/// ```
pub(crate) fn parse_sox_info(report: &str) -> Result<AudioInfo, ToolError> {
    let sample_rate = capture(report, r"Sample Rate\s*:\s*(\d+)")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| sox_parse_error("missing sample rate"))?;
    let channels = capture(report, r"Channels\s*:\s*(\d+)")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| sox_parse_error("missing channel count"))?;
    let bit_depth = capture(report, r"Precision\s*:\s*(\d+)-bit").and_then(|s| s.parse().ok());
    let encoding = capture(report, r"Sample Encoding\s*:\s*(.+)").map(|s| s.trim().to_string());

    let re = Regex::new(r"Duration\s*:\s*(\d+):(\d+):(\d+(?:\.\d+)?)(?:\s*=\s*(\d+)\s*samples)?")
        .map_err(|e| sox_parse_error(&e.to_string()))?;
    let (duration, num_samples) = match re.captures(report) {
        Some(caps) => {
            let hours: f64 = caps[1].parse().unwrap_or(0.0);
            let minutes: f64 = caps[2].parse().unwrap_or(0.0);
            let seconds: f64 = caps[3].parse().unwrap_or(0.0);
            let samples = caps.get(4).and_then(|m| m.as_str().parse().ok());
            (hours * 3600.0 + minutes * 60.0 + seconds, samples)
        }
        None => (0.0, None),
    };

    // The samples count is exact, the hh:mm:ss form is rounded to centiseconds
    let duration = match num_samples {
        Some(n) if sample_rate > 0 => n as f64 / sample_rate as f64,
        _ => duration,
    };

    Ok(AudioInfo {
        sample_rate,
        channels,
        bit_depth,
        duration,
        num_samples,
        encoding,
    })
}

/// Parse the input banner FFmpeg prints to stderr
///
/// ```text
/// Duration: 00:00:01.00, bitrate: 256 kb/s
///   Stream #0:0: Audio: pcm_s16le ([1][0][0][0] / 0x0001), 16000 Hz, mono, s16, 256 kb/s
/// ```
pub(crate) fn parse_ffmpeg_info(stderr: &str) -> Result<AudioInfo, ToolError> {
    let stream = stderr
        .lines()
        .find(|l| l.contains("Audio:"))
        .ok_or_else(|| ffmpeg_parse_error("no audio stream"))?;

    let sample_rate = capture(stream, r"(\d+) Hz")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ffmpeg_parse_error("missing sample rate"))?;
    let channels = parse_ffmpeg_channels(stream);
    let encoding = capture(stream, r"Audio:\s*([A-Za-z0-9_]+)");
    let bit_depth = encoding
        .as_deref()
        .and_then(|codec| capture(codec, r"^pcm_[suf](\d+)"))
        .and_then(|s| s.parse().ok());

    let duration = Regex::new(r"Duration: (\d+):(\d+):(\d+)\.(\d+)")
        .ok()
        .and_then(|re| {
            let caps = re.captures(stderr)?;
            let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
            let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
            let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
            let centiseconds: f64 = caps.get(4)?.as_str().parse().ok()?;
            Some(hours * 3600.0 + minutes * 60.0 + seconds + centiseconds / 100.0)
        })
        .unwrap_or(0.0);

    Ok(AudioInfo {
        sample_rate,
        channels,
        bit_depth,
        duration,
        num_samples: None,
        encoding,
    })
}

fn parse_ffmpeg_channels(stream: &str) -> u16 {
    if stream.contains("mono") {
        1
    } else if stream.contains("stereo") {
        2
    } else if stream.contains("5.1") {
        6
    } else {
        capture(stream, r"(\d+) channels")
            .and_then(|s| s.parse().ok())
            .unwrap_or(2)
    }
}

fn capture(haystack: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(haystack)?;
    Some(caps.get(1)?.as_str().to_string())
}

fn sox_parse_error(detail: &str) -> ToolError {
    ToolError::InfoParse {
        tool: "sox",
        detail: detail.to_string(),
    }
}

fn ffmpeg_parse_error(detail: &str) -> ToolError {
    ToolError::InfoParse {
        tool: "ffmpeg",
        detail: detail.to_string(),
    }
}
