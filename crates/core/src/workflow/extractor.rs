use std::path::Path;

use crate::runner::task_logger::TaskLogger;
use crate::runner::task_runner::TaskRunner;

/// Pulls the audio track out of a video file.
///
/// Success means the command exited cleanly; the orchestrator verifies
/// separately that the output file actually exists.
pub trait AudioExtractor: Send + Sync {
    fn extract(&self, input: &Path, output: &Path, logger: &mut dyn TaskLogger) -> bool;
}

/// Extraction via the system ffmpeg binary, copying the audio stream
/// without re-encoding.
pub struct FfmpegExtractor {
    runner: TaskRunner,
}

impl FfmpegExtractor {
    pub fn new(runner: TaskRunner) -> Self {
        Self { runner }
    }
}

impl AudioExtractor for FfmpegExtractor {
    fn extract(&self, input: &Path, output: &Path, logger: &mut dyn TaskLogger) -> bool {
        let working_dir = output.parent().unwrap_or_else(|| Path::new("."));
        self.runner
            .run("ffmpeg", &extract_args(input, output), working_dir, logger)
    }
}

fn extract_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vn".to_string(),
        "-acodec".to_string(),
        "copy".to_string(),
        output.to_string_lossy().into_owned(),
        "-hide_banner".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_args_copy_without_reencoding() {
        let args = extract_args(
            Path::new("/base/input/sample.mp4"),
            Path::new("/base/audio/sample_audio.m4a"),
        );
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/base/input/sample.mp4",
                "-vn",
                "-acodec",
                "copy",
                "/base/audio/sample_audio.m4a",
                "-hide_banner",
            ]
        );
    }
}
