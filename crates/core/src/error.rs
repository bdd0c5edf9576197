use std::path::PathBuf;

use thiserror::Error;

/// Everything that can end a job early.
///
/// `Cancelled` is not a failure: the orchestrator maps it to the
/// `Cancelled` terminal state instead of `Failed`. All other variants
/// are converted to a terminal state plus a log message at the job
/// boundary; none of them escape to terminate the process.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load speech model: {0}")]
    ModelLoad(String),
    #[error("failed to decode audio from {path}: {message}")]
    AudioDecode { path: PathBuf, message: String },
    #[error("no audio stream in {0}")]
    NoAudioStream(PathBuf),
    #[error("transcription failed: {0}")]
    Inference(String),
    #[error("audio extraction failed for {0}")]
    ExtractionFailed(PathBuf),
    #[error("cancelled")]
    Cancelled,
    #[error("expected output file missing: {0}")]
    MissingOutput(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JobError {
    /// True when the job ended because a stop was requested, not
    /// because something went wrong.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_not_a_failure() {
        assert!(JobError::Cancelled.is_cancelled());
        assert!(!JobError::ModelLoad("gone".into()).is_cancelled());
    }

    #[test]
    fn test_spawn_error_names_command() {
        let err = JobError::Spawn {
            command: "ffmpeg".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("ffmpeg"), "got: {text}");
    }
}
