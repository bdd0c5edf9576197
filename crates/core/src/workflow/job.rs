use std::fmt;
use std::path::{Path, PathBuf};

/// The three user-facing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    ExtractAudio,
    Transcribe,
    FullCycle,
}

impl JobKind {
    pub fn label(self) -> &'static str {
        match self {
            JobKind::ExtractAudio => "Audio extraction",
            JobKind::Transcribe => "Transcription",
            JobKind::FullCycle => "Full cycle",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of a job: `Pending -> Running -> {Succeeded, Failed,
/// Cancelled}`, the last three terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            JobState::Pending => "Pending",
            JobState::Running => "Running",
            JobState::Succeeded => "Succeeded",
            JobState::Failed => "Failed",
            JobState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One user-requested unit of work and its outcome.
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: JobKind,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub state: JobState,
}

impl Job {
    pub fn new(kind: JobKind, input: &Path) -> Self {
        Self {
            kind,
            input: input.to_path_buf(),
            output: None,
            state: JobState::Pending,
        }
    }
}
