//! Core library for VoiceDesk: turning video into audio with ffmpeg
//! and audio into text with a local whisper model, with cooperative
//! cancellation and progress reporting shared by the CLI and the
//! desktop app.

pub mod cancel;
pub mod error;
pub mod progress;
pub mod runner;
pub mod shared;
pub mod transcription;
pub mod workflow;

pub use cancel::CancelToken;
pub use error::JobError;
pub use progress::{format_progress, NullProgressSink, ProgressSink, ProgressTracker, ProgressUpdate};
pub use runner::registry::ProcessRegistry;
pub use runner::task_logger::{NullTaskLogger, StderrTaskLogger, TaskLogger};
pub use runner::task_runner::TaskRunner;
pub use shared::workspace::{FileEntry, FileKind, Folder, WorkspaceLayout};
pub use transcription::transcriber::Transcriber;
pub use transcription::whisper_transcriber::WhisperTranscriber;
pub use workflow::extractor::{AudioExtractor, FfmpegExtractor};
pub use workflow::job::{Job, JobKind, JobState};
pub use workflow::orchestrator::{WorkerContext, WorkflowOrchestrator};
