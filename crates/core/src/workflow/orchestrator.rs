use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::JobError;
use crate::progress::ProgressSink;
use crate::runner::registry::ProcessRegistry;
use crate::runner::task_logger::TaskLogger;
use crate::shared::workspace::WorkspaceLayout;
use crate::transcription::transcriber::Transcriber;
use crate::workflow::extractor::AudioExtractor;
use crate::workflow::job::{Job, JobKind, JobState};

/// The state shared between the UI thread and the single background
/// worker: the stop flag and the active-process registry. Everything
/// else stays owned by whichever thread is using it.
#[derive(Clone, Default)]
pub struct WorkerContext {
    registry: Arc<ProcessRegistry>,
    token: CancelToken,
}

impl WorkerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

/// Drives the three operations over one workspace, one job at a time.
///
/// Each job runs to a terminal state on the calling thread; callers
/// that need a responsive foreground run it on a worker thread. A
/// submission while another job is running is rejected as `Failed`
/// without touching the running job's token.
pub struct WorkflowOrchestrator {
    layout: WorkspaceLayout,
    context: WorkerContext,
    extractor: Box<dyn AudioExtractor>,
    transcriber: Box<dyn Transcriber>,
    running: AtomicBool,
}

impl WorkflowOrchestrator {
    pub fn new(
        layout: WorkspaceLayout,
        context: WorkerContext,
        extractor: Box<dyn AudioExtractor>,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            layout,
            context,
            extractor,
            transcriber,
            running: AtomicBool::new(false),
        }
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn context(&self) -> &WorkerContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the running job to stop: set the token so the next
    /// checkpoint observes it, and terminate any external process so
    /// the worker is not stuck waiting on its output.
    pub fn request_stop(&self) {
        self.context.token.set();
        self.context.registry.stop_all();
    }

    /// Run one job to completion and return it in a terminal state.
    pub fn run(
        &self,
        kind: JobKind,
        input: &Path,
        logger: &mut dyn TaskLogger,
        sink: &mut dyn ProgressSink,
    ) -> Job {
        let mut job = Job::new(kind, input);

        if self.running.swap(true, Ordering::SeqCst) {
            logger.line("Another job is already running");
            job.state = JobState::Failed;
            return job;
        }

        self.context.token.clear();
        job.state = JobState::Running;
        logger.line(&format!("{kind} started: {}", input.display()));

        let outcome = match kind {
            JobKind::ExtractAudio => self.extract(input, logger),
            JobKind::Transcribe => self.transcribe(input, logger, sink),
            JobKind::FullCycle => self.full_cycle(input, logger, sink),
        };

        job.state = match outcome {
            Ok(output) => {
                logger.line(&format!("{kind} finished: {}", output.display()));
                job.output = Some(output);
                JobState::Succeeded
            }
            Err(e) if e.is_cancelled() => {
                logger.line(&format!("{kind} stopped"));
                JobState::Cancelled
            }
            Err(e) => {
                log::error!("{kind} failed: {e}");
                logger.line(&format!("{kind} failed: {e}"));
                JobState::Failed
            }
        };

        self.running.store(false, Ordering::SeqCst);
        job
    }

    fn extract(&self, input: &Path, logger: &mut dyn TaskLogger) -> Result<PathBuf, JobError> {
        let output = self.layout.extracted_audio_path(input);
        fs::create_dir_all(self.layout.audio_dir())?;

        let ok = self.extractor.extract(input, &output, logger);
        if self.context.token.is_set() {
            return Err(JobError::Cancelled);
        }
        if !ok {
            return Err(JobError::ExtractionFailed(input.to_path_buf()));
        }
        // A zero exit code with no file on disk is still a failure
        if !output.exists() {
            return Err(JobError::MissingOutput(output));
        }
        Ok(output)
    }

    fn transcribe(
        &self,
        audio: &Path,
        logger: &mut dyn TaskLogger,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, JobError> {
        let text = self.transcriber.transcribe(audio, sink, &self.context.token)?;
        if self.context.token.is_set() {
            return Err(JobError::Cancelled);
        }

        // Write beside the audio file first, then move into place, so
        // the transcripts folder only ever holds finished files.
        let staged = audio.with_extension("txt");
        fs::write(&staged, &text)?;

        let target = self.layout.transcript_target(audio);
        fs::create_dir_all(self.layout.transcripts_dir())?;
        move_file(&staged, &target)?;
        logger.line(&format!("Transcript saved: {}", target.display()));
        Ok(target)
    }

    fn full_cycle(
        &self,
        input: &Path,
        logger: &mut dyn TaskLogger,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, JobError> {
        let audio = self.extract(input, logger)?;
        if self.context.token.is_set() {
            return Err(JobError::Cancelled);
        }
        self.transcribe(&audio, logger, sink)
    }
}

/// Rename, falling back to copy-and-remove when the staged file and
/// target sit on different filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
