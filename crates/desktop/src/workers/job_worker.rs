use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use voicedesk_core::{
    Job, JobKind, ProgressSink, ProgressUpdate, TaskLogger, WorkflowOrchestrator,
};

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Line(String),
    ProgressLine(String),
    Progress(ProgressUpdate),
    Finished(Job),
}

/// Run one job on a fresh background thread. The UI polls the returned
/// receiver; the channel closes after `Finished` is delivered. A stop
/// request goes through the orchestrator, not through this channel.
pub fn spawn(
    orchestrator: Arc<WorkflowOrchestrator>,
    kind: JobKind,
    input: PathBuf,
) -> Receiver<WorkerMessage> {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();

    thread::spawn(move || {
        let mut logger = ChannelTaskLogger { tx: tx.clone() };
        let mut sink = ChannelProgressSink { tx: tx.clone() };
        let job = orchestrator.run(kind, &input, &mut logger, &mut sink);
        let _ = tx.send(WorkerMessage::Finished(job));
    });

    rx
}

struct ChannelTaskLogger {
    tx: Sender<WorkerMessage>,
}

impl TaskLogger for ChannelTaskLogger {
    fn line(&mut self, message: &str) {
        let _ = self.tx.send(WorkerMessage::Line(message.to_string()));
    }

    fn progress_line(&mut self, message: &str) {
        let _ = self
            .tx
            .send(WorkerMessage::ProgressLine(message.to_string()));
    }
}

struct ChannelProgressSink {
    tx: Sender<WorkerMessage>,
}

impl ProgressSink for ChannelProgressSink {
    fn tick(&mut self, update: &ProgressUpdate) -> bool {
        let _ = self.tx.send(WorkerMessage::Progress(update.clone()));
        // Stops are requested through the shared token, not the sink
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use voicedesk_core::{
        AudioExtractor, CancelToken, JobError, JobState, Transcriber, WorkerContext,
        WorkspaceLayout,
    };

    struct StubExtractor;

    impl AudioExtractor for StubExtractor {
        fn extract(&self, _input: &Path, output: &Path, logger: &mut dyn TaskLogger) -> bool {
            logger.line("converting");
            fs::write(output, b"audio").unwrap();
            true
        }
    }

    struct StubTranscriber;

    impl Transcriber for StubTranscriber {
        fn transcribe(
            &self,
            _audio_path: &Path,
            sink: &mut dyn ProgressSink,
            _token: &CancelToken,
        ) -> Result<String, JobError> {
            sink.tick(&ProgressUpdate {
                processed: 100,
                total: Some(100),
                elapsed: Duration::from_secs(1),
                remaining: Some(Duration::ZERO),
            });
            Ok("hello world".to_string())
        }
    }

    #[test]
    fn test_worker_delivers_messages_then_finished() {
        let tmp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        let input = layout.input_dir().join("sample.mp4");
        fs::write(&input, b"video").unwrap();

        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            layout,
            WorkerContext::new(),
            Box::new(StubExtractor),
            Box::new(StubTranscriber),
        ));

        let rx = spawn(orchestrator, JobKind::FullCycle, input);
        let messages: Vec<WorkerMessage> = rx.iter().collect();

        let finished = messages.last().expect("no messages received");
        match finished {
            WorkerMessage::Finished(job) => assert_eq!(job.state, JobState::Succeeded),
            other => panic!("expected Finished last, got {other:?}"),
        }
        assert!(messages
            .iter()
            .any(|m| matches!(m, WorkerMessage::Line(l) if l == "converting")));
        assert!(messages
            .iter()
            .any(|m| matches!(m, WorkerMessage::Progress(u) if u.processed == 100)));
    }
}
