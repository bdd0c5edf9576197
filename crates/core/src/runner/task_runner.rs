use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::error::JobError;
use crate::runner::registry::ProcessRegistry;
use crate::runner::task_logger::TaskLogger;

/// Runs one external process at a time, streaming its merged output
/// into a [`TaskLogger`] and tracking the handle in a shared
/// [`ProcessRegistry`] so a concurrent stop request can terminate it.
pub struct TaskRunner {
    registry: Arc<ProcessRegistry>,
}

impl TaskRunner {
    pub fn new(registry: Arc<ProcessRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    /// Spawn `program` with `args` in `working_dir`, stream its stdout
    /// and stderr line by line into `logger`, wait for exit, and return
    /// whether the exit code indicates success.
    ///
    /// Progress-marker lines (a percentage combined with a throughput
    /// indicator) go through `progress_line` so they replace each other
    /// in the log; everything else is appended permanently. Spawn and
    /// I/O failures are logged and reported as `false`; nothing
    /// propagates past this boundary.
    pub fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
        logger: &mut dyn TaskLogger,
    ) -> bool {
        let mut child = match Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let err = JobError::Spawn {
                    command: program.to_string(),
                    source: e,
                };
                log::error!("{err}");
                logger.line(&err.to_string());
                return false;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Register before consuming any output so a stop request
        // arriving mid-stream can terminate the process.
        let pid = self.registry.register(child);

        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        let mut readers: Vec<JoinHandle<()>> = Vec::new();
        if let Some(out) = stdout {
            readers.push(stream_lines(out, tx.clone()));
        }
        if let Some(err) = stderr {
            readers.push(stream_lines(err, tx.clone()));
        }
        drop(tx);

        for line in rx {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_progress_marker(line) {
                logger.progress_line(line);
            } else {
                logger.line(line);
            }
        }

        for handle in readers {
            let _ = handle.join();
        }

        // stop_all may have claimed the handle while we were reading.
        let Some(mut child) = self.registry.remove(pid) else {
            log::info!("process {pid} was stopped before exit");
            return false;
        };

        match child.wait() {
            Ok(status) => status.success(),
            Err(e) => {
                log::error!("failed to wait on process {pid}: {e}");
                logger.line(&format!("failed to wait on {program}: {e}"));
                false
            }
        }
    }
}

/// A moving progress indicator as printed by common media and ML tools:
/// a percentage bar plus a throughput figure.
fn is_progress_marker(line: &str) -> bool {
    line.contains("%|") && (line.contains("it/s") || line.contains("frames/s"))
}

fn stream_lines<R: Read + Send + 'static>(reader: R, tx: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let buffered = BufReader::new(reader);
        for line in buffered.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("error reading process output: {e}");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingLogger {
        lines: Arc<Mutex<Vec<(bool, String)>>>,
    }

    impl RecordingLogger {
        fn entries(&self) -> Vec<(bool, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl TaskLogger for RecordingLogger {
        fn line(&mut self, message: &str) {
            self.lines.lock().unwrap().push((false, message.to_string()));
        }
        fn progress_line(&mut self, message: &str) {
            self.lines.lock().unwrap().push((true, message.to_string()));
        }
    }

    fn runner() -> TaskRunner {
        TaskRunner::new(Arc::new(ProcessRegistry::new()))
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_run_captures_output_and_succeeds() {
        let mut logger = RecordingLogger::default();
        let ok = runner().run("sh", &sh("echo hello"), Path::new("."), &mut logger);
        assert!(ok);
        assert_eq!(logger.entries(), vec![(false, "hello".to_string())]);
    }

    #[test]
    fn test_run_merges_stderr() {
        let mut logger = RecordingLogger::default();
        let ok = runner().run("sh", &sh("echo oops >&2"), Path::new("."), &mut logger);
        assert!(ok);
        assert_eq!(logger.entries(), vec![(false, "oops".to_string())]);
    }

    #[test]
    fn test_run_nonzero_exit_fails() {
        let mut logger = RecordingLogger::default();
        let ok = runner().run("sh", &sh("exit 3"), Path::new("."), &mut logger);
        assert!(!ok);
    }

    #[test]
    fn test_run_missing_program_fails_without_panicking() {
        let mut logger = RecordingLogger::default();
        let ok = runner().run(
            "definitely-not-a-real-binary",
            &[],
            Path::new("."),
            &mut logger,
        );
        assert!(!ok);
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].1.contains("failed to launch"));
    }

    #[test]
    fn test_progress_marker_lines_are_routed_separately() {
        let mut logger = RecordingLogger::default();
        let script = "echo 'step one'; echo ' 50%|#####     | 2.0it/s'; echo 'step two'";
        let ok = runner().run("sh", &sh(script), Path::new("."), &mut logger);
        assert!(ok);
        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (false, "step one".to_string()));
        assert!(entries[1].0, "progress line not routed: {:?}", entries[1]);
        assert_eq!(entries[2], (false, "step two".to_string()));
    }

    #[test]
    fn test_registry_empty_after_run() {
        let registry = Arc::new(ProcessRegistry::new());
        let runner = TaskRunner::new(registry.clone());
        let mut logger = RecordingLogger::default();
        runner.run("sh", &sh("true"), Path::new("."), &mut logger);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_stop_all_during_run_fails_the_task() {
        let registry = Arc::new(ProcessRegistry::new());
        let runner = Arc::new(TaskRunner::new(registry.clone()));

        let runner_clone = runner.clone();
        let handle = thread::spawn(move || {
            let mut logger = crate::runner::task_logger::NullTaskLogger;
            runner_clone.run(
                "sleep",
                &["30".to_string()],
                Path::new("."),
                &mut logger,
            )
        });

        // Wait until the child is registered, then stop it
        let mut waited = Duration::ZERO;
        while registry.active_count() == 0 && waited < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(20));
            waited += Duration::from_millis(20);
        }
        assert_eq!(registry.active_count(), 1);
        registry.stop_all();

        let ok = handle.join().unwrap();
        assert!(!ok);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_progress_marker_detection() {
        assert!(is_progress_marker("100%|##########| 12.3it/s"));
        assert!(is_progress_marker("40%| 3 frames/s"));
        assert!(!is_progress_marker("100% done"));
        assert!(!is_progress_marker("speed 2.0it/s"));
        assert!(!is_progress_marker("plain output"));
    }
}
