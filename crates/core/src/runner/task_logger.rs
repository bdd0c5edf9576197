/// Cross-cutting log surface for job output.
///
/// Decouples the runner and orchestrator from specific output mechanisms
/// (stderr, GUI log view) so each caller can observe job output without
/// changing the orchestration code.
///
/// `progress_line` carries a moving progress indicator: each call
/// replaces the previously emitted progress line instead of appending,
/// so a long-running external tool doesn't flood the log. A plain
/// `line` in between ends the replacement run; the next `progress_line`
/// starts a new one.
pub trait TaskLogger: Send {
    /// Append a permanent log entry.
    fn line(&mut self, message: &str);

    /// Emit or replace the current progress line.
    fn progress_line(&mut self, message: &str);
}

/// Silent logger that discards all output.
///
/// Used by tests where log output is irrelevant.
pub struct NullTaskLogger;

impl TaskLogger for NullTaskLogger {
    fn line(&mut self, _message: &str) {}
    fn progress_line(&mut self, _message: &str) {}
}

/// CLI-oriented logger: permanent lines go through the `log` crate,
/// progress lines are redrawn in place on stderr with a carriage return.
#[derive(Default)]
pub struct StderrTaskLogger {
    progress_open: bool,
}

impl StderrTaskLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskLogger for StderrTaskLogger {
    fn line(&mut self, message: &str) {
        if self.progress_open {
            eprintln!();
            self.progress_open = false;
        }
        log::info!("{message}");
    }

    fn progress_line(&mut self, message: &str) {
        eprint!("\r{message}");
        self.progress_open = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_is_noop() {
        let mut logger = NullTaskLogger;
        logger.line("hello");
        logger.progress_line("50%| 2.0it/s");
        // No panics = success
    }

    #[test]
    fn test_stderr_logger_tracks_open_progress_line() {
        let mut logger = StderrTaskLogger::new();
        assert!(!logger.progress_open);
        logger.progress_line("10%");
        assert!(logger.progress_open);
        logger.line("done");
        assert!(!logger.progress_open);
    }
}
