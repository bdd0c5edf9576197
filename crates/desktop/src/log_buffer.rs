/// The job log shown in the GUI.
///
/// Progress-marker lines replace the most recent log entry instead of
/// appending, so a moving percentage indicator occupies a single line.
/// A plain line ends the replacement run; the next progress line starts
/// a new one.
#[derive(Default)]
pub struct LogBuffer {
    lines: Vec<String>,
    progress_open: bool,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
        self.progress_open = false;
    }

    pub fn progress_line(&mut self, message: &str) {
        if self.progress_open {
            if let Some(last) = self.lines.last_mut() {
                *last = message.to_string();
                return;
            }
        }
        self.lines.push(message.to_string());
        self.progress_open = true;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.progress_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines_replace_each_other() {
        let mut log = LogBuffer::new();
        log.line("Converting");
        log.progress_line("10%| 2.0it/s");
        log.progress_line("50%| 2.1it/s");
        assert_eq!(log.lines(), ["Converting", "50%| 2.1it/s"]);
    }

    #[test]
    fn test_plain_line_ends_replacement_run() {
        let mut log = LogBuffer::new();
        log.progress_line("10%");
        log.line("phase done");
        log.progress_line("20%");
        log.progress_line("30%");
        assert_eq!(log.lines(), ["10%", "phase done", "30%"]);
    }

    #[test]
    fn test_only_most_recent_progress_line_is_replaced() {
        let mut log = LogBuffer::new();
        log.progress_line("10%");
        log.line("a");
        log.line("b");
        log.progress_line("90%");
        assert_eq!(log.lines(), ["10%", "a", "b", "90%"]);
    }

    #[test]
    fn test_clear() {
        let mut log = LogBuffer::new();
        log.line("x");
        log.progress_line("10%");
        log.clear();
        assert!(log.lines().is_empty());
        log.progress_line("20%");
        assert_eq!(log.lines(), ["20%"]);
    }
}
