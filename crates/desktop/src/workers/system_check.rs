use std::process::Command;
use std::thread;

use crossbeam_channel::Receiver;

use voicedesk_core::shared::model_resolver;

/// Startup health report shown in the status line.
#[derive(Debug, Clone)]
pub struct SystemCheck {
    pub ffmpeg_version: Option<String>,
    pub model_cached: bool,
    pub model_name: String,
}

impl SystemCheck {
    pub fn summary(&self) -> String {
        let ffmpeg = match &self.ffmpeg_version {
            Some(version) => format!("ffmpeg: {version}"),
            None => "ffmpeg: not found".to_string(),
        };
        let model = if self.model_cached {
            format!("model: {} (cached)", self.model_name)
        } else {
            format!("model: {} (will download)", self.model_name)
        };
        format!("{ffmpeg} | {model}")
    }
}

/// Probe ffmpeg and the model cache on a background thread so startup
/// stays instant.
pub fn spawn(model_name: String) -> Receiver<SystemCheck> {
    let (tx, rx) = crossbeam_channel::bounded::<SystemCheck>(1);

    thread::spawn(move || {
        let check = SystemCheck {
            ffmpeg_version: ffmpeg_version(),
            model_cached: model_is_cached(&model_name),
            model_name,
        };
        let _ = tx.send(check);
    });

    rx
}

fn ffmpeg_version() -> Option<String> {
    let output = Command::new("ffmpeg").arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next()?;
    // "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"
    first_line
        .strip_prefix("ffmpeg version ")
        .map(|rest| rest.split_whitespace().next().unwrap_or(rest).to_string())
}

fn model_is_cached(model_name: &str) -> bool {
    model_resolver::model_cache_dir()
        .map(|dir| dir.join(model_name).exists())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_check_completes() {
        let rx = spawn("ggml-does-not-exist.bin".to_string());
        let check = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(check.model_name, "ggml-does-not-exist.bin");
        assert!(!check.model_cached);
    }

    #[test]
    fn test_summary_mentions_both_probes() {
        let check = SystemCheck {
            ffmpeg_version: None,
            model_cached: false,
            model_name: "ggml-large-v3.bin".to_string(),
        };
        let summary = check.summary();
        assert!(summary.contains("ffmpeg: not found"));
        assert!(summary.contains("ggml-large-v3.bin"));
    }
}
