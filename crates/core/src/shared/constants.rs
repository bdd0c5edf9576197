use std::time::Duration;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov"];
pub const AUDIO_EXTENSIONS: &[&str] = &["m4a", "wav", "mp3", "ogg"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Suffix appended to the video stem for the extracted audio file.
pub const EXTRACTED_AUDIO_SUFFIX: &str = "_audio";
pub const EXTRACTED_AUDIO_EXTENSION: &str = "m4a";

pub const DEFAULT_MODEL_NAME: &str = "ggml-large-v3.bin";
pub const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// How long `stop_all` waits for a child to exit after requesting
/// termination before giving up on it.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(2500);
