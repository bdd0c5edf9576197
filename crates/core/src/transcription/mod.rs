pub mod audio_loader;
pub mod transcriber;
pub mod whisper_transcriber;
