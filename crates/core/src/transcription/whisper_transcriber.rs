use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::cancel::CancelToken;
use crate::error::JobError;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::shared::model_resolver;
use crate::transcription::audio_loader;
use crate::transcription::transcriber::Transcriber;

const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model file is resolved lazily on first use (cache, then
/// download) and the resolved path is kept for the rest of the process.
/// The model reports progress through its callback into an atomic
/// percentage that is sampled on a fixed interval, and the abort
/// callback lets a stop request take effect at the next internal
/// increment.
#[derive(Debug)]
pub struct WhisperTranscriber {
    model_name: String,
    model_path: Mutex<Option<PathBuf>>,
}

impl WhisperTranscriber {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_path: Mutex::new(None),
        }
    }

    /// Use an already-resolved model file, skipping cache and download.
    pub fn with_model_path(path: PathBuf) -> Result<Self, JobError> {
        if !path.exists() {
            return Err(JobError::ModelLoad(format!(
                "model not found at {}",
                path.display()
            )));
        }
        let model_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            model_name,
            model_path: Mutex::new(Some(path)),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn ensure_model(&self) -> Result<PathBuf, JobError> {
        let mut cached = self.model_path.lock().unwrap();
        if let Some(path) = cached.as_ref() {
            return Ok(path.clone());
        }
        let url = model_resolver::model_url(&self.model_name);
        let path = model_resolver::resolve(&self.model_name, &url, None, None)
            .map_err(|e| JobError::ModelLoad(e.to_string()))?;
        *cached = Some(path.clone());
        Ok(path)
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &self,
        audio_path: &std::path::Path,
        sink: &mut dyn ProgressSink,
        token: &CancelToken,
    ) -> Result<String, JobError> {
        let model_path = self.ensure_model()?;
        let samples = audio_loader::load_audio(audio_path, WHISPER_SAMPLE_RATE)?;
        if token.is_set() {
            return Err(JobError::Cancelled);
        }

        let model_path_str = model_path
            .to_str()
            .ok_or_else(|| JobError::ModelLoad("model path is not valid UTF-8".into()))?;
        let ctx =
            WhisperContext::new_with_params(model_path_str, WhisperContextParameters::default())
                .map_err(|e| JobError::ModelLoad(e.to_string()))?;
        let mut state = ctx
            .create_state()
            .map_err(|e| JobError::ModelLoad(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some("auto"));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(available_threads());

        let progress_pct = Arc::new(AtomicI32::new(0));
        let callback_pct = progress_pct.clone();
        params.set_progress_callback_safe(move |percent: i32| {
            callback_pct.store(percent, Ordering::Relaxed);
        });

        // A sink can ask for a stop of its own; that stays in a local
        // flag so the shared token is never written from here.
        let sink_stop = Arc::new(AtomicBool::new(false));
        let abort_token = token.clone();
        let abort_sink_stop = sink_stop.clone();
        params.set_abort_callback_safe(move || {
            abort_token.is_set() || abort_sink_stop.load(Ordering::Relaxed)
        });

        let mut tracker = ProgressTracker::new();
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let (full_result, state) = thread::scope(|scope| {
            let inference = scope.spawn(move || {
                let result = state.full(params, &samples);
                let _ = done_tx.send(());
                (result, state)
            });

            // Sample the model-reported percentage on a fixed interval
            // until inference finishes.
            let mut last = -1;
            loop {
                match done_rx.recv_timeout(PROGRESS_POLL_INTERVAL) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
                if token.is_set() {
                    continue; // abort callback is stopping the model
                }
                let percent = progress_pct.load(Ordering::Relaxed);
                if percent > last {
                    last = percent;
                    let update = tracker.update(percent.max(0) as u64, Some(100));
                    if !sink.tick(&update) {
                        sink_stop.store(true, Ordering::Relaxed);
                    }
                }
            }

            inference.join()
        })
        .map_err(|_| JobError::Inference("inference thread panicked".into()))?;

        if token.is_set() || sink_stop.load(Ordering::Relaxed) {
            return Err(JobError::Cancelled);
        }
        full_result.map_err(|e| JobError::Inference(e.to_string()))?;

        let mut text = String::new();
        let num_segments = state.full_n_segments();
        for i in 0..num_segments {
            let Some(segment) = state.get_segment(i) else {
                continue;
            };
            match segment.to_str_lossy() {
                Ok(piece) => text.push_str(&piece),
                Err(e) => log::warn!("skipping unreadable segment {i}: {e}"),
            }
        }
        Ok(text.trim().to_string())
    }
}

fn available_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8) as i32
}
