use std::path::Path;

use crate::cancel::CancelToken;
use crate::error::JobError;
use crate::progress::ProgressSink;

/// Speech-to-text over an audio file on disk.
///
/// Implementations check the token at every internal progress
/// increment and return [`JobError::Cancelled`] when it is set, without
/// producing a partial result. They only ever read the token, never
/// mutate it. On success the plain transcript text is returned; the
/// caller is responsible for persisting it.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        audio_path: &Path,
        sink: &mut dyn ProgressSink,
        token: &CancelToken,
    ) -> Result<String, JobError>;
}
