use std::path::Path;

use crate::error::JobError;

/// Decode any supported audio file to mono f32 samples at
/// `target_sample_rate`, ready to feed into the speech model.
pub fn load_audio(path: &Path, target_sample_rate: u32) -> Result<Vec<f32>, JobError> {
    decode(path, target_sample_rate).map_err(|e| match e {
        DecodeError::NoAudioStream => JobError::NoAudioStream(path.to_path_buf()),
        DecodeError::Ffmpeg(inner) => JobError::AudioDecode {
            path: path.to_path_buf(),
            message: inner.to_string(),
        },
    })
}

enum DecodeError {
    NoAudioStream,
    Ffmpeg(ffmpeg_next::Error),
}

impl From<ffmpeg_next::Error> for DecodeError {
    fn from(e: ffmpeg_next::Error) -> Self {
        DecodeError::Ffmpeg(e)
    }
}

fn decode(path: &Path, target_sample_rate: u32) -> Result<Vec<f32>, DecodeError> {
    ffmpeg_next::init()?;

    let mut input = ffmpeg_next::format::input(path)?;

    let stream = input
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .ok_or(DecodeError::NoAudioStream)?;
    let stream_index = stream.index();

    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
    let mut decoder = codec_ctx.decoder().audio()?;

    let mut resampler = ffmpeg_next::software::resampling::Context::get(
        decoder.format(),
        decoder.channel_layout(),
        decoder.rate(),
        ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
        ffmpeg_next::ChannelLayout::MONO,
        target_sample_rate,
    )?;

    let mut samples: Vec<f32> = Vec::new();
    let mut decoded = ffmpeg_next::util::frame::audio::Audio::empty();
    let mut resampled = ffmpeg_next::util::frame::audio::Audio::empty();

    for (packet_stream, packet) in input.packets() {
        if packet_stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            append_samples(&resampled, &mut samples);
        }
    }

    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded).is_ok() {
        resampler.run(&decoded, &mut resampled)?;
        append_samples(&resampled, &mut samples);
    }

    // The resampler may still hold buffered samples
    if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
        if delay.output > 0 {
            append_samples(&resampled, &mut samples);
        }
    }

    Ok(samples)
}

fn append_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_audio_nonexistent_file() {
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\voice.m4a")
        } else {
            Path::new("/nonexistent/voice.m4a")
        };
        let result = load_audio(path, 16000);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_audio_error_names_the_file() {
        let result = load_audio(Path::new("/nonexistent/voice.m4a"), 16000);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("voice.m4a"), "got: {err}");
    }
}
