//! Audio formats and clip concatenation.

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PodcastError;

/// Container format of synthesized audio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }

    /// Guess the format from a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

/// Join clips into one stream, strictly in the given order.
///
/// No silence or cross-fade is inserted between clips.
pub fn concatenate(format: AudioFormat, clips: &[Vec<u8>]) -> Result<Vec<u8>, PodcastError> {
    if clips.is_empty() {
        return Err(PodcastError::Validation(
            "no audio clips to concatenate".to_string(),
        ));
    }

    match format {
        AudioFormat::Mp3 => Ok(concatenate_mp3(clips)),
        AudioFormat::Wav => concatenate_wav(clips),
    }
}

fn concatenate_mp3(clips: &[Vec<u8>]) -> Vec<u8> {
    let last = clips.len() - 1;
    let mut combined = Vec::with_capacity(clips.iter().map(Vec::len).sum());

    for (i, clip) in clips.iter().enumerate() {
        let mut frames: &[u8] = clip;
        if i > 0 {
            frames = strip_id3v2(frames);
        }
        if i < last {
            frames = strip_id3v1(frames);
        }
        combined.extend_from_slice(frames);
    }

    combined
}

/// Skip a leading ID3v2 tag (10-byte header, syncsafe size, optional footer).
fn strip_id3v2(data: &[u8]) -> &[u8] {
    if data.len() < 10 || &data[..3] != b"ID3" {
        return data;
    }

    let size = data[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b & 0x7f) as usize);
    let footer = if data[5] & 0x10 != 0 { 10 } else { 0 };
    let end = 10 + size + footer;

    data.get(end..).unwrap_or(&[])
}

/// Drop a trailing 128-byte ID3v1 tag.
fn strip_id3v1(data: &[u8]) -> &[u8] {
    if data.len() >= 128 && &data[data.len() - 128..data.len() - 125] == b"TAG" {
        &data[..data.len() - 128]
    } else {
        data
    }
}

fn concatenate_wav(clips: &[Vec<u8>]) -> Result<Vec<u8>, PodcastError> {
    let wav_err =
        |e: hound::Error| PodcastError::upstream("audio", format!("invalid WAV clip: {}", e));

    let spec = hound::WavReader::new(Cursor::new(clips[0].as_slice()))
        .map_err(wav_err)?
        .spec();

    let mut buffer = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).map_err(wav_err)?;

    for (i, clip) in clips.iter().enumerate() {
        let mut reader = hound::WavReader::new(Cursor::new(clip.as_slice())).map_err(wav_err)?;
        let clip_spec = reader.spec();
        if clip_spec != spec {
            return Err(PodcastError::upstream(
                "audio",
                format!("clip {} has format {:?}, expected {:?}", i, clip_spec, spec),
            ));
        }

        match spec.sample_format {
            hound::SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample.map_err(wav_err)?).map_err(wav_err)?;
                }
            }
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample.map_err(wav_err)?).map_err(wav_err)?;
                }
            }
        }
    }

    writer.finalize().map_err(wav_err)?;
    Ok(buffer)
}
