//! Batch-path audio payload handling
//!
//! The file upload endpoint accepts either raw LINEAR16 PCM or a WAV
//! container. WAV payloads are decoded to raw PCM before recognition.

use std::io::Cursor;

use anyhow::{Context, Result};

/// Extract raw 16-bit PCM bytes from an uploaded payload.
pub fn extract_pcm(payload: &[u8]) -> Result<Vec<u8>> {
    if !is_wav(payload) {
        // Raw LINEAR16 passes through untouched
        return Ok(payload.to_vec());
    }

    let mut reader =
        hound::WavReader::new(Cursor::new(payload)).context("Invalid WAV payload")?;
    let spec = reader.spec();

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => {
            let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
            for sample in reader.samples::<i16>() {
                let sample = sample.context("Corrupt WAV sample data")?;
                pcm.extend_from_slice(&sample.to_le_bytes());
            }
            Ok(pcm)
        }
        (format, bits) => anyhow::bail!(
            "Unsupported WAV format ({:?}, {} bits): expected 16-bit integer PCM",
            format,
            bits
        ),
    }
}

/// Check for a RIFF/WAVE container header.
pub fn is_wav(payload: &[u8]) -> bool {
    payload.len() >= 12 && &payload[0..4] == b"RIFF" && &payload[8..12] == b"WAVE"
}
