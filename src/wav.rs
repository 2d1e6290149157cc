//! Streaming RIFF/WAVE PCM reader.
//!
//! Grounded on `original_source/Tools/TapeReader/wav.h`/`wav.cpp`'s
//! `CWavFile`. Per spec.md this component is "specified only at the
//! interface" — it is a standard little-endian RIFF chunk parser, not part
//! of the system's hard engineering core, but it still needs a real
//! implementation to drive the decoder pipeline end to end.

use crate::error::{BbcTapeError, Result};
use byteorder::{ReadBytesExt, LE};
use std::io::Read;

/// A `fmt ` chunk of exactly 16 bytes, format tag 1 (integer PCM).
#[derive(Debug, Clone, Copy)]
pub struct WavFormat {
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bytes_per_frame: u16,
    pub bits_per_sample: u16,
}

/// A streaming PCM frame source over an already-open `Read`.
///
/// Holds no buffering beyond the caller-supplied frame buffer; the entire
/// `data` chunk is consumed one `read_frames` call at a time.
pub struct WavReader<R> {
    inner: R,
    format: WavFormat,
    bytes_per_sample: u16,
    frame_count: u32,
    frames_read: u32,
}

impl<R: Read> WavReader<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let mut riff_tag = [0u8; 4];
        inner.read_exact(&mut riff_tag)?;
        if &riff_tag != b"RIFF" {
            return Err(BbcTapeError::InvalidWavHeader);
        }
        let total_size = inner.read_u32::<LE>()?;

        let mut wave_tag = [0u8; 4];
        inner.read_exact(&mut wave_tag)?;
        if &wave_tag != b"WAVE" {
            return Err(BbcTapeError::InvalidWavHeader);
        }

        let mut fmt_tag = [0u8; 4];
        inner.read_exact(&mut fmt_tag)?;
        if &fmt_tag != b"fmt " {
            return Err(BbcTapeError::InvalidWavHeader);
        }
        let fmt_len = inner.read_u32::<LE>()?;
        if fmt_len != 16 {
            return Err(BbcTapeError::UnsupportedWavFormat);
        }

        let format_tag = inner.read_u16::<LE>()?;
        if format_tag != 1 {
            return Err(BbcTapeError::UnsupportedWavFormat);
        }
        let num_channels = inner.read_u16::<LE>()?;
        let sample_rate = inner.read_u32::<LE>()?;
        let _bytes_per_sec = inner.read_u32::<LE>()?;
        let bytes_per_frame = inner.read_u16::<LE>()?;
        let bits_per_sample_declared = inner.read_u16::<LE>()?;
        let bytes_per_sample = (bits_per_sample_declared + 7) >> 3;
        let bits_per_sample = bytes_per_sample << 3;
        if bytes_per_frame != bytes_per_sample * num_channels {
            return Err(BbcTapeError::UnsupportedWavFormat);
        }

        let mut data_tag = [0u8; 4];
        inner.read_exact(&mut data_tag)?;
        if &data_tag != b"data" {
            return Err(BbcTapeError::InvalidWavHeader);
        }
        let data_size = inner.read_u32::<LE>()?;
        if data_size + fmt_len + 20 != total_size {
            return Err(BbcTapeError::InconsistentWavSize);
        }

        let frame_count = data_size / bytes_per_frame as u32;

        Ok(WavReader {
            inner,
            format: WavFormat { num_channels, sample_rate, bytes_per_frame, bits_per_sample },
            bytes_per_sample,
            frame_count,
            frames_read: 0,
        })
    }

    pub fn format(&self) -> WavFormat {
        self.format
    }

    pub fn frames_remaining(&self) -> u32 {
        self.frame_count - self.frames_read
    }

    /// Reads one frame (all channels) into `buf`, which must be at least
    /// `format().bytes_per_frame` bytes long.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> Result<()> {
        let len = self.format.bytes_per_frame as usize;
        self.inner.read_exact(&mut buf[..len])?;
        self.frames_read += 1;
        Ok(())
    }

    /// Extracts a single signed sample for `channel` from a frame buffer
    /// previously filled by [`read_frame`](Self::read_frame).
    pub fn sample(&self, frame: &[u8], channel: u16) -> Result<i32> {
        let offset = channel as usize * self.bytes_per_sample as usize;
        let bytes = &frame[offset..];
        Ok(match self.bytes_per_sample {
            1 => bytes[0] as i8 as i32,
            2 => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
            3 => {
                let u = (bytes[0] as i32) | ((bytes[1] as i32) << 8) | ((bytes[2] as i32) << 16);
                (u << 8) >> 8
            }
            n => return Err(BbcTapeError::UnsupportedSampleWidth(n)),
        })
    }
}
