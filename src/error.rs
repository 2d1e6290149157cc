//! Crate-wide fatal error type.
//!
//! Decode-recoverable conditions (bad CRC, framing violations, out-of-order
//! blocks) are *not* represented here — per the block codec's contract they
//! are returned as an [`crate::block::ErrorBits`] bitmask alongside a parsed
//! header, and are consumed locally by the block state machine. This enum
//! covers only the fatal/format-invalid conditions that CLIs translate into
//! an exit code.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BbcTapeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("not a valid RIFF/WAVE file")]
    InvalidWavHeader,

    #[error("WAV `fmt ` chunk is not 16 bytes or is not uncompressed PCM")]
    UnsupportedWavFormat,

    #[error("WAV declared size is inconsistent with its `fmt `/`data` chunk sizes")]
    InconsistentWavSize,

    #[error("{0} bytes per sample is not supported")]
    UnsupportedSampleWidth(u16),

    #[error("tokenized stream is missing the initial 0x0D preamble")]
    MissingPreamble,

    #[error("tokenized stream line record truncated at offset {0:#06x}")]
    TruncatedLine(usize),

    #[error("unexpected end-of-stream marker at offset {0:#06x}")]
    UnexpectedEofMarker(usize),

    #[error("duplicate target filename `{0}` (case-insensitive)")]
    DuplicateTargetName(String),

    #[error("target filename contains a non-printable character 0x{0:02x}")]
    InvalidTargetChar(u8),

    #[error("host path `{0}` does not name a file (ends in a path separator)")]
    UnderivableTargetName(String),

    #[error("host file `{0}` is empty")]
    EmptyHostFile(String),

    #[error("refusing to overwrite existing output file `{0}`")]
    RefusedOverwrite(String),
}

pub type Result<T> = std::result::Result<T, BbcTapeError>;
