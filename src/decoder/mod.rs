//! Block/file state machine: the consumer end of the cassette decode
//! pipeline, plus [`TapeDecoder`], which wires a [`crate::demod::Demodulator`]
//! and a [`crate::framer::SerialFramer`] in front of it to go straight from
//! PCM samples to sink events.
//!
//! Grounded on `original_source/Tools/TapeReader/decoder.h`/`decoder.cpp`'s
//! `CDecoder` (the `Leader`/`HeaderName`/`HeaderRest`/`Data` states and the
//! leader shift register) and `original_source/Tools/TapeReader/tape_reader.cpp`'s
//! `CDecoderX` (the concrete sink, reworked here as [`sink::NumberedFileSink`]).

pub mod sink;

pub use sink::NumberedFileSink;

use crate::block::{BlockHeader, ErrorBits, HEADER_LENGTH_2, MAX_NAME_LENGTH};
use crate::demod::{Bit as DemodBit, Demodulator};
use crate::framer::{FramerEvent, SerialFramer};
use std::io::{self, Cursor};

/// The 64-bit leader shift register target: a long run of 1s followed by
/// the start/sync-byte/stop framing of `0x2A`.
const LEADER_PATTERN: u64 = 0xFFFF_FFFF_FFFF_FCA9;

/// Receives file-boundary and block events from [`BlockStateMachine`].
///
/// A capability set, not a concrete file-writer: the state machine never
/// touches a filesystem directly.
pub trait Sink {
    /// The first validated block of a new logical file. The sink should
    /// open whatever output it is about to receive blocks for.
    fn on_file(&mut self, header: &BlockHeader) -> io::Result<()>;
    /// A validated data block belonging to the most recently opened file.
    fn on_block(&mut self, header: &BlockHeader, payload: &[u8]) -> io::Result<()>;
    /// The current file has ended, either because its FINAL block was seen
    /// or because decoding detected an implicit truncation.
    fn on_eof(&mut self) -> io::Result<()>;
}

enum State {
    Leader(u64),
    HeaderName(Vec<u8>),
    HeaderRest { raw: Vec<u8> },
    Data { header: BlockHeader, buf: Vec<u8> },
}

/// Consumes framed bytes (by way of raw bits) and drives sink events.
///
/// Owns a private [`SerialFramer`]; callers feed it demodulated bits, never
/// bytes, since the leader state needs to see the raw bit stream directly.
pub struct BlockStateMachine {
    framer: SerialFramer,
    state: State,
    prev: Option<BlockHeader>,
}

impl Default for BlockStateMachine {
    fn default() -> Self {
        BlockStateMachine {
            framer: SerialFramer::new(),
            state: State::Leader(0),
            prev: None,
        }
    }
}

impl BlockStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a file has been opened (`onFile` delivered) but not yet
    /// closed (`onEof` delivered).
    pub fn file_open(&self) -> bool {
        self.prev.is_some()
    }

    /// Feeds one demodulated bit through the state machine.
    pub fn bit(&mut self, bit: bool, sink: &mut dyn Sink) -> io::Result<()> {
        if let State::Leader(shift) = &self.state {
            let mut shift = *shift;
            shift = (shift << 1) | (bit as u64);
            if shift == LEADER_PATTERN {
                self.state = State::HeaderName(Vec::with_capacity(MAX_NAME_LENGTH + 1));
                self.framer = SerialFramer::new();
            } else {
                self.state = State::Leader(shift);
            }
            return Ok(());
        }

        if let FramerEvent::Byte { byte, .. } = self.framer.bit(bit) {
            self.byte(byte, sink)?;
        }
        Ok(())
    }

    fn byte(&mut self, byte: u8, sink: &mut dyn Sink) -> io::Result<()> {
        // Taken by value so the match arms are free to call back into
        // `self` (sink dispatch, `self.prev`) without a live borrow of
        // `self.state` outliving the arm.
        let state = std::mem::replace(&mut self.state, State::Leader(0));

        self.state = match state {
            State::Leader(_) => unreachable!("framer bytes never arrive during Leader"),
            State::HeaderName(mut raw) => {
                raw.push(byte);
                if byte == 0 || raw.len() == MAX_NAME_LENGTH + 1 {
                    State::HeaderRest { raw }
                } else {
                    State::HeaderName(raw)
                }
            }
            State::HeaderRest { mut raw } => {
                raw.push(byte);
                if raw.len() < (MAX_NAME_LENGTH + 1) + HEADER_LENGTH_2 {
                    State::HeaderRest { raw }
                } else {
                    let mut cursor = Cursor::new(raw);
                    let (header, err) = BlockHeader::decode_full(&mut cursor, self.prev.as_ref())?;

                    if err.is_empty() {
                        if header.block_num == 0 {
                            sink.on_file(&header)?;
                        }
                        State::Data { header, buf: Vec::new() }
                    } else if err == ErrorBits::UNEXPECTED_BLOCK && header.block_num == 0 {
                        sink.on_eof()?;
                        sink.on_file(&header)?;
                        State::Data { header, buf: Vec::new() }
                    } else {
                        log::warn!(
                            "discarding block header for `{}` ({:?}), raw bytes {}",
                            header.name,
                            err,
                            hex::encode(cursor.into_inner())
                        );
                        State::Leader(0)
                    }
                }
            }
            State::Data { header, mut buf } => {
                buf.push(byte);
                let wanted = header.block_len as usize + 2;
                if buf.len() < wanted {
                    State::Data { header, buf }
                } else {
                    let payload = &buf[..header.block_len as usize];
                    let crc_on_wire = u16::from_be_bytes([buf[buf.len() - 2], buf[buf.len() - 1]]);
                    let crc_computed = crate::crc::crc16_xmodem(payload, 0);

                    if crc_computed != crc_on_wire {
                        log::warn!("data CRC mismatch for `{}` block {}", header.name, header.block_num);
                        State::Leader(0)
                    } else {
                        sink.on_block(&header, payload)?;
                        let final_block = header.flags.contains(crate::block::BlockFlags::FINAL);
                        if final_block {
                            sink.on_eof()?;
                            self.prev = None;
                        } else {
                            self.prev = Some(header);
                        }
                        State::Leader(0)
                    }
                }
            }
        };
        Ok(())
    }

    /// Called once the input is exhausted; closes any file left open by a
    /// truncated stream (best-effort, per spec: the sink's output is kept,
    /// not deleted).
    pub fn finish(&mut self, sink: &mut dyn Sink) -> io::Result<()> {
        if self.prev.take().is_some() {
            sink.on_eof()?;
        }
        Ok(())
    }
}

/// Combines a [`Demodulator`] and a [`BlockStateMachine`] into a single
/// PCM-sample-in, sink-events-out pipeline.
pub struct TapeDecoder {
    demod: Demodulator,
    sm: BlockStateMachine,
}

impl TapeDecoder {
    pub fn new(sample_rate: f64) -> Self {
        TapeDecoder {
            demod: Demodulator::new(sample_rate),
            sm: BlockStateMachine::new(),
        }
    }

    /// Feeds one PCM sample through demodulation and the state machine.
    pub fn sample(&mut self, value: i32, sink: &mut dyn Sink) -> io::Result<()> {
        match self.demod.sample(value) {
            DemodBit::Zero => self.sm.bit(false, sink),
            DemodBit::One => self.sm.bit(true, sink),
            DemodBit::NoBit => Ok(()),
        }
    }

    /// Signals end of input, flushing any file left open.
    pub fn finish(&mut self, sink: &mut dyn Sink) -> io::Result<()> {
        self.sm.finish(sink)
    }
}
