//! Binary FSK demodulator.
//!
//! Grounded line-for-line on `original_source/Tools/TapeReader/demod.cpp`
//! (`CDemodulator::Sample`). A noncoherent energy detector over two
//! quadrature reference tones, resynchronized on each 1→0 discriminant
//! transition so that long leader runs (and the sync byte's bit pattern)
//! keep the symbol clock locked despite tape wow/flutter.

use std::f64::consts::PI;

/// Tone frequency used to encode a `0` bit, in Hz.
pub const FREQ0: f64 = 16_000_000.0 / 13_312.0;
/// Tone frequency used to encode a `1` bit, in Hz.
pub const FREQ1: f64 = 2.0 * FREQ0;

/// One demodulated symbol, or the absence of one on a given input sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
    NoBit,
}

/// Continuous-phase FSK demodulator, driven one PCM sample at a time.
pub struct Demodulator {
    fs: f64,
    phase_delta: f64,
    phase: f64,
    prev_y: f64,
    n_samples: u64,
    sym_len: usize,
    sym0_i: Vec<f64>,
    sym0_q: Vec<f64>,
    sym1_i: Vec<f64>,
    sym1_q: Vec<f64>,
    history: Vec<f64>,
}

impl Demodulator {
    pub fn new(sample_rate: f64) -> Self {
        let phase_delta = 2.0 * PI * FREQ1 / sample_rate;
        let sym_len = (sample_rate / FREQ0).ceil() as usize;

        let mut sym0_i = Vec::with_capacity(sym_len);
        let mut sym0_q = Vec::with_capacity(sym_len);
        let mut sym1_i = Vec::with_capacity(sym_len);
        let mut sym1_q = Vec::with_capacity(sym_len);
        for i in 0..sym_len {
            let i = i as f64;
            sym0_i.push((i * phase_delta / 2.0).cos());
            sym0_q.push((i * phase_delta / 2.0).sin());
            sym1_i.push((i * phase_delta).cos());
            sym1_q.push((i * phase_delta).sin());
        }

        Demodulator {
            fs: sample_rate,
            phase_delta,
            phase: -2.0 * PI,
            prev_y: 0.0,
            n_samples: 0,
            sym_len,
            sym0_i,
            sym0_q,
            sym1_i,
            sym1_q,
            history: vec![0.0; sym_len],
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.fs
    }

    /// Number of PCM samples per symbol period (`ceil(Fs/F0)`).
    pub fn symbol_len(&self) -> usize {
        self.sym_len
    }

    /// Feeds one PCM sample through the demodulator, returning a symbol
    /// only at the midpoint of each detected symbol period.
    pub fn sample(&mut self, value: i32) -> Bit {
        self.history.rotate_right(1);
        self.history[0] = value as f64;
        self.n_samples += 1;

        let mut i0 = 0.0;
        let mut q0 = 0.0;
        let mut i1 = 0.0;
        let mut q1 = 0.0;
        for i in 0..self.sym_len {
            i0 += self.history[i] * self.sym0_i[i];
            q0 += self.history[i] * self.sym0_q[i];
            i1 += self.history[i] * self.sym1_i[i];
            q1 += self.history[i] * self.sym1_q[i];
        }
        let y = i1 * i1 + q1 * q1 - i0 * i0 - q0 * q0;

        let mut result = Bit::NoBit;
        if self.n_samples as usize >= self.sym_len {
            if self.prev_y > 0.0 && y < 0.0 {
                self.phase = 0.0;
            }
            self.phase += self.phase_delta;
            if self.phase >= 2.0 * PI {
                self.phase -= 4.0 * PI;
                result = if y >= 0.0 { Bit::One } else { Bit::Zero };
            }
        }
        self.prev_y = y;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthesizes a clean FSK waveform for `bits` at `fs` Hz and feeds it
    /// back through a fresh demodulator, returning the recovered bit stream.
    fn round_trip(fs: f64, bits: &[u8]) -> Vec<Bit> {
        let mut demod = Demodulator::new(fs);
        let sym_len = demod.symbol_len();
        let mut out = Vec::new();
        let mut t = 0.0f64;
        for &bit in bits {
            let freq = if bit == 0 { FREQ0 } else { FREQ1 };
            let cycles_per_symbol = if bit == 0 { 1.0 } else { 2.0 };
            let samples_this_symbol = sym_len;
            let omega = 2.0 * PI * freq / fs;
            for _ in 0..samples_this_symbol {
                let sample = (10000.0 * (omega * t).sin()) as i32;
                out.push(demod.sample(sample));
                t += 1.0;
            }
            let _ = cycles_per_symbol;
        }
        out
    }

    #[test]
    fn recovers_long_one_run_then_a_zero() {
        let bits = [1u8; 40];
        let fs = 44_100.0;
        let out = round_trip(fs, &bits);
        let decided: Vec<_> = out.into_iter().filter(|b| *b != Bit::NoBit).collect();
        assert!(decided.len() >= bits.len() - 2, "expected roughly one decision per symbol, got {}", decided.len());
        assert!(decided.iter().all(|b| *b == Bit::One));
    }

    #[test]
    fn symbol_len_matches_spec_formula() {
        let fs = 44_100.0;
        let demod = Demodulator::new(fs);
        let expected = (fs / FREQ0).ceil() as usize;
        assert_eq!(demod.symbol_len(), expected);
    }
}
