//! Tokenized-BASIC-program reverser: walks the line-record form of either
//! stored dialect and emits printable text.
//!
//! Grounded verbatim on `original_source/Tools/Acorn2Txt/acorn2txt.cpp`'s
//! `process`/`process_line` and `TokenTable6502`/`TokenTable68k` (the latter
//! in [`tables`]). The control flow below mirrors the original's loop
//! exactly, including its quirk of only updating "last emitted token" for
//! iterations that actually produced one (plain literal characters don't).

mod tables;

use crate::error::{BbcTapeError, Result};

/// Which stored-program dialect a byte stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Acorn6502,
    Acorn68k,
}

/// Cached-branch-target trigger tokens (68k): a `0xFF` only decodes a line
/// number if one of these was the most recently emitted token.
const TARGET_TRIGGER_TOKENS: [u32; 5] = [0x91, 0x94, 0x95, 0xAB, 0xB7];

#[derive(Debug, Clone, Copy, Default)]
pub struct DetokenizeOptions {
    /// Prefix each line with its decimal line number, right-aligned to
    /// width 5 (CLI flag `-n`).
    pub show_line_numbers: bool,
}

/// Detokenizes `data` under `dialect`, returning the recovered text.
pub fn detokenize(dialect: Dialect, data: &[u8], opts: DetokenizeOptions) -> Result<String> {
    match dialect {
        Dialect::Acorn6502 => detokenize_6502(data, opts),
        Dialect::Acorn68k => detokenize_68k(data, opts),
    }
}

fn detokenize_6502(data: &[u8], opts: DetokenizeOptions) -> Result<String> {
    if data.first() != Some(&0x0D) {
        return Err(BbcTapeError::MissingPreamble);
    }
    let mut out = String::new();
    let mut ioff = 1usize;
    while ioff < data.len() {
        let remain = data.len() - ioff;
        if remain == 1 && data[ioff] == 0xFF {
            break;
        }
        if remain < 4 {
            return Err(BbcTapeError::TruncatedLine(ioff));
        }
        let (hi, lo, total_len) = (data[ioff], data[ioff + 1], data[ioff + 2] as usize);
        if hi == 0xFF {
            return Err(BbcTapeError::UnexpectedEofMarker(ioff));
        }
        if total_len < 4 || ioff + total_len > data.len() {
            return Err(BbcTapeError::TruncatedLine(ioff));
        }
        let line_num = ((hi as u32) << 8) | lo as u32;
        process_line(&data[ioff..ioff + total_len], line_num, Dialect::Acorn6502, opts, &mut out)?;
        ioff += total_len;
    }
    Ok(out)
}

fn detokenize_68k(data: &[u8], opts: DetokenizeOptions) -> Result<String> {
    let mut out = String::new();
    let mut ioff = 0usize;
    while ioff < data.len() {
        let remain = data.len() - ioff;
        if remain < 2 {
            return Err(BbcTapeError::TruncatedLine(ioff));
        }
        let total_len = ((data[ioff] as usize) << 8) | data[ioff + 1] as usize;
        if total_len == 0 {
            break;
        }
        if remain < 6 {
            return Err(BbcTapeError::TruncatedLine(ioff));
        }
        if ioff + total_len > data.len() {
            return Err(BbcTapeError::TruncatedLine(ioff));
        }
        let line_num = ((data[ioff + 2] as u32) << 8) | data[ioff + 3] as u32;
        process_line(&data[ioff..ioff + total_len], line_num, Dialect::Acorn68k, opts, &mut out)?;
        ioff += total_len;
    }
    Ok(out)
}

fn process_line(
    line: &[u8],
    line_num: u32,
    dialect: Dialect,
    opts: DetokenizeOptions,
    out: &mut String,
) -> Result<()> {
    use std::fmt::Write as _;

    if opts.show_line_numbers {
        let _ = write!(out, "{line_num:5} ");
    }

    let (mut j, align, max_token, table): (usize, usize, u8, &[Option<&str>; 128]) = match dialect {
        Dialect::Acorn6502 => (3, 1usize, 0xFE, &tables::TOKENS_6502),
        Dialect::Acorn68k => (4, 2usize, 0xFC, &tables::TOKENS_68K),
    };
    let line_len = line.len();
    let mut last_token: u32 = 0;

    while j < line_len {
        let c = line[j];
        let mut token: u32 = 0;

        if (0x20..=0x7E).contains(&c) {
            out.push(c as char);
            j += 1;
            continue;
        }

        let jr = (j + align) & !(align - 1);
        if c == 0x0D && jr == line_len {
            out.push('\n');
            break;
        }

        if c >= 0x80 {
            token = c as u32;
        }

        if dialect == Dialect::Acorn68k && c == 0xFF {
            let newj = (j + 2) & !1;
            let byte = |i: usize| line.get(i).copied().ok_or(BbcTapeError::TruncatedLine(j));
            let lnm = if TARGET_TRIGGER_TOKENS.contains(&last_token) {
                ((byte(newj)? as u32) << 8) | byte(newj + 1)? as u32
            } else {
                0
            };
            if lnm != 0 {
                let _ = write!(out, "{lnm}");
            }
            j = newj + 6;
            if token > 0 {
                last_token = token;
            }
            continue;
        }

        if dialect == Dialect::Acorn6502 && c == 0x8D {
            let byte = |i: usize| line.get(i).copied().ok_or(BbcTapeError::TruncatedLine(j));
            let mut b1 = byte(j + 1)?;
            let b2 = byte(j + 2)?;
            let b3 = byte(j + 3)?;
            b1 ^= 0x54;
            let lnm = (((b1 & 0x30) as u32) << 2)
                | (((b1 & 0x0C) as u32) << 12)
                | ((b2 & 0x3F) as u32)
                | (((b3 & 0x3F) as u32) << 8);
            let _ = write!(out, "{lnm}");
            j += 4;
            if token > 0 {
                last_token = token;
            }
            continue;
        }

        if c > max_token || c == 0x7F || c < 0x20 {
            let _ = write!(out, "`{c:02x}`");
            j += 1;
            if token > 0 {
                last_token = token;
            }
            continue;
        }

        match table[(c - 0x80) as usize] {
            Some(tok) => out.push_str(tok),
            None => {
                let _ = write!(out, "`{c:02x}`");
            }
        }
        j += 1;
        if token > 0 {
            last_token = token;
        }
    }
    Ok(())
}

/// Inverse of the 6502 line-number codec (`0x8D` + 3 bytes). Used only to
/// generate round-trip test vectors: editing tokenized programs is out of
/// scope for the public API.
#[cfg(test)]
pub(crate) fn encode_line_number_6502(line: u16) -> [u8; 3] {
    let line = line as u32;
    let b2 = (line & 0x3F) as u8;
    let b3 = ((line >> 8) & 0x3F) as u8;
    let bit4 = ((line >> 6) & 1) as u8;
    let bit5 = ((line >> 7) & 1) as u8;
    let bit2 = ((line >> 14) & 1) as u8;
    let bit3 = ((line >> 15) & 1) as u8;
    let b1_plain = (bit5 << 5) | (bit4 << 4) | (bit3 << 3) | (bit2 << 2);
    let b1 = b1_plain ^ 0x54;
    [b1, b2, b3]
}
