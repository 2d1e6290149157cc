//! ROM filesystem image writer: packs a title entry and a sequence of host
//! files into the same block-header format the cassette decoder reads.
//!
//! Grounded on `original_source/Tools/ROMFS/build_romfs.cpp`'s `CRomFsFile`.
//! Filename uniqueness there is tracked with a process-global static array
//! (`CRomFsFile::FileNames`); here it is owned by [`RomFsBuilder`] itself so
//! multiple builders (e.g. under test) don't share state.

use crate::block::{BlockFlags, BlockHeader, MAX_BLOCK_LENGTH, MAX_NAME_LENGTH};
use crate::error::{BbcTapeError, Result};
use std::collections::HashSet;
use std::path::Path;

fn header_record_len(name_len: usize) -> usize {
    // sync byte + name + terminator + fixed fields + CRC, i.e. the same
    // layout BlockHeader::encode(true) produces.
    1 + crate::block::HEADER_LENGTH_2 + name_len + 1
}

/// Derives the in-ROM target name and host path from one CLI file
/// argument, which is either `target=host` or a bare `host` path.
fn split_target_and_host(spec: &str) -> Result<(String, String)> {
    let bytes = spec.as_bytes();
    let mut sep = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b' ' {
            break;
        }
        if b == b'=' {
            sep = Some(i);
            break;
        }
    }

    match sep {
        Some(0) | None => {
            // Host name only: derive the target name from its basename.
            let host = spec.to_string();
            let base = Path::new(spec)
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| BbcTapeError::UnderivableTargetName(spec.to_string()))?;
            if base.is_empty() {
                return Err(BbcTapeError::UnderivableTargetName(spec.to_string()));
            }
            let mut target = String::new();
            let mut warn = false;
            for (i, c) in base.chars().enumerate() {
                if i == MAX_NAME_LENGTH {
                    warn = true;
                    break;
                }
                if c as u32 > 0x20 && c as u32 <= 0x7E {
                    target.push(c);
                } else {
                    target.push('_');
                    warn = true;
                }
            }
            if warn {
                log::warn!("target name `{target}` derived from `{spec}`");
            }
            Ok((target, host))
        }
        Some(ep) => {
            let target_raw = &spec[..ep];
            let host = &spec[ep + 1..];
            if host.is_empty() {
                return Err(BbcTapeError::UnderivableTargetName(spec.to_string()));
            }
            let mut target = String::new();
            let mut truncated = false;
            for (i, c) in target_raw.chars().enumerate() {
                if i == MAX_NAME_LENGTH {
                    truncated = true;
                    break;
                }
                if !(0x20..=0x7E).contains(&(c as u32)) {
                    return Err(BbcTapeError::InvalidTargetChar(c as u8));
                }
                target.push(c);
            }
            if truncated {
                log::warn!("target name `{spec}` too long, truncated to {MAX_NAME_LENGTH} characters");
            }
            Ok((target, host.to_string()))
        }
    }
}

/// Builds one `.rom` image in memory: a title entry, any number of file
/// entries, then the ROM-wide terminator byte.
pub struct RomFsBuilder {
    base: u32,
    names: HashSet<String>,
    out: Vec<u8>,
}

impl RomFsBuilder {
    pub fn new(base: u32) -> Self {
        RomFsBuilder { base, names: HashSet::new(), out: Vec::new() }
    }

    fn register_name(&mut self, name: &str) -> Result<()> {
        let key = name.to_ascii_lowercase();
        if !self.names.insert(key) {
            return Err(BbcTapeError::DuplicateTargetName(name.to_string()));
        }
        Ok(())
    }

    /// Appends the ROM's title entry: a zero-length, `FINAL|EMPTY` block
    /// header naming `title`.
    pub fn add_title(&mut self, title: &str) -> Result<()> {
        let mut name = title.to_string();
        if name.chars().count() > MAX_NAME_LENGTH {
            log::warn!("ROM title too long, truncating to {MAX_NAME_LENGTH} characters");
            name = name.chars().take(MAX_NAME_LENGTH).collect();
        }
        for c in name.chars() {
            if !(0x20..=0x7E).contains(&(c as u32)) {
                return Err(BbcTapeError::InvalidTargetChar(c as u8));
            }
        }
        self.register_name(&name)?;

        let entry_len = header_record_len(name.len());
        let next_file = self.base.wrapping_add(entry_len as u32);
        let header = BlockHeader {
            name,
            load_addr: 0,
            exec_addr: 0,
            block_num: 0,
            block_len: 0,
            flags: BlockFlags::FINAL | BlockFlags::EMPTY,
            next_file,
        };
        self.out.extend(header.encode(true));
        self.base = next_file;
        Ok(())
    }

    /// Appends one file entry, read from `host_path` (or `target=host_path`
    /// if `spec` names an explicit target) on disk, with `load_addr`/
    /// `exec_addr` as its tape load/execution addresses.
    pub fn add_file(&mut self, spec: &str, load_addr: u32, exec_addr: u32) -> Result<()> {
        let (name, host_path) = split_target_and_host(spec)?;
        self.register_name(&name)?;

        let data = std::fs::read(&host_path)?;
        if data.is_empty() {
            return Err(BbcTapeError::EmptyHostFile(host_path));
        }

        let n_blocks = data.len().div_ceil(MAX_BLOCK_LENGTH);
        let hdr_len = header_record_len(name.len());
        let entry_len = if n_blocks == 1 {
            data.len() + 2 + hdr_len
        } else {
            data.len() + 2 * n_blocks + 2 * hdr_len + (n_blocks - 2)
        };
        let next_file = self.base.wrapping_add(entry_len as u32);

        let mut remain = &data[..];
        for bn in 0..n_blocks {
            let bl = remain.len().min(MAX_BLOCK_LENGTH);
            let (payload, rest) = remain.split_at(bl);
            remain = rest;
            let full_header = bn == 0 || bn == n_blocks - 1;
            let flags = if bn == n_blocks - 1 { BlockFlags::FINAL } else { BlockFlags::empty() };
            let header = BlockHeader {
                name: name.clone(),
                load_addr,
                exec_addr,
                block_num: bn as u16,
                block_len: bl as u16,
                flags,
                next_file,
            };
            self.out.extend(header.encode(full_header));
            crate::block::write_payload(&mut self.out, payload)?;
        }

        self.base = next_file;
        Ok(())
    }

    /// Appends the ROM-wide terminator and returns the finished image.
    pub fn finish(mut self) -> Vec<u8> {
        self.out.push(crate::block::ROM_TERMINATOR);
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{CONTINUATION_BYTE, SYNC_BYTE};
    use crate::error::BbcTapeError;
    use std::io::Cursor;

    /// Parses one entry (title or file) starting at `image[pos]`, following
    /// `fullHeader`/continuation markers the way a ROM-resident reader
    /// would (by address, not by serial bit framing — ROM images are never
    /// routed through [`crate::framer`]/[`crate::decoder`], which exist
    /// only for the cassette-audio path).
    fn read_entry(image: &[u8], mut pos: usize) -> (String, Vec<u8>, usize) {
        assert_eq!(image[pos], SYNC_BYTE);
        pos += 1;
        let mut cur = Cursor::new(&image[pos..]);
        let mut header = BlockHeader::decode_full(&mut cur, None).unwrap().0;
        pos += cur.position() as usize;

        if header.flags.contains(BlockFlags::EMPTY) && header.block_len == 0 {
            // Title entry: header only, no payload and no data CRC at all.
            return (header.name, Vec::new(), pos);
        }

        let mut data = Vec::new();
        data.extend_from_slice(&image[pos..pos + header.block_len as usize]);
        pos += header.block_len as usize + 2;

        while !header.flags.contains(BlockFlags::FINAL) {
            let marker = image[pos];
            pos += 1;
            if marker == CONTINUATION_BYTE {
                data.extend_from_slice(&image[pos..pos + MAX_BLOCK_LENGTH]);
                pos += MAX_BLOCK_LENGTH + 2;
            } else {
                assert_eq!(marker, SYNC_BYTE);
                let mut cur = Cursor::new(&image[pos..]);
                header = BlockHeader::decode_full(&mut cur, None).unwrap().0;
                pos += cur.position() as usize;
                data.extend_from_slice(&image[pos..pos + header.block_len as usize]);
                pos += header.block_len as usize + 2;
            }
        }
        (header.name, data, pos)
    }

    fn walk_romfs(image: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut pos = 0;
        let mut entries = Vec::new();
        while image[pos] != crate::block::ROM_TERMINATOR {
            let (name, data, next) = read_entry(image, pos);
            entries.push((name, data));
            pos = next;
        }
        entries
    }

    #[test]
    fn minimal_image_is_just_title_and_terminator() {
        let mut builder = RomFsBuilder::new(0x8000);
        builder.add_title("DEMO ROM").unwrap();
        let image = builder.finish();
        assert_eq!(*image.last().unwrap(), crate::block::ROM_TERMINATOR);
        assert_eq!(walk_romfs(&image), vec![("DEMO ROM".to_string(), Vec::new())]);
    }

    #[test]
    fn a_single_block_file_round_trips_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.bas");
        std::fs::write(&path, b"hello world").unwrap();

        let mut builder = RomFsBuilder::new(0x8000);
        builder.add_title("TITLE").unwrap();
        builder.add_file(&format!("PROG={}", path.display()), 0x1900, 0x1900).unwrap();
        let image = builder.finish();

        assert_eq!(
            walk_romfs(&image),
            vec![
                ("TITLE".to_string(), Vec::new()),
                ("PROG".to_string(), b"hello world".to_vec()),
            ]
        );
    }

    #[test]
    fn a_multi_block_file_emits_a_continuation_header_per_interior_block() {
        let dir = tempfile::tempdir().unwrap();
        let contents: Vec<u8> = (0..(MAX_BLOCK_LENGTH * 2 + 10)).map(|i| i as u8).collect();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, &contents).unwrap();

        let mut builder = RomFsBuilder::new(0x8000);
        builder.add_file(&format!("BIG={}", path.display()), 0, 0).unwrap();
        let image = builder.finish();

        assert_eq!(walk_romfs(&image), vec![("BIG".to_string(), contents)]);
    }

    #[test]
    fn duplicate_target_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"x").unwrap();

        let mut builder = RomFsBuilder::new(0x8000);
        builder.add_file(&format!("SAME={}", path.display()), 0, 0).unwrap();
        let err = builder.add_file(&format!("same={}", path.display()), 0, 0).unwrap_err();
        assert!(matches!(err, BbcTapeError::DuplicateTargetName(_)));
    }

    #[test]
    fn empty_host_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let mut builder = RomFsBuilder::new(0x8000);
        let err = builder.add_file(&format!("E={}", path.display()), 0, 0).unwrap_err();
        assert!(matches!(err, BbcTapeError::EmptyHostFile(_)));
    }

    #[test]
    fn target_name_derived_from_host_basename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my prog.txt");
        std::fs::write(&path, b"x").unwrap();

        let (name, host) = split_target_and_host(path.to_str().unwrap()).unwrap();
        assert_eq!(name, "my_prog.tx");
        assert_eq!(host, path.to_str().unwrap());
    }
}
