//! Concrete [`super::Sink`] that writes each recovered file to
//! `<name>.NNN`, the lowest non-colliding three-digit suffix.
//!
//! Grounded on `original_source/Tools/TapeReader/tape_reader.cpp`'s
//! `CDecoderX`/`create_numbered_file`. The original probes with a
//! `fopen(path, "r")`-then-reopen-`"wb"` pattern, which races a concurrent
//! creator between the probe and the write-open; this version probes with
//! [`std::path::Path::exists`] but performs the real open with
//! [`std::fs::OpenOptions::create_new`], so a collision is still caught
//! atomically at open time instead of silently overwriting.

use super::Sink;
use crate::block::BlockHeader;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes recovered files to disk as `<name>.NNN` (NNN 000..999), printing
/// the same progress diagnostics as the original CLI sink.
pub struct NumberedFileSink {
    dir: PathBuf,
    current: Option<File>,
}

impl NumberedFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        NumberedFileSink { dir: dir.into(), current: None }
    }

    fn numbered_path(&self, name: &str) -> io::Result<PathBuf> {
        for n in 0..1000u32 {
            let path = self.dir.join(format!("{name}.{n:03}"));
            if !path.exists() {
                return Ok(path);
            }
        }
        Err(io::Error::new(io::ErrorKind::AlreadyExists, format!("no free `{name}.NNN` slot left")))
    }
}

impl Sink for NumberedFileSink {
    fn on_file(&mut self, header: &BlockHeader) -> io::Result<()> {
        let path = self.numbered_path(&header.name)?;
        println!(
            "File {} LA {:#010x} XA {:#010x} -> {}",
            header.name,
            header.load_addr,
            header.exec_addr,
            path.display()
        );
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        self.current = Some(file);
        Ok(())
    }

    fn on_block(&mut self, header: &BlockHeader, payload: &[u8]) -> io::Result<()> {
        println!("  block {} ({} bytes)", header.block_num, payload.len());
        match &mut self.current {
            Some(file) => file.write_all(payload),
            None => Err(io::Error::new(io::ErrorKind::Other, "block received with no file open")),
        }
    }

    fn on_eof(&mut self) -> io::Result<()> {
        println!("End of file");
        if let Some(file) = self.current.take() {
            file.sync_all().ok();
        }
        Ok(())
    }
}
