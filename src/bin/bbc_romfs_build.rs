//! `bbc-romfs-build` — packs a title entry and a list of host files into a
//! ROM filesystem image.
//!
//! Grounded on `original_source/Tools/ROMFS/build_romfs.cpp`'s `main`:
//! `<baseAddr> <outputPath> <title> [entry]...`, where each `entry` is
//! either `target=host` or a bare `host` path.

use bbctape::romfs::RomFsBuilder;
use bbctape::util::parse_int_c_style;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Build a ROM filesystem image from a title and a list of host files.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// ROM base address, in any of strtoul's auto-detected bases
    /// (decimal, `0x`-prefixed hex, or `0`-prefixed octal).
    #[arg(value_parser = parse_base)]
    base_addr: u32,

    /// Output `.rom` image path.
    output: PathBuf,

    /// Title stored in the ROM's first entry.
    title: String,

    /// Files to pack, as `target=host` or a bare `host` path.
    entries: Vec<String>,
}

fn parse_base(s: &str) -> Result<u32, String> {
    parse_int_c_style(s).ok_or_else(|| format!("`{s}` is not a valid integer"))
}

fn run(args: Args) -> bbctape::Result<()> {
    let mut builder = RomFsBuilder::new(args.base_addr);
    builder.add_title(&args.title)?;
    for entry in &args.entries {
        builder.add_file(entry, 0, 0)?;
    }
    std::fs::write(&args.output, builder.finish())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
