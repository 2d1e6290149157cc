//! `bbc-detokenize` — recovers printable BASIC source from a tokenized
//! program file.
//!
//! Grounded on `original_source/Tools/Acorn2Txt/acorn2txt.cpp`'s `main`/
//! `open_output_file`: default output name is `<input>.txt`, refused
//! without `-y` if it already exists.

use bbctape::error::BbcTapeError;
use bbctape::tokenize::{detokenize, Dialect, DetokenizeOptions};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Detokenize a tokenized BBC BASIC program into printable source.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Tokenized input file.
    input: PathBuf,

    /// Output path (defaults to `<input>.txt`).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Allow overwriting an existing output file.
    #[arg(short = 'y', long = "overwrite")]
    overwrite: bool,

    /// Prefix each recovered line with its decimal line number.
    #[arg(short = 'n', long = "line-numbers")]
    line_numbers: bool,

    /// Input file is 68000-dialect tokenized BASIC (default: 6502 dialect).
    #[arg(long = "68k")]
    is_68k: bool,
}

fn run(args: Args) -> bbctape::Result<()> {
    let data = std::fs::read(&args.input)?;
    let dialect = if args.is_68k { Dialect::Acorn68k } else { Dialect::Acorn6502 };
    let text = detokenize(dialect, &data, DetokenizeOptions { show_line_numbers: args.line_numbers })?;

    let output = args.output.unwrap_or_else(|| {
        let mut path = args.input.clone().into_os_string();
        path.push(".txt");
        PathBuf::from(path)
    });
    if !args.overwrite && output.exists() {
        return Err(BbcTapeError::RefusedOverwrite(output.display().to_string()));
    }
    std::fs::write(&output, text)?;
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
