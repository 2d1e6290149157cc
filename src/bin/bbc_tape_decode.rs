//! `bbc-tape-decode` — recovers files from a WAV capture of cassette audio.
//!
//! Grounded on `original_source/Tools/TapeReader/tape_reader.cpp`'s `main`:
//! read one channel's samples through the demodulator and state machine,
//! one frame at a time, until the WAV data chunk is exhausted.

use bbctape::decoder::{NumberedFileSink, TapeDecoder};
use bbctape::wav::WavReader;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

/// Decode a WAV capture of BBC Micro/Electron cassette audio into its
/// constituent files.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// WAV file to decode.
    input: PathBuf,

    /// Directory to write recovered files into.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Audio channel to read (for stereo captures).
    #[arg(short, long, default_value_t = 0)]
    channel: u16,
}

fn run(args: Args) -> bbctape::Result<()> {
    let file = File::open(&args.input)?;
    let mut wav = WavReader::new(BufReader::new(file))?;

    let mut decoder = TapeDecoder::new(wav.format().sample_rate as f64);
    let mut sink = NumberedFileSink::new(&args.output_dir);

    let mut buf = vec![0u8; wav.format().bytes_per_frame as usize];
    log::info!("reading {}", args.input.display());
    while wav.frames_remaining() > 0 {
        wav.read_frame(&mut buf)?;
        let sample = wav.sample(&buf, args.channel)?;
        decoder.sample(sample, &mut sink)?;
    }
    decoder.finish(&mut sink)?;
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
