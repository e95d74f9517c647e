use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lols::worker::run_unit;
use lols::CodecKind;

#[derive(Parser)]
#[command(name = "compress-lols-worker")]
#[command(about = "Compress one segment and persist it under its indexed artifact name")]
struct Cli {
    /// Unit index within the run
    index: usize,

    /// Segment content
    #[arg(allow_hyphen_values = true)]
    segment: OsString,

    /// Original input file name
    original: PathBuf,

    #[arg(long, default_value = "rle")]
    codec: CodecKind,

    #[arg(long, default_value_t = lols::codec::DEFAULT_ZSTD_LEVEL)]
    zstd_level: i32,
}

#[cfg(unix)]
fn segment_bytes(segment: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    segment.into_vec()
}

#[cfg(not(unix))]
fn segment_bytes(segment: OsString) -> Vec<u8> {
    segment.to_string_lossy().into_owned().into_bytes()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("unit {}: pid {}", cli.index, std::process::id());

    let codec = cli.codec.build(cli.zstd_level);
    let segment = segment_bytes(cli.segment);
    let path = run_unit(cli.index, &segment, &cli.original, codec.as_ref())
        .with_context(|| format!("unit {} of {}", cli.index, cli.original.display()))?;

    println!("unit {}: wrote {}", cli.index, path.display());
    Ok(())
}
