use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use lols::{CodecKind, CompressConfig, LaunchMode, Orchestrator, RunEvent, RunReport};

#[derive(Parser)]
#[command(name = "compress-lols")]
#[command(about = "Compress a text file, optionally split across one worker per part")]
struct Cli {
    /// File to compress
    input: PathBuf,

    /// Number of parts (one worker unit per part when greater than 1)
    #[arg(allow_negative_numbers = true)]
    parts: i64,

    /// Codec applied to each part (rle, zstd, identity)
    #[arg(long, default_value = "rle")]
    codec: CodecKind,

    /// Zstd compression level
    #[arg(long, default_value_t = lols::codec::DEFAULT_ZSTD_LEVEL)]
    zstd_level: i32,

    /// Worker backend (process, thread)
    #[arg(long, default_value = "process")]
    launch: LaunchMode,

    /// Worker executable (default: $LOLS_WORKER or compress-lols-worker beside this binary)
    #[arg(long)]
    worker: Option<PathBuf>,

    /// Poll interval in milliseconds while waiting for units
    #[arg(long, default_value_t = 5)]
    poll_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("Parts: {}", cli.parts);

    let mut config = CompressConfig::new(cli.input, cli.parts);
    config.codec = cli.codec;
    config.zstd_level = cli.zstd_level;
    config.launch = cli.launch;
    config.worker_program = cli.worker;
    config.poll_interval = Duration::from_millis(cli.poll_ms);

    let report = Orchestrator::new(config)
        .with_observer(|event| match event {
            RunEvent::Segment { index, data } => {
                println!("Split {index}: {}", String::from_utf8_lossy(data));
            }
            RunEvent::Launched { index, id } => {
                println!("unit {index}: started with id {id}");
            }
            RunEvent::Finished(record) => {
                println!("unit {} (id {}) {}", record.index, record.id, record.exit);
            }
        })
        .run()
        .map_err(|err| match err.hint() {
            Some(hint) => anyhow::Error::new(err).context(hint),
            None => err.into(),
        })?;

    match report {
        RunReport::Single(single) if single.textual => {
            println!("Compressed string: {}", String::from_utf8_lossy(&single.compressed));
        }
        RunReport::Single(single) => {
            println!(
                "Compressed {} -> {} bytes into {}",
                single.input_len,
                single.compressed.len(),
                single.artifact.display()
            );
        }
        RunReport::Multi(multi) => {
            println!("{}", multi.outcome.summary());
        }
    }
    Ok(())
}
