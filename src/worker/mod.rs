//! Worker units: one independent execution context per segment.
//!
//! A [`UnitLauncher`] turns a [`Segment`] into a running [`WorkerUnit`]. Every
//! unit runs [`run_unit`] against its own segment (in a child process or in a
//! dedicated thread) and persists its own artifact. Units are reaped exactly
//! once: either by the collector, or by their `Drop` impl if an error path
//! discards them first. Dropping never kills a unit, it waits for it.

mod process;
mod thread;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use log::info;

use crate::artifact;
use crate::codec::Codec;
use crate::error::Result;
use crate::split::Segment;

pub use process::{ProcessLauncher, ProcessUnit, WORKER_ENV, WORKER_PROGRAM};
pub use thread::{ThreadLauncher, ThreadUnit};

/// How a unit terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitExit {
    Code(i32),
    Signal(i32),
    Failed(String),
}

impl UnitExit {
    pub fn success(&self) -> bool {
        matches!(self, UnitExit::Code(0))
    }
}

impl From<ExitStatus> for UnitExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return UnitExit::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return UnitExit::Signal(signal);
            }
        }
        UnitExit::Failed(format!("unknown exit status: {status}"))
    }
}

impl fmt::Display for UnitExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitExit::Code(code) => write!(f, "exited with status {code}"),
            UnitExit::Signal(signal) => write!(f, "killed by signal {signal}"),
            UnitExit::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

pub trait WorkerUnit {
    fn index(&self) -> usize;

    /// Process id, or a launcher-local ordinal for in-process units.
    fn id(&self) -> u32;

    /// Non-blocking check; reaps the unit if it has terminated.
    fn try_wait(&mut self) -> Result<Option<UnitExit>>;

    /// Block until the unit terminates and reap it.
    fn wait(&mut self) -> Result<UnitExit>;
}

pub trait UnitLauncher {
    type Unit: WorkerUnit;

    /// Start a unit for `segment`. The segment is moved into the unit.
    fn launch(&mut self, segment: Segment, original: &Path) -> Result<Self::Unit>;
}

/// Body of a unit: compress one segment and persist it under its indexed name.
pub fn run_unit(index: usize, segment: &[u8], original: &Path, codec: &dyn Codec) -> Result<PathBuf> {
    let compressed = codec.compress(segment)?;
    let path = artifact::part_name(original, index);
    let written = artifact::persist(&path, &compressed)?;
    info!(
        "unit {index}: {} -> {} bytes ({}) at {}",
        segment.len(),
        written,
        codec.name(),
        path.display()
    );
    Ok(path)
}
