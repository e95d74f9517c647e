//! Split a text file into N contiguous parts and compress each part in its own
//! worker unit.
//!
//! A run either compresses the whole file inline (one part) or fans out one
//! unit per segment, waits for every unit, and reports the aggregate outcome.

pub mod artifact;
pub mod codec;
pub mod collect;
pub mod error;
pub mod orchestrator;
pub mod split;
pub mod worker;

pub use codec::{Codec, CodecKind};
pub use collect::{Collector, RunOutcome, UnitRecord};
pub use error::{Error, Result};
pub use orchestrator::{CompressConfig, LaunchMode, Orchestrator, RunEvent, RunReport, RunState};
pub use split::{split, Segment};
pub use worker::{ProcessLauncher, ThreadLauncher, UnitExit, UnitLauncher, WorkerUnit};
