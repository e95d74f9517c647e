//! Run driver: validate, then compress inline or fan out one unit per segment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};

use crate::artifact;
use crate::codec::{Codec, CodecKind, DEFAULT_ZSTD_LEVEL};
use crate::collect::{Collector, RunOutcome, UnitRecord, DEFAULT_POLL_INTERVAL};
use crate::error::{Error, Result};
use crate::split::{split, validate_parts};
use crate::worker::{ProcessLauncher, ThreadLauncher, UnitLauncher, WorkerUnit};

/// Execution backend for multi-part runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Process,
    Thread,
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Process => f.write_str("process"),
            LaunchMode::Thread => f.write_str("thread"),
        }
    }
}

impl FromStr for LaunchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "process" => Ok(LaunchMode::Process),
            "thread" => Ok(LaunchMode::Thread),
            other => Err(format!("unknown launch mode: {other}")),
        }
    }
}

/// Configuration for one compression run.
#[derive(Debug, Clone)]
pub struct CompressConfig {
    pub input: PathBuf,
    /// Requested number of parts; checked against the input length at run time.
    pub parts: i64,
    pub codec: CodecKind,
    pub zstd_level: i32,
    pub launch: LaunchMode,
    /// Worker executable for [`LaunchMode::Process`]; defaults to
    /// [`ProcessLauncher::default_program`].
    pub worker_program: Option<PathBuf>,
    pub poll_interval: Duration,
}

impl CompressConfig {
    pub fn new(input: impl Into<PathBuf>, parts: i64) -> Self {
        Self {
            input: input.into(),
            parts,
            codec: CodecKind::default(),
            zstd_level: DEFAULT_ZSTD_LEVEL,
            launch: LaunchMode::default(),
            worker_program: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validated,
    SinglePath,
    MultiPath,
    Done,
    Aborted,
}

/// Progress notifications emitted while a run executes.
#[derive(Debug)]
pub enum RunEvent<'a> {
    Segment { index: usize, data: &'a [u8] },
    Launched { index: usize, id: u32 },
    Finished(&'a UnitRecord),
}

#[derive(Debug, Clone)]
pub struct SingleReport {
    pub artifact: PathBuf,
    pub input_len: usize,
    pub compressed: Vec<u8>,
    pub textual: bool,
}

#[derive(Debug, Clone)]
pub struct MultiReport {
    pub parts: usize,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone)]
pub enum RunReport {
    Single(SingleReport),
    Multi(MultiReport),
}

type Observer<'o> = Box<dyn FnMut(&RunEvent<'_>) + 'o>;

pub struct Orchestrator<'o> {
    config: CompressConfig,
    state: RunState,
    observer: Option<Observer<'o>>,
    codec: Option<Arc<dyn Codec>>,
}

impl<'o> Orchestrator<'o> {
    pub fn new(config: CompressConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            observer: None,
            codec: None,
        }
    }

    /// Use `codec` instead of building one from `config.codec`.
    ///
    /// Applies to inline and thread-backed runs; worker processes rebuild their
    /// codec from its [`CodecKind`].
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Receive [`RunEvent`]s as the run progresses.
    pub fn with_observer(mut self, observer: impl FnMut(&RunEvent<'_>) + 'o) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run with the configured backend.
    pub fn run(&mut self) -> Result<RunReport> {
        let result = self.run_configured();
        self.finish(result)
    }

    /// Execute the run with a caller-provided launcher for the multi-part path.
    pub fn run_with<L: UnitLauncher>(&mut self, launcher: &mut L) -> Result<RunReport> {
        let result = self.validate().and_then(|(buffer, parts)| {
            if parts == 1 {
                self.run_single(buffer)
            } else {
                self.run_multi(buffer, parts, launcher)
            }
        });
        self.finish(result)
    }

    fn run_configured(&mut self) -> Result<RunReport> {
        let (buffer, parts) = self.validate()?;
        if parts == 1 {
            return self.run_single(buffer);
        }

        match self.config.launch {
            LaunchMode::Process => {
                let program = match &self.config.worker_program {
                    Some(program) => program.clone(),
                    None => ProcessLauncher::default_program()?,
                };
                let mut launcher =
                    ProcessLauncher::new(program, self.config.codec, self.config.zstd_level);
                debug!("worker program: {}", launcher.program().display());
                self.run_multi(buffer, parts, &mut launcher)
            }
            LaunchMode::Thread => {
                let mut launcher = ThreadLauncher::new(self.codec());
                self.run_multi(buffer, parts, &mut launcher)
            }
        }
    }

    fn codec(&self) -> Arc<dyn Codec> {
        match &self.codec {
            Some(codec) => Arc::clone(codec),
            None => Arc::from(self.config.codec.build(self.config.zstd_level)),
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!("run {}: {:?} -> {:?}", self.config.input.display(), self.state, next);
        self.state = next;
    }

    fn finish(&mut self, result: Result<RunReport>) -> Result<RunReport> {
        match &result {
            Ok(_) => self.transition(RunState::Done),
            Err(err) => {
                error!("run {} aborted: {err}", self.config.input.display());
                self.transition(RunState::Aborted);
            }
        }
        result
    }

    fn emit(&mut self, event: RunEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    fn validate(&mut self) -> Result<(Vec<u8>, usize)> {
        let input = self.config.input.as_path();
        let buffer = load_input(input)?;
        let parts = validate_parts(self.config.parts, buffer.len())?;

        if let Some(existing) = artifact::find_existing(input)? {
            return Err(Error::PreexistingArtifact { artifact: existing });
        }

        info!("{}: {} bytes in {} part(s)", input.display(), buffer.len(), parts);
        self.transition(RunState::Validated);
        Ok((buffer, parts))
    }

    fn run_single(&mut self, buffer: Vec<u8>) -> Result<RunReport> {
        self.transition(RunState::SinglePath);
        let codec = self.codec();
        let input_len = buffer.len();
        let compressed = codec.compress(&buffer)?;
        drop(buffer);

        let path = artifact::derive_name(&self.config.input);
        artifact::persist(&path, &compressed)?;
        info!("wrote {} ({} -> {} bytes)", path.display(), input_len, compressed.len());

        Ok(RunReport::Single(SingleReport {
            artifact: path,
            input_len,
            compressed,
            textual: codec.is_textual(),
        }))
    }

    fn run_multi<L: UnitLauncher>(
        &mut self,
        buffer: Vec<u8>,
        parts: usize,
        launcher: &mut L,
    ) -> Result<RunReport> {
        self.transition(RunState::MultiPath);
        let segments = split(&buffer, parts)?;
        drop(buffer);

        let collector = Collector::new(self.config.poll_interval);
        let input = self.config.input.clone();
        let mut units = Vec::with_capacity(parts);

        for segment in segments {
            let index = segment.index;
            self.emit(RunEvent::Segment {
                index,
                data: &segment.data,
            });

            match launcher.launch(segment, &input) {
                Ok(unit) => {
                    self.emit(RunEvent::Launched { index, id: unit.id() });
                    units.push(unit);
                }
                Err(err) => {
                    error!(
                        "unit {index}: launch failed, reaping {} launched unit(s)",
                        units.len()
                    );
                    self.collect(&collector, units);
                    return Err(err);
                }
            }
        }

        let outcome = self.collect(&collector, units);
        info!("{}: {}", input.display(), outcome.summary());
        if !outcome.success {
            return Err(Error::UnitExecution {
                failed: outcome.failed_indices(),
                total: parts,
            });
        }

        Ok(RunReport::Multi(MultiReport { parts, outcome }))
    }

    fn collect<U: WorkerUnit>(&mut self, collector: &Collector, units: Vec<U>) -> RunOutcome {
        let observer = &mut self.observer;
        collector.collect(units, |record| {
            if let Some(observer) = observer.as_mut() {
                observer(&RunEvent::Finished(record));
            }
        })
    }
}

fn load_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::from_input(path, source))
}
