//! Completion collection for launched units.

use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use crate::worker::{UnitExit, WorkerUnit};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Termination record of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub index: usize,
    pub id: u32,
    pub exit: UnitExit,
}

/// Aggregate result of a multi-part run, in completion order.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub records: Vec<UnitRecord>,
    pub success: bool,
    pub duration: Duration,
}

impl RunOutcome {
    pub fn failed_indices(&self) -> Vec<usize> {
        let mut failed: Vec<usize> = self
            .records
            .iter()
            .filter(|r| !r.exit.success())
            .map(|r| r.index)
            .collect();
        failed.sort_unstable();
        failed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Units: {}, Failed: {}, Duration: {:?}",
            self.records.len(),
            self.failed_indices().len(),
            self.duration
        )
    }
}

/// Waits for every unit of a run, whatever order they finish in.
///
/// Pending units are polled without blocking; when a sweep reaps nothing the
/// collector sleeps for `poll_interval`. A failed unit never stops the sweep.
#[derive(Debug, Clone)]
pub struct Collector {
    poll_interval: Duration,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Collector {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Reap all `units`. `on_exit` sees each record as soon as it is observed.
    pub fn collect<U, F>(&self, units: Vec<U>, mut on_exit: F) -> RunOutcome
    where
        U: WorkerUnit,
        F: FnMut(&UnitRecord),
    {
        let start = Instant::now();
        let mut pending = units;
        let mut records = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let mut reaped = false;
            let mut i = 0;
            while i < pending.len() {
                let exit = match pending[i].try_wait() {
                    Ok(Some(exit)) => exit,
                    Ok(None) => {
                        i += 1;
                        continue;
                    }
                    Err(err) => {
                        warn!("unit {}: status query failed: {err}", pending[i].index());
                        // Reaped regardless, but an unqueryable unit never counts as success.
                        if let Err(wait_err) = pending[i].wait() {
                            warn!("unit {}: wait failed: {wait_err}", pending[i].index());
                        }
                        UnitExit::Failed(format!("status query failed: {err}"))
                    }
                };

                let unit = pending.swap_remove(i);
                let record = UnitRecord {
                    index: unit.index(),
                    id: unit.id(),
                    exit,
                };
                if !record.exit.success() {
                    warn!("unit {} ({}): {}", record.index, record.id, record.exit);
                }
                on_exit(&record);
                records.push(record);
                reaped = true;
            }

            if !reaped && !pending.is_empty() {
                thread::sleep(self.poll_interval);
            }
        }

        let success = records.iter().all(|r| r.exit.success());
        RunOutcome {
            records,
            success,
            duration: start.elapsed(),
        }
    }
}
