//! Child-process units running the worker executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use log::{info, warn};

use super::{UnitExit, UnitLauncher, WorkerUnit};
use crate::codec::CodecKind;
use crate::error::{Error, Result};
use crate::split::Segment;

/// Name of the worker executable installed next to `compress-lols`.
pub const WORKER_PROGRAM: &str = "compress-lols-worker";

/// Overrides the worker executable path.
pub const WORKER_ENV: &str = "LOLS_WORKER";

/// Launches each unit as a child process:
/// `<worker> --codec <name> --zstd-level <n> -- <index> <segment> <original>`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    codec: CodecKind,
    zstd_level: i32,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, codec: CodecKind, zstd_level: i32) -> Self {
        Self {
            program: program.into(),
            codec,
            zstd_level,
        }
    }

    /// `$LOLS_WORKER`, else the worker binary beside the current executable.
    pub fn default_program() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(WORKER_ENV) {
            return Ok(PathBuf::from(path));
        }
        let exe = std::env::current_exe()?;
        let mut program = exe.with_file_name(WORKER_PROGRAM);
        if let Some(ext) = exe.extension() {
            program.set_extension(ext);
        }
        Ok(program)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[cfg(unix)]
fn segment_arg(data: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(data)
}

#[cfg(not(unix))]
fn segment_arg(data: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&data).into_owned())
}

impl UnitLauncher for ProcessLauncher {
    type Unit = ProcessUnit;

    fn launch(&mut self, segment: Segment, original: &Path) -> Result<ProcessUnit> {
        let index = segment.index;
        let child = Command::new(&self.program)
            .arg("--codec")
            .arg(self.codec.as_str())
            .arg("--zstd-level")
            .arg(self.zstd_level.to_string())
            .arg("--")
            .arg(index.to_string())
            .arg(segment_arg(segment.data))
            .arg(original)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| Error::Launch { index, source })?;

        info!("unit {index}: launched pid {}", child.id());
        Ok(ProcessUnit {
            index,
            child,
            exit: None,
        })
    }
}

#[derive(Debug)]
pub struct ProcessUnit {
    index: usize,
    child: Child,
    exit: Option<UnitExit>,
}

impl WorkerUnit for ProcessUnit {
    fn index(&self) -> usize {
        self.index
    }

    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> Result<Option<UnitExit>> {
        if let Some(exit) = &self.exit {
            return Ok(Some(exit.clone()));
        }
        let exit = self.child.try_wait()?.map(UnitExit::from);
        self.exit = exit.clone();
        Ok(exit)
    }

    fn wait(&mut self) -> Result<UnitExit> {
        if let Some(exit) = &self.exit {
            return Ok(exit.clone());
        }
        let exit = UnitExit::from(self.child.wait()?);
        self.exit = Some(exit.clone());
        Ok(exit)
    }
}

impl Drop for ProcessUnit {
    fn drop(&mut self) {
        if self.exit.is_none() {
            warn!("unit {}: dropped before reaping, waiting for pid {}", self.index, self.child.id());
            let _ = self.child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Result<ProcessUnit> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .spawn()?;
        Ok(ProcessUnit {
            index: 0,
            child,
            exit: None,
        })
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let mut launcher = ProcessLauncher::new("/nonexistent/lols-worker", CodecKind::RunLength, 3);
        let segment = Segment {
            index: 4,
            data: b"AAAB".to_vec(),
        };
        let err = launcher.launch(segment, Path::new("in.txt")).unwrap_err();
        assert!(matches!(err, Error::Launch { index: 4, .. }));
        assert!(!err.is_resource_exhaustion());
    }

    #[test]
    fn wait_reports_exit_code_once() -> Result<()> {
        let mut unit = shell("exit 3")?;
        assert_eq!(unit.wait()?, UnitExit::Code(3));
        assert_eq!(unit.try_wait()?, Some(UnitExit::Code(3)));
        Ok(())
    }

    #[test]
    fn drop_waits_for_running_unit() -> Result<()> {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let marker = temp_dir.path().join("done");
        let unit = shell(&format!("sleep 0.05; touch '{}'", marker.display()))?;

        drop(unit);
        assert!(marker.exists(), "drop returned before the unit finished");
        Ok(())
    }

    #[test]
    fn default_program_sits_beside_current_exe() -> Result<()> {
        let path = ProcessLauncher::default_program()?;
        if std::env::var_os(WORKER_ENV).is_none() {
            assert!(path.to_string_lossy().contains(WORKER_PROGRAM));
        }
        Ok(())
    }
}
