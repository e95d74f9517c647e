//! Thread-backed units sharing one codec.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::info;

use super::{run_unit, UnitExit, UnitLauncher, WorkerUnit};
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::split::Segment;

/// Launches each unit on its own named OS thread inside this process.
///
/// The segment is moved into the thread; the only thing shared with siblings is
/// the stateless codec.
pub struct ThreadLauncher {
    codec: Arc<dyn Codec>,
    next_id: u32,
}

impl ThreadLauncher {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec, next_id: 1 }
    }
}

impl UnitLauncher for ThreadLauncher {
    type Unit = ThreadUnit;

    fn launch(&mut self, segment: Segment, original: &Path) -> Result<ThreadUnit> {
        let index = segment.index;
        let codec = Arc::clone(&self.codec);
        let original = original.to_path_buf();

        let handle = thread::Builder::new()
            .name(format!("lols-unit-{index}"))
            .spawn(move || -> Result<()> {
                run_unit(index, &segment.data, &original, codec.as_ref())?;
                Ok(())
            })
            .map_err(|source| Error::Launch { index, source })?;

        let id = self.next_id;
        self.next_id += 1;
        info!("unit {index}: launched thread #{id}");
        Ok(ThreadUnit {
            index,
            id,
            handle: Some(handle),
            exit: None,
        })
    }
}

pub struct ThreadUnit {
    index: usize,
    id: u32,
    handle: Option<JoinHandle<Result<()>>>,
    exit: Option<UnitExit>,
}

impl ThreadUnit {
    fn join(&mut self) -> UnitExit {
        let exit = match self.handle.take().map(JoinHandle::join) {
            Some(Ok(Ok(()))) => UnitExit::Code(0),
            Some(Ok(Err(err))) => UnitExit::Failed(err.to_string()),
            Some(Err(_)) => UnitExit::Failed("unit thread panicked".to_string()),
            None => UnitExit::Failed("unit already joined".to_string()),
        };
        self.exit = Some(exit.clone());
        exit
    }
}

impl WorkerUnit for ThreadUnit {
    fn index(&self) -> usize {
        self.index
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn try_wait(&mut self) -> Result<Option<UnitExit>> {
        if let Some(exit) = &self.exit {
            return Ok(Some(exit.clone()));
        }
        let running = self.handle.as_ref().is_some_and(|h| !h.is_finished());
        if running {
            return Ok(None);
        }
        Ok(Some(self.join()))
    }

    fn wait(&mut self) -> Result<UnitExit> {
        if let Some(exit) = &self.exit {
            return Ok(exit.clone());
        }
        Ok(self.join())
    }
}

impl Drop for ThreadUnit {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::part_name;
    use crate::codec::{IdentityCodec, RunLengthCodec};
    use tempfile::TempDir;

    struct FailingCodec;

    impl Codec for FailingCodec {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn compress(&self, _input: &[u8]) -> Result<Vec<u8>> {
            Err(Error::Codec {
                codec: "failing",
                message: "refused".to_string(),
            })
        }
    }

    #[test]
    fn thread_unit_persists_segment() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("notes.txt");
        let mut launcher = ThreadLauncher::new(Arc::new(RunLengthCodec));

        let mut unit = launcher.launch(
            Segment {
                index: 2,
                data: b"CDAA".to_vec(),
            },
            &input,
        )?;
        assert_eq!(unit.index(), 2);
        assert_eq!(unit.wait()?, UnitExit::Code(0));
        assert_eq!(std::fs::read(part_name(&input, 2))?, b"CDAA");
        Ok(())
    }

    #[test]
    fn codec_failure_marks_unit_failed_without_artifact() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("notes.txt");
        let mut launcher = ThreadLauncher::new(Arc::new(FailingCodec));

        let mut unit = launcher.launch(
            Segment {
                index: 0,
                data: b"AAAA".to_vec(),
            },
            &input,
        )?;
        let exit = unit.wait()?;
        assert!(!exit.success());
        assert!(exit.to_string().contains("refused"));
        assert!(!part_name(&input, 0).exists());
        Ok(())
    }

    #[test]
    fn ids_are_sequential() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("notes.txt");
        let mut launcher = ThreadLauncher::new(Arc::new(IdentityCodec));

        let ids = (0..3)
            .map(|index| {
                let segment = Segment {
                    index,
                    data: vec![b'a'],
                };
                launcher.launch(segment, &input).map(|unit| unit.id())
            })
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }
}
