//! Output naming and persistence.
//!
//! Artifacts live next to the input. `notes.txt` compresses to
//! `notes_txt_LOLS`; unit `i` of a multi-part run writes `notes_txt_LOLS<i>`.
//! The indexed names never collide with each other or with the single-part name.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const ARTIFACT_MARKER: &str = "LOLS";

const TMP_SUFFIX: &str = ".tmp";

fn base_name(original: &Path) -> OsString {
    let mut name = original
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    if let Some(ext) = original.extension() {
        name.push("_");
        name.push(ext);
    }
    name.push("_");
    name.push(ARTIFACT_MARKER);
    name
}

fn artifact_dir(original: &Path) -> &Path {
    match original.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Artifact path of a single-part run.
pub fn derive_name(original: &Path) -> PathBuf {
    original.with_file_name(base_name(original))
}

/// Artifact path written by unit `index` of a multi-part run.
pub fn part_name(original: &Path, index: usize) -> PathBuf {
    let mut name = base_name(original);
    name.push(index.to_string());
    original.with_file_name(name)
}

/// Find an artifact a previous run over `original` would have left behind.
pub fn find_existing(original: &Path) -> Result<Option<PathBuf>> {
    let single = derive_name(original);
    if single.exists() {
        return Ok(Some(single));
    }

    let dir = artifact_dir(original);
    if !dir.is_dir() {
        return Ok(None);
    }
    let base = base_name(original).to_string_lossy().into_owned();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(suffix) = name.strip_prefix(base.as_str()) {
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(Some(entry.path()));
            }
        }
    }
    Ok(None)
}

pub fn exists(original: &Path) -> Result<bool> {
    Ok(find_existing(original)?.is_some())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Write `bytes` to `path` so that readers see either nothing or the whole artifact.
pub fn persist(path: &Path, bytes: &[u8]) -> Result<u64> {
    let tmp = tmp_path(path);
    let _ = std::fs::remove_file(&tmp);

    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&tmp)?;
    if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    drop(file);

    std::fs::rename(&tmp, path)?;
    Ok(bytes.len() as u64)
}
