use std::fs;
use std::path::{Path, PathBuf};

/// A hidden sibling file that becomes `destination` only on [`commit`].
///
/// Dropping an uncommitted stage removes the temporary file, so a failed run
/// never leaves partial output at the destination or next to it.
///
/// [`commit`]: StagedOutput::commit
pub struct StagedOutput {
    destination: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagedOutput {
    /// Creates the destination's parent directory if needed and picks the
    /// temporary path `.<stem>.part.<ext>` beside it. The extension is kept so
    /// writers that infer the format from it still work.
    pub fn new(destination: &Path) -> std::io::Result<Self> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            destination: destination.to_path_buf(),
            temp: temp_sibling(destination),
            committed: false,
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Moves the temporary file over the destination.
    pub fn commit(mut self) -> std::io::Result<()> {
        fs::rename(&self.temp, &self.destination)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.committed && self.temp.exists() {
            if let Err(e) = fs::remove_file(&self.temp) {
                log::warn!("Could not remove {}: {e}", self.temp.display());
            }
        }
    }
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match destination.extension() {
        Some(ext) => format!(".{stem}.part.{}", ext.to_string_lossy()),
        None => format!(".{stem}.part"),
    };
    destination.with_file_name(name)
}
