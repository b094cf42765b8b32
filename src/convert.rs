//! Conversion of arbitrary images to PNG, with an on-disk cache.
//!
//! Kitty only displays some formats as a background, so everything that is
//! not already a PNG is converted once and kept under the cache directory.
//! Entries are named by the SHA-1 of `<resolved path>:<mtime ns>:<size>`:
//! touching or replacing the source changes the key, old entries are simply
//! left behind.
//!
//! A converted file is written to a temporary file inside the cache directory
//! and renamed into place, so a concurrent reader sees either no entry or a
//! complete one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::process::{CommandRunner, Invocation};

/// Converts images into a cache directory.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    cache_dir: PathBuf,
}

impl ImageConverter {
    /// Converter storing its results in `cache_dir`. The directory is created
    /// on the first conversion.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache file for `source` in its current state on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be resolved or its metadata read.
    pub fn cached_path(&self, source: &Path) -> Result<PathBuf> {
        let resolved = fs::canonicalize(source)
            .with_context(|| format!("Failed to resolve {}", source.display()))?;
        let metadata = fs::metadata(&resolved)
            .with_context(|| format!("Failed to stat {}", resolved.display()))?;
        let mtime_ns = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_nanos());

        let key = format!("{}:{mtime_ns}:{}", resolved.display(), metadata.len());
        let digest = Sha1::digest(key.as_bytes());
        Ok(self.cache_dir.join(format!("{digest:x}.png")))
    }

    /// A PNG version of `source`.
    ///
    /// PNG sources are returned as is. Anything else is served from the cache,
    /// converting it first on a miss. If the converter fails, the source path is
    /// returned so the caller can still try to display the original.
    ///
    /// # Errors
    ///
    /// Returns an error if the source metadata cannot be read or the cache
    /// directory cannot be created.
    pub fn convert(&self, source: &Path, runner: &impl CommandRunner) -> Result<PathBuf> {
        if is_png(source) {
            return Ok(source.to_path_buf());
        }

        let target = self.cached_path(source)?;
        if target.exists() {
            debug!(target = %target.display(), "cache hit");
            return Ok(target);
        }

        let cache_dir = &self.cache_dir;
        fs::create_dir_all(cache_dir)
            .with_context(|| format!("Failed to create cache {}", cache_dir.display()))?;

        let tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile_in(cache_dir)
            .context("Failed to create temporary file in the cache")?
            .into_temp_path();

        // The temporary file is removed when `tmp` is dropped on any failure path.
        if let Err(err) = runner.run(&converter_invocation(source, &tmp)) {
            warn!("image conversion failed for {}: {err}", source.display());
            return Ok(source.to_path_buf());
        }

        match tmp.persist(&target) {
            Ok(()) => {
                debug!(target = %target.display(), "converted");
                Ok(target)
            }
            Err(err) => {
                warn!("failed to publish {}: {err}", target.display());
                Ok(source.to_path_buf())
            }
        }
    }
}

fn is_png(path: &Path) -> bool {
    let ext = path.extension().unwrap_or_default();
    ext.eq_ignore_ascii_case("png")
}

/// Platform image tool writing `source` as a PNG to `dest`.
fn converter_invocation(source: &Path, dest: &Path) -> Invocation {
    if cfg!(target_os = "macos") {
        Invocation::new("sips")
            .args(["-s", "format", "png"])
            .arg(source)
            .arg("--out")
            .arg(dest)
    } else {
        Invocation::new("magick").arg(source).arg(dest)
    }
}
