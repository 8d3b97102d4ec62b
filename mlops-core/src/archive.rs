//! Training artifact handling.
//!
//! Training jobs publish their outputs as a single gzipped tarball next to the model artifact.
//! The helpers here unpack such archives into scratch space and inspect the result. All of the
//! work is blocking filesystem IO, so the async entry points move it onto the blocking pool.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use walkdir::WalkDir;

/// The name of the archive which training jobs write their outputs to.
pub const TRAINING_OUTPUT_ARCHIVE: &str = "output.tar.gz";

/// Unpack the given gzipped tarball into `dest`, creating `dest` as needed.
pub fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).with_context(|| format!("error creating extraction dir {}", dest.display()))?;
    let file = File::open(archive).with_context(|| format!("error opening archive {}", archive.display()))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .with_context(|| format!("error unpacking archive {} into {}", archive.display(), dest.display()))
}

/// Unpack the given gzipped tarball into `dest` on the blocking pool.
#[tracing::instrument(level = "debug", err)]
pub async fn unpack(archive: PathBuf, dest: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || unpack_tar_gz(&archive, &dest))
        .await
        .context("error joining archive extraction task")?
}

/// List all entries beneath `root`, including `root` itself, in a stable order.
pub fn list_tree(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(err) => {
                tracing::warn!(error = %err, "error walking directory tree");
                None
            }
        })
        .collect()
}

/// Log the contents of the tree beneath `root` at debug level.
pub fn log_tree(title: &str, root: &Path) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for path in list_tree(root) {
        tracing::debug!(root = %root.display(), path = %path.display(), "{}", title);
    }
}
