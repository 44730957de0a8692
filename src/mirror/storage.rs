// src/mirror/storage.rs
// =============================================================================
// Writes mirrored files so that nobody reading the output directory ever sees
// half a file.
//
// The bytes go to a hidden sibling ".<name>.part-<n>" first, then the file
// is renamed into place. A rename within one directory is atomic.
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

// Two URLs can map to the same path (e.g. "/about" and "/about/"), so temp
// names must be unique per write, not per target
static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `out_dir/relative`, creating parent directories.
pub async fn write_atomic(out_dir: &Path, relative: &Path, contents: &[u8]) -> io::Result<PathBuf> {
    let target = out_dir.join(relative);
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    fs::create_dir_all(parent).await?;

    let name = target
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy()
        .into_owned();
    let n = NEXT_TEMP.fetch_add(1, Ordering::Relaxed);
    let temp = parent.join(format!(".{name}.part-{n}"));

    if let Err(e) = fs::write(&temp, contents).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&temp, &target).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }

    Ok(target)
}
