use std::io::Write;

/// Prefix of the hidden sibling file a save is staged in.
pub const SAVE_PREFIX: &str = ".save_tmp_";

/// Writes `chunks` to `path` so that readers see either the old file or the
/// complete new one.
///
/// The temporary file is created in the *same directory* as the target,
/// since a rename across filesystems is not atomic.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, if
/// syncing fails, or if the final rename fails.
pub fn write_atomic<'a, I>(path: impl AsRef<std::path::Path>, chunks: I) -> std::io::Result<u64>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => std::path::Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(SAVE_PREFIX)
        .tempfile_in(parent_dir)?;
    let mut written = 0u64;

    for chunk in chunks {
        staged.write_all(chunk)?;
        written += chunk.len() as u64;
    }

    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    log::debug!("saved {} ({written} bytes)", path.display());

    Ok(written)
}
