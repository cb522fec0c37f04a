/// A read-only view of a file on disk.
///
/// Empty files are never mapped (a zero-length mapping is rejected on some
/// platforms); they expose an empty slice instead.
#[derive(Debug)]
pub struct MappedFile {
    _file: std::fs::File,
    mmap: Option<memmap2::Mmap>,
    path: std::path::PathBuf,
}

impl MappedFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened, inspected or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY:
            // - File is opened read-only
            // - We keep the file handle alive in struct
            // - Caller only gets immutable &[u8]
            Some(unsafe { memmap2::Mmap::map(&file)? })
        };

        log::debug!(
            "mapped {} ({} bytes)",
            path_buf.display(),
            mmap.as_ref().map_or(0, |m| m.len())
        );

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of mapped file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_maps_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"line one\nline two\n").unwrap();
        file.as_file().sync_all().unwrap();

        let mapped = MappedFile::open(file.path()).unwrap();

        assert_eq!(mapped.as_slice(), b"line one\nline two\n");
        assert_eq!(mapped.len(), 18);
        assert_eq!(mapped.path(), file.path());
    }

    #[test]
    fn test_open_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();

        assert!(mapped.is_empty());
        assert_eq!(mapped.as_slice(), b"");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = MappedFile::open(dir.path().join("missing.txt"));

        assert!(matches!(result, Err(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
