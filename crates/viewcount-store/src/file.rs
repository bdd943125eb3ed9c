//! File-backed counter store.
//!
//! The file holds the decimal text of the current count and nothing else,
//! so it can be inspected or seeded by hand (`echo 5 > count.txt`).
//!
//! Writes never modify the target in place. The new value goes to a
//! sibling `<name>.tmp`, is flushed with `fsync`, and is then renamed over
//! the target. Rename within one directory is atomic, so a reader sees
//! either the old value or the new one, and a failed write leaves the old
//! value untouched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StoreError;
use crate::{CounterStore, parse_count};

/// Counter stored as decimal text in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileStore {
    /// Prepare a store at `path`, creating missing parent directories.
    ///
    /// The counter file itself is not created; a missing file reads as
    /// `None` until the first write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let tmp_path = tmp_sibling(&path);
        Ok(Self { path, tmp_path })
    }

    /// Path of the counter file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CounterStore for FileStore {
    async fn read(&self) -> Result<Option<u64>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => parse_count(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&self.path, e)),
        }
    }

    async fn write(&self, value: u64) -> Result<(), StoreError> {
        let mut file = tokio::fs::File::create(&self.tmp_path)
            .await
            .map_err(|e| Self::io_error(&self.tmp_path, e))?;
        file.write_all(value.to_string().as_bytes())
            .await
            .map_err(|e| Self::io_error(&self.tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| Self::io_error(&self.tmp_path, e))?;
        drop(file);

        tokio::fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| Self::io_error(&self.path, e))?;

        debug!(path = %self.path.display(), value, "counter written");
        Ok(())
    }

    fn location(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// `count.txt` -> `count.txt.tmp`, in the same directory.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("counter"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_file_is_a_sibling() {
        assert_eq!(
            tmp_sibling(Path::new("/var/lib/viewcount/count.txt")),
            PathBuf::from("/var/lib/viewcount/count.txt.tmp")
        );
        assert_eq!(tmp_sibling(Path::new("count")), PathBuf::from("count.tmp"));
    }
}
