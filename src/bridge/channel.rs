use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

const CHANNEL_PREFIX: &str = "modemscope-result";

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);

/// Temporary file through which the engine hands back its result document.
///
/// The handle reserves a unique path; the engine creates the file. Whatever
/// is at the path is removed when the channel is released or dropped, so the
/// file never outlives the invocation that owns it.
#[derive(Debug)]
pub struct ResultChannel {
    path: PathBuf,
}

impl ResultChannel {
    /// Reserve a fresh channel path inside `dir`, creating `dir` if needed.
    ///
    /// Names combine the process id, a per-process counter and a random v4
    /// UUID, so concurrent invocations never share a path.
    pub fn create(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("cannot prepare result channel directory {}: {}", dir.display(), e),
            )
        })?;

        let sequence = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        let file_name = format!(
            "{}-{}-{}-{}.json",
            CHANNEL_PREFIX,
            std::process::id(),
            sequence,
            Uuid::new_v4().simple()
        );

        Ok(Self {
            path: dir.join(file_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the engine's output and delete the backing file.
    ///
    /// Returns `Ok(None)` when the engine never wrote the file. The file is
    /// removed even when reading it fails.
    pub async fn take_contents(&mut self) -> io::Result<Option<Vec<u8>>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        };
        self.release();
        contents
    }

    /// Remove the backing file if present. Safe to call more than once.
    pub fn release(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed result channel {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove result channel {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ResultChannel {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_paths_are_unique() {
        let dir = tempdir().unwrap();
        let paths: HashSet<PathBuf> = (0..256)
            .map(|_| ResultChannel::create(dir.path()).unwrap().path().to_path_buf())
            .collect();
        assert_eq!(paths.len(), 256);
    }

    #[test]
    fn test_create_does_not_touch_the_file() {
        let dir = tempdir().unwrap();
        let channel = ResultChannel::create(dir.path()).unwrap();
        assert!(!channel.exists());
        assert!(channel.path().starts_with(dir.path()));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempdir().unwrap();
        let channel = ResultChannel::create(dir.path()).unwrap();
        let path = channel.path().to_path_buf();
        std::fs::write(&path, b"{}").unwrap();

        drop(channel);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_take_contents_reads_then_deletes() {
        let dir = tempdir().unwrap();
        let mut channel = ResultChannel::create(dir.path()).unwrap();
        std::fs::write(channel.path(), br#"{"success":true}"#).unwrap();

        let contents = channel.take_contents().await.unwrap();
        assert_eq!(contents.as_deref(), Some(&br#"{"success":true}"#[..]));
        assert!(!channel.exists());
    }

    #[tokio::test]
    async fn test_take_contents_missing_file() {
        let dir = tempdir().unwrap();
        let mut channel = ResultChannel::create(dir.path()).unwrap();
        assert_eq!(channel.take_contents().await.unwrap(), None);
    }

    #[test]
    fn test_create_makes_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let channel = ResultChannel::create(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(channel.path().starts_with(&nested));
    }
}
