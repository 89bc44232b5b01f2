//! Persistence slot for the serialized access token
//!
//! Exactly one value lives in a slot. `MemorySlot` keeps it in process
//! (tests, throwaway sessions); `FileSlot` keeps it on disk so a restart
//! does not force a new sign-in. File writes use atomic temp-file + rename
//! and a tokio Mutex serializes writers.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Boxed future returned by slot operations (keeps `dyn TokenSlot` usable).
pub type SlotFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Single key-value slot holding the raw serialized token.
pub trait TokenSlot: Send + Sync {
    /// Current raw value, `None` when empty.
    fn read(&self) -> SlotFuture<'_, Option<String>>;

    /// Replace the stored value.
    fn write<'a>(&'a self, value: &'a str) -> SlotFuture<'a, ()>;

    /// Delete the stored value. Deleting an empty slot is not an error.
    fn remove(&self) -> SlotFuture<'_, ()>;
}

/// In-process slot.
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenSlot for MemorySlot {
    fn read(&self) -> SlotFuture<'_, Option<String>> {
        Box::pin(async move { Ok(self.value.lock().await.clone()) })
    }

    fn write<'a>(&'a self, value: &'a str) -> SlotFuture<'a, ()> {
        Box::pin(async move {
            *self.value.lock().await = Some(value.to_owned());
            Ok(())
        })
    }

    fn remove(&self) -> SlotFuture<'_, ()> {
        Box::pin(async move {
            self.value.lock().await.take();
            Ok(())
        })
    }
}

/// Slot backed by a single file, permissions 0600.
pub struct FileSlot {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSlot {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSlot for FileSlot {
    fn read(&self) -> SlotFuture<'_, Option<String>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) if contents.trim().is_empty() => Ok(None),
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(Error::Io(format!("reading token slot: {e}"))),
            }
        })
    }

    fn write<'a>(&'a self, value: &'a str) -> SlotFuture<'a, ()> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            write_atomic(&self.path, value).await
        })
    }

    fn remove(&self) -> SlotFuture<'_, ()> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {
                    debug!(path = %self.path.display(), "removed token slot");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::Io(format!("removing token slot: {e}"))),
            }
        })
    }
}

/// Write the slot file atomically: temp file in the same directory, 0600,
/// then rename over the target.
async fn write_atomic(path: &Path, value: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token slot path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".access_token.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, value.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp token slot: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting token slot permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp token slot: {e}")))?;

    debug!(path = %path.display(), "persisted token slot");
    Ok(())
}
