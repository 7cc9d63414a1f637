//! Lifecycle of the single open handle to the log file

use crate::error::{Error, Result};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Where the handle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No handle is held
    Closed,
    /// An open is in flight
    Opening,
    /// A handle is ready for appends
    Open,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Opening => write!(f, "opening"),
            Self::Open => write!(f, "open"),
        }
    }
}

struct OpenFile {
    file: File,
    path: PathBuf,
    generation: u64,
}

struct Shared {
    path: Option<PathBuf>,
    idle_timeout: Duration,
    slot: Arc<AsyncMutex<Option<OpenFile>>>,
    state: Mutex<HandleState>,
    deadline: Mutex<Instant>,
    generation: AtomicU64,
    opens: AtomicU64,
    idle_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn set_state(&self, state: HandleState) {
        *self.state.lock() = state;
    }

    fn rearm(&self) {
        *self.deadline.lock() = Instant::now() + self.idle_timeout;
    }

    fn disarm(&self) {
        if let Some(timer) = self.idle_timer.lock().take() {
            timer.abort();
        }
    }
}

/// Owns at most one open append handle to the configured path.
///
/// The handle is opened by the first [`acquire`](Self::acquire), reused by
/// every acquire inside the idle window, and closed by a background timer
/// once the window passes without activity. Nothing else opens or closes
/// the file.
pub struct FileHandleManager {
    shared: Arc<Shared>,
}

impl FileHandleManager {
    /// Create a manager for `path` that closes the handle after `idle_timeout`
    /// without activity. A `None` path is reported on the first acquire.
    #[must_use]
    pub fn new(path: Option<PathBuf>, idle_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                path,
                idle_timeout,
                slot: Arc::new(AsyncMutex::new(None)),
                state: Mutex::new(HandleState::Closed),
                deadline: Mutex::new(Instant::now()),
                generation: AtomicU64::new(0),
                opens: AtomicU64::new(0),
                idle_timer: Mutex::new(None),
            }),
        }
    }

    /// Target path, if one was configured
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.shared.path.as_deref()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> HandleState {
        *self.shared.state.lock()
    }

    /// Number of successful opens since construction
    #[must_use]
    pub fn opens(&self) -> u64 {
        self.shared.opens.load(Ordering::Relaxed)
    }

    /// Get exclusive use of the open handle, opening it if needed.
    ///
    /// Concurrent callers queue behind the lease holder, so only one open is
    /// ever in flight. Every successful acquire re-arms the idle timer.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured, the open fails, or the
    /// path names a directory. The manager stays closed and the next
    /// acquire retries.
    pub async fn acquire(&self) -> Result<FileLease> {
        let mut guard = Arc::clone(&self.shared.slot).lock_owned().await;

        if guard.is_some() {
            self.shared.rearm();
            return Ok(FileLease {
                guard,
                shared: Arc::clone(&self.shared),
            });
        }

        let path = self.shared.path.clone().ok_or(Error::MissingPath)?;

        self.shared.set_state(HandleState::Opening);
        let file = match open_append(&path).await {
            Ok(file) => file,
            Err(e) => {
                self.shared.set_state(HandleState::Closed);
                return Err(e);
            }
        };

        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        *guard = Some(OpenFile {
            file,
            path,
            generation,
        });

        self.shared.opens.fetch_add(1, Ordering::Relaxed);
        self.shared.rearm();
        self.shared.set_state(HandleState::Open);

        let timer = spawn_idle_timer(Arc::clone(&self.shared), generation);
        if let Some(previous) = self.shared.idle_timer.lock().replace(timer) {
            previous.abort();
        }

        debug!(generation, "opened log file");

        Ok(FileLease {
            guard,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Close the handle now, flushing anything buffered
    pub async fn close(&self) {
        let mut slot = self.shared.slot.lock().await;
        self.shared.disarm();

        if let Some(mut open) = slot.take() {
            if let Err(e) = open.file.flush().await {
                warn!("failed to flush {} on close: {e}", open.path.display());
            }
            debug!(generation = open.generation, "closed log file");
        }

        self.shared.set_state(HandleState::Closed);
    }
}

impl fmt::Debug for FileHandleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandleManager")
            .field("path", &self.shared.path)
            .field("idle_timeout", &self.shared.idle_timeout)
            .field("state", &self.state())
            .field("opens", &self.opens())
            .finish()
    }
}

impl Drop for FileHandleManager {
    fn drop(&mut self) {
        self.shared.disarm();
    }
}

/// Exclusive access to the open handle, granted by
/// [`FileHandleManager::acquire`].
///
/// The idle timer cannot close the file while a lease is alive.
pub struct FileLease {
    guard: OwnedMutexGuard<Option<OpenFile>>,
    shared: Arc<Shared>,
}

impl FileLease {
    /// Append one line and wait for it to reach the file.
    ///
    /// Each line is flushed on its own so a failure is attributed to the
    /// line that caused it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the append fails.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let open = self.open_file()?;
        let written = match open.file.write_all(line.as_bytes()).await {
            Ok(()) => open.file.flush().await,
            Err(e) => Err(e),
        };

        written.map_err(|source| Error::Write {
            path: open.path.clone(),
            source,
        })
    }

    /// Reset the idle countdown
    pub fn touch(&self) {
        self.shared.rearm();
    }

    /// Discard the handle after a failure so the next acquire reopens it
    pub fn invalidate(mut self) {
        self.shared.disarm();
        if let Some(open) = self.guard.take() {
            warn!(generation = open.generation, "discarding log file handle");
        }
        self.shared.set_state(HandleState::Closed);
    }

    fn open_file(&mut self) -> Result<&mut OpenFile> {
        let path = self.shared.path.clone().unwrap_or_default();
        self.guard.as_mut().ok_or_else(|| Error::Write {
            path,
            source: io::Error::new(io::ErrorKind::NotConnected, "log file handle is closed"),
        })
    }
}

async fn open_append(path: &Path) -> Result<File> {
    let open_error = |source| Error::Open {
        path: path.to_path_buf(),
        source,
    };

    // Opening a directory for append fails with a bare EISDIR
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => return Err(Error::NotAFile(path.to_path_buf())),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(open_error(e)),
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(open_error)
}

fn spawn_idle_timer(shared: Arc<Shared>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let deadline = *shared.deadline.lock();
            tokio::time::sleep_until(deadline).await;

            let mut slot = shared.slot.lock().await;

            // Re-armed while asleep or while a lease was held
            if Instant::now() < *shared.deadline.lock() {
                continue;
            }

            match slot.as_ref() {
                Some(open) if open.generation == generation => {}
                _ => return,
            }

            if let Some(mut open) = slot.take() {
                if let Err(e) = open.file.flush().await {
                    warn!("failed to flush {} on idle close: {e}", open.path.display());
                }
                debug!(generation, "closed idle log file");
            }
            shared.set_state(HandleState::Closed);
            return;
        }
    })
}
