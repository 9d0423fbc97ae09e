//! Background persistence of canvas snapshots.
//!
//! Every mutation hands a full snapshot of the committed primitives to a
//! worker thread. The worker writes one snapshot at a time and, when several
//! are queued, only the newest one.

use crate::shapes::Primitive;
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

/// Commands sent to the save thread.
enum SaveCommand {
    Save(Vec<Primitive>),
    /// Reply once everything queued before this command is written.
    Flush(Sender<()>),
    Shutdown,
}

#[derive(Debug, Default)]
struct SaveCounters {
    written: AtomicUsize,
    failed: AtomicUsize,
}

/// Serializes canvas writes onto a background thread.
pub struct AutoSaver {
    key: String,
    commands: Sender<SaveCommand>,
    counters: Arc<SaveCounters>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("key", &self.key)
            .field("counters", &self.counters)
            .finish()
    }
}

impl AutoSaver {
    /// Start the save thread for the document stored under `key`.
    pub fn spawn<S: Storage + 'static>(storage: Arc<S>, key: impl Into<String>) -> StorageResult<Self> {
        let key = key.into();
        let (commands, receiver) = channel();
        let counters = Arc::new(SaveCounters::default());

        let worker = {
            let key = key.clone();
            let counters = counters.clone();
            thread::Builder::new()
                .name("ucanvas-autosave".to_string())
                .spawn(move || run_worker(storage.as_ref(), &key, receiver, &counters))
                .map_err(|e| StorageError::Io(format!("Failed to start save thread: {}", e)))?
        };

        log::debug!("Autosave thread started for '{}'", key);
        Ok(Self {
            key,
            commands,
            counters,
            worker: Some(worker),
        })
    }

    /// Storage key snapshots are written under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a snapshot for writing. Never blocks.
    pub fn request_save(&self, primitives: Vec<Primitive>) {
        if self.commands.send(SaveCommand::Save(primitives)).is_err() {
            log::error!("Autosave thread is gone; dropping snapshot for '{}'", self.key);
        }
    }

    /// Block until every snapshot queued so far has been handled.
    ///
    /// Returns false if the save thread is no longer running.
    pub fn flush(&self) -> bool {
        let (done, wait) = channel();
        if self.commands.send(SaveCommand::Flush(done)).is_err() {
            return false;
        }
        wait.recv().is_ok()
    }

    /// Number of snapshots written successfully.
    pub fn written(&self) -> usize {
        self.counters.written.load(Ordering::SeqCst)
    }

    /// Number of writes that failed.
    pub fn failed(&self) -> usize {
        self.counters.failed.load(Ordering::SeqCst)
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        let _ = self.commands.send(SaveCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Autosave thread for '{}' panicked", self.key);
            }
        }
    }
}

fn run_worker<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    receiver: Receiver<SaveCommand>,
    counters: &SaveCounters,
) {
    let mut waiters: Vec<Sender<()>> = Vec::new();

    while let Ok(command) = receiver.recv() {
        let mut latest = None;
        let mut shutdown = false;

        match command {
            SaveCommand::Save(primitives) => latest = Some(primitives),
            SaveCommand::Flush(done) => waiters.push(done),
            SaveCommand::Shutdown => shutdown = true,
        }

        // Coalesce whatever else is already queued; newest snapshot wins.
        if !shutdown {
            while let Ok(next) = receiver.try_recv() {
                match next {
                    SaveCommand::Save(primitives) => {
                        if latest.is_some() {
                            log::debug!("Coalescing queued snapshot for '{}'", key);
                        }
                        latest = Some(primitives);
                    }
                    SaveCommand::Flush(done) => waiters.push(done),
                    SaveCommand::Shutdown => {
                        shutdown = true;
                        break;
                    }
                }
            }
        }

        if let Some(primitives) = latest {
            match pollster::block_on(storage.save(key, &primitives)) {
                Ok(()) => {
                    counters.written.fetch_add(1, Ordering::SeqCst);
                    log::info!("Saved {} primitive(s) to '{}'", primitives.len(), key);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    log::error!("Failed to save '{}': {}", key, e);
                }
            }
        }

        for done in waiters.drain(..) {
            let _ = done.send(());
        }

        if shutdown {
            break;
        }
    }

    log::debug!("Autosave thread for '{}' exiting", key);
}

/// Load the document under `key`, falling back to an empty canvas.
///
/// Missing documents are expected on first launch; unreadable ones are
/// logged and ignored.
pub fn load_or_default<S: Storage + ?Sized>(storage: &S, key: &str) -> Vec<Primitive> {
    match pollster::block_on(storage.load(key)) {
        Ok(primitives) => {
            log::info!("Loaded {} primitive(s) from '{}'", primitives.len(), key);
            primitives
        }
        Err(StorageError::NotFound(_)) => {
            log::info!("No saved canvas under '{}', starting empty", key);
            Vec::new()
        }
        Err(e) => {
            log::warn!("Could not load '{}', starting empty: {}", key, e);
            Vec::new()
        }
    }
}
