//! Background store writer: bounded channel, dedicated writer thread.
//!
//! The dispatch path must never block on sqlite, so stores go through a
//! fire-and-forget [`StoreHandle`] into a thread that owns the connection.

use std::thread::JoinHandle;

use chrono::Utc;
use crossbeam_channel::{Sender, TrySendError, bounded};
use tracing::{debug, warn};

use st_core::{ItemSnapshot, StoredItemLocation, UniqueItemSink};

use crate::Database;

/// Capacity of the writer's command channel.
pub const WRITER_QUEUE_CAPACITY: usize = 1024;

enum StoreCommand {
    Store(Box<(ItemSnapshot, StoredItemLocation)>),
    Shutdown,
}

/// Cloneable producer handle into the writer thread.
#[derive(Clone)]
pub struct StoreHandle {
    tx: Sender<StoreCommand>,
}

impl UniqueItemSink for StoreHandle {
    fn queue_store_item(&self, item: &ItemSnapshot, location: &StoredItemLocation) {
        let command = StoreCommand::Store(Box::new((item.clone(), location.clone())));
        match self.tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("store writer queue full, dropping item");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("store writer gone, dropping item");
            }
        }
    }
}

/// Owns the writer thread; dropping it flushes and joins.
pub struct StoreWriter {
    handle: StoreHandle,
    thread: Option<JoinHandle<()>>,
}

impl StoreWriter {
    /// Spawns the writer thread around an opened database.
    #[must_use]
    pub fn spawn(mut db: Database) -> Self {
        let (tx, rx) = bounded(WRITER_QUEUE_CAPACITY);
        let thread = std::thread::spawn(move || {
            while let Ok(command) = rx.recv() {
                match command {
                    StoreCommand::Store(boxed) => {
                        let (item, location) = &*boxed;
                        match db.insert_item(item, location, Utc::now()) {
                            Ok(true) => {}
                            Ok(false) => debug!(name = %item.name, "duplicate item ignored"),
                            Err(error) => warn!(%error, "failed to store item"),
                        }
                    }
                    StoreCommand::Shutdown => break,
                }
            }
        });
        Self {
            handle: StoreHandle { tx },
            thread: Some(thread),
        }
    }

    /// Returns a producer handle for the dispatch path.
    #[must_use]
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Flushes queued stores and stops the thread.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        if let Some(thread) = self.thread.take() {
            // A full queue means pending stores are drained before Shutdown
            // is seen; blocking send is fine off the dispatch path.
            let _ = self.handle.tx.send(StoreCommand::Shutdown);
            if thread.join().is_err() {
                warn!("store writer thread panicked");
            }
        }
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
