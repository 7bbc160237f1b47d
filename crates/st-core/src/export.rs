//! In-memory export queue.
//!
//! A bounded channel split into a producer half owned by the tracker on the
//! dispatch path and a consumer half drained by whoever serializes or
//! uploads. Enqueue never blocks; a full queue drops the item with a
//! warning. Channel semantics keep insertion order within one processing
//! pass intact.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::attribution::ExportSink;
use crate::types::ExportableItem;

/// Default queue capacity.
pub const DEFAULT_EXPORT_CAPACITY: usize = 1024;

/// Creates a bounded export queue, returning the producer and consumer
/// halves.
#[must_use]
pub fn export_queue(capacity: usize) -> (ExportQueue, ExportDrain) {
    let (tx, rx) = bounded(capacity);
    (ExportQueue { tx }, ExportDrain { rx })
}

/// Producer half of the export queue.
#[derive(Debug, Clone)]
pub struct ExportQueue {
    tx: Sender<ExportableItem>,
}

impl ExportSink for ExportQueue {
    fn enqueue(&self, item: ExportableItem) {
        match self.tx.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => {
                tracing::warn!(label = %item.location_label, "export queue full, dropping item");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("export queue consumer gone, dropping item");
            }
        }
    }
}

/// Consumer half of the export queue.
#[derive(Debug)]
pub struct ExportDrain {
    rx: Receiver<ExportableItem>,
}

impl ExportDrain {
    /// Takes everything currently queued, without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<ExportableItem> {
        self.rx.try_iter().collect()
    }

    /// Blocks until an item is available. Returns `None` once all producers
    /// are gone and the queue is empty.
    #[must_use]
    pub fn recv(&self) -> Option<ExportableItem> {
        self.rx.recv().ok()
    }
}
