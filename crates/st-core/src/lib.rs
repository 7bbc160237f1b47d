//! Core domain logic for the stash tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Location correlation: rolling interaction signals with a recency window
//! - Container classification: which window names hold real storage
//! - Attribution: turning slot batches into located, export-ready items
//! - The in-memory export queue between the dispatch path and consumers

pub mod attribution;
pub mod classify;
pub mod correlator;
pub mod event;
pub mod export;
pub mod types;

pub use attribution::{
    ChestTracker, DEFAULT_HOME_MAP, ExportSink, PLAYER_INVENTORY, SessionView, UniqueItemSink,
};
pub use classify::ContainerClassifier;
pub use correlator::{InteractionSignal, LocationCorrelator, RECENCY_WINDOW_MS, SignalKind};
pub use event::PacketEvent;
pub use export::{DEFAULT_EXPORT_CAPACITY, ExportDrain, ExportQueue, export_queue};
pub use types::{
    BlockPos, ContainerSnapshot, ExportableItem, ItemSnapshot, OpenContainer, ProfileId,
    StoredItemLocation, ValidationError,
};
