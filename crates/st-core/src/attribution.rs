//! Item attribution: from raw slot batches to located, export-ready items.
//!
//! One [`ChestTracker`] lives per client session. Location events keep the
//! correlator current; item events trigger a single terminal processing
//! pass that gates admission, splits container slots from player-inventory
//! slots, attributes a location, and dispatches to the two sinks. Every
//! rejection is a silent no-op: the event stream is lossy by design and a
//! missed batch is re-observed on the next container interaction.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::classify::ContainerClassifier;
use crate::correlator::LocationCorrelator;
use crate::event::PacketEvent;
use crate::types::{
    ContainerSnapshot, ExportableItem, ItemSnapshot, ProfileId, StoredItemLocation,
};

/// Label and container name used for slots past the non-player boundary.
pub const PLAYER_INVENTORY: &str = "Player Inventory";

/// Default map name on which durable export is allowed.
pub const DEFAULT_HOME_MAP: &str = "Private Island";

/// The session/world query surface the tracker reads at processing time.
///
/// Implemented by the host integration in production and by fixtures in
/// tests, so synthetic event sequences can be replayed without a real
/// dispatch bus.
pub trait SessionView {
    /// The owning profile, when known.
    fn profile_id(&self) -> Option<ProfileId>;

    /// The last known map/world name.
    fn last_map(&self) -> Option<String>;

    /// Whether the player is currently on their own island.
    fn on_own_island(&self) -> bool;

    /// The currently open container window, if any.
    fn open_container(&self) -> Option<crate::types::OpenContainer>;

    /// Whether the export subsystem is enabled at all.
    fn export_enabled(&self) -> bool;

    /// Whether an export session is currently active.
    fn is_exporting(&self) -> bool;

    /// Whether the always-export policy is active.
    fn always_export(&self) -> bool;
}

/// Durable unique-item store. Fire-and-forget; deduplication happens
/// downstream.
pub trait UniqueItemSink {
    fn queue_store_item(&self, item: &ItemSnapshot, location: &StoredItemLocation);
}

/// In-memory export queue sink.
pub trait ExportSink {
    fn enqueue(&self, item: ExportableItem);
}

/// Tracks container interactions and attributes observed items.
#[derive(Debug)]
pub struct ChestTracker<S, U, E> {
    correlator: LocationCorrelator,
    classifier: ContainerClassifier,
    home_map: String,
    session: S,
    store: U,
    exports: E,
}

impl<S, U, E> ChestTracker<S, U, E>
where
    S: SessionView,
    U: UniqueItemSink,
    E: ExportSink,
{
    pub fn new(session: S, store: U, exports: E) -> Self {
        Self {
            correlator: LocationCorrelator::new(),
            classifier: ContainerClassifier::new(),
            home_map: DEFAULT_HOME_MAP.to_string(),
            session,
            store,
            exports,
        }
    }

    /// Overrides the map name on which exports are admitted.
    #[must_use]
    pub fn with_home_map(mut self, home_map: impl Into<String>) -> Self {
        self.home_map = home_map.into();
        self
    }

    /// Routes one typed event. Never fails; inadmissible events are
    /// silently dropped.
    pub fn handle_event(&mut self, event: &PacketEvent, now: DateTime<Utc>) {
        match event {
            PacketEvent::BlockUpdate {
                pos,
                container: true,
            } => self.correlator.record_block_update(*pos, now),
            PacketEvent::BlockRightClick {
                pos,
                container: true,
            } => self.correlator.record_block_right_click(*pos, now),
            PacketEvent::EntityInteract { pos: Some(pos) } => {
                self.correlator.record_entity_right_click(*pos, now);
            }
            PacketEvent::SetSlot {
                window_id,
                slot,
                item,
            } => self.process(*window_id, Some(*slot), std::slice::from_ref(item), now),
            PacketEvent::SetItems { window_id, items } => {
                self.process(*window_id, None, items, now);
            }
            // Non-container blocks and unresolved entities carry no signal.
            _ => {}
        }
    }

    /// Admission gates, then one processing pass over the item batch.
    fn process(
        &self,
        window_id: i32,
        single_slot: Option<usize>,
        items: &[Option<ItemSnapshot>],
        now: DateTime<Utc>,
    ) {
        let Some(profile) = self.session.profile_id() else {
            trace!("no profile id yet, dropping batch");
            return;
        };
        if !self.session.export_enabled() {
            trace!("export subsystem disabled, dropping batch");
            return;
        }
        let Some(open) = self.session.open_container() else {
            trace!("no open container, dropping batch");
            return;
        };
        if open.window_id != window_id {
            trace!(
                event_window = window_id,
                open_window = open.window_id,
                "stale window id, dropping batch"
            );
            return;
        }
        // A single-slot update past the boundary is a player-inventory
        // change, pure noise for container attribution.
        if single_slot.is_some_and(|slot| slot >= open.non_player_slots) {
            return;
        }

        let snapshot = ContainerSnapshot {
            window_id,
            name: open.name,
            non_player_slots: open.non_player_slots,
            slots: items.to_vec(),
        };
        self.process_snapshot(&snapshot, &profile, now);
    }

    fn process_snapshot(
        &self,
        snapshot: &ContainerSnapshot,
        profile: &ProfileId,
        now: DateTime<Utc>,
    ) {
        let Some(map) = self.session.last_map() else {
            trace!("map unknown, dropping batch");
            return;
        };
        if !map.eq_ignore_ascii_case(&self.home_map) {
            trace!(%map, "not on home map, dropping batch");
            return;
        }
        // One check covers the whole batch; batches are per-container.
        if !self.classifier.is_exportable(&snapshot.name) {
            trace!(container = %snapshot.name, "container not exportable");
            return;
        }

        let furniture = self.classifier.is_furniture_chest(&snapshot.name);
        let pos = self.correlator.resolve(furniture, now);

        let base_label = pos.map_or_else(
            || snapshot.name.clone(),
            |p| format!("{} @ {} on {}", snapshot.name, p, map),
        );
        let base_location = StoredItemLocation {
            profile: profile.clone(),
            container: snapshot.name.clone(),
            pos,
        };

        let store_durably = self.session.always_export() && self.session.on_own_island();
        let exporting = self.session.is_exporting();

        for (index, item) in snapshot.slots.iter().enumerate() {
            let Some(item) = item else { continue };

            let (label, location) = if index >= snapshot.non_player_slots {
                (
                    PLAYER_INVENTORY.to_string(),
                    StoredItemLocation {
                        profile: profile.clone(),
                        container: PLAYER_INVENTORY.to_string(),
                        pos: None,
                    },
                )
            } else {
                (base_label.clone(), base_location.clone())
            };

            if store_durably {
                self.store.queue_store_item(item, &location);
            }
            if exporting {
                self.exports.enqueue(ExportableItem {
                    location_label: label,
                    item: item.clone(),
                    profile: profile.clone(),
                    observed_at: now,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::TimeZone;

    use super::*;
    use crate::types::{BlockPos, OpenContainer};

    #[derive(Debug, Clone)]
    struct FakeSession {
        profile: Option<&'static str>,
        map: Option<&'static str>,
        own_island: bool,
        export_enabled: bool,
        exporting: bool,
        always_export: bool,
        container: Option<OpenContainer>,
    }

    impl Default for FakeSession {
        fn default() -> Self {
            Self {
                profile: Some("profile-1"),
                map: Some("Private Island"),
                own_island: true,
                export_enabled: true,
                exporting: true,
                always_export: true,
                container: Some(OpenContainer {
                    window_id: 7,
                    name: "Large Chest".into(),
                    non_player_slots: 27,
                }),
            }
        }
    }

    impl SessionView for FakeSession {
        fn profile_id(&self) -> Option<ProfileId> {
            self.profile.and_then(|p| ProfileId::new(p).ok())
        }

        fn last_map(&self) -> Option<String> {
            self.map.map(String::from)
        }

        fn on_own_island(&self) -> bool {
            self.own_island
        }

        fn open_container(&self) -> Option<OpenContainer> {
            self.container.clone()
        }

        fn export_enabled(&self) -> bool {
            self.export_enabled
        }

        fn is_exporting(&self) -> bool {
            self.exporting
        }

        fn always_export(&self) -> bool {
            self.always_export
        }
    }

    #[derive(Debug, Default, Clone)]
    struct RecordingStore {
        stored: Rc<RefCell<Vec<(ItemSnapshot, StoredItemLocation)>>>,
    }

    impl UniqueItemSink for RecordingStore {
        fn queue_store_item(&self, item: &ItemSnapshot, location: &StoredItemLocation) {
            self.stored
                .borrow_mut()
                .push((item.clone(), location.clone()));
        }
    }

    #[derive(Debug, Default, Clone)]
    struct RecordingExports {
        items: Rc<RefCell<Vec<ExportableItem>>>,
    }

    impl ExportSink for RecordingExports {
        fn enqueue(&self, item: ExportableItem) {
            self.items.borrow_mut().push(item);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn ms(offset: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds(offset)
    }

    fn item(name: &str) -> Option<ItemSnapshot> {
        Some(ItemSnapshot {
            uuid: None,
            name: name.into(),
            count: 1,
            data: serde_json::Value::Null,
        })
    }

    fn make_tracker(
        session: FakeSession,
    ) -> (
        ChestTracker<FakeSession, RecordingStore, RecordingExports>,
        RecordingStore,
        RecordingExports,
    ) {
        let store = RecordingStore::default();
        let exports = RecordingExports::default();
        let tracker = ChestTracker::new(session, store.clone(), exports.clone());
        (tracker, store, exports)
    }

    fn set_items(window_id: i32, items: Vec<Option<ItemSnapshot>>) -> PacketEvent {
        PacketEvent::SetItems { window_id, items }
    }

    #[test]
    fn fresh_block_update_attaches_coordinates_to_container_slots() {
        let (mut tracker, store, exports) = make_tracker(FakeSession::default());

        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(10, 64, 20),
                container: true,
            },
            ms(0),
        );
        tracker.handle_event(&set_items(7, vec![item("Hyperion"), None, item("Terminator")]), ms(100));

        let stored = store.stored.borrow();
        assert_eq!(stored.len(), 2);
        for (_, location) in stored.iter() {
            assert_eq!(location.pos, Some(BlockPos::new(10, 64, 20)));
            assert_eq!(location.container, "Large Chest");
        }

        let exported = exports.items.borrow();
        assert_eq!(exported.len(), 2);
        assert_eq!(
            exported[0].location_label,
            "Large Chest @ 10,64,20 on Private Island"
        );
    }

    #[test]
    fn furniture_chest_resolves_from_entity_signal() {
        let session = FakeSession {
            container: Some(OpenContainer {
                window_id: 7,
                name: "Fancy Chest".into(),
                non_player_slots: 27,
            }),
            ..FakeSession::default()
        };
        let (mut tracker, store, _exports) = make_tracker(session);

        // A much fresher block update must be ignored for furniture.
        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(10, 64, 20),
                container: true,
            },
            ms(100),
        );
        tracker.handle_event(&PacketEvent::EntityInteract { pos: Some(BlockPos::new(5, 70, 5)) }, ms(800));
        tracker.handle_event(&set_items(7, vec![item("Lamp")]), ms(1_000));

        let stored = store.stored.borrow();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.pos, Some(BlockPos::new(5, 70, 5)));
    }

    #[test]
    fn stale_signals_yield_absent_coordinates_and_bare_label() {
        let (mut tracker, store, exports) = make_tracker(FakeSession::default());

        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(10, 64, 20),
                container: true,
            },
            ms(0),
        );
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(500));

        assert_eq!(store.stored.borrow()[0].1.pos, None);
        assert_eq!(exports.items.borrow()[0].location_label, "Large Chest");
    }

    #[test]
    fn recipe_container_produces_zero_enqueues() {
        let session = FakeSession {
            container: Some(OpenContainer {
                window_id: 7,
                name: "Crafting Recipe".into(),
                non_player_slots: 27,
            }),
            ..FakeSession::default()
        };
        let (mut tracker, store, exports) = make_tracker(session);

        tracker.handle_event(&set_items(7, vec![item("Bait"), item("Hook")]), ms(0));

        assert!(store.stored.borrow().is_empty());
        assert!(exports.items.borrow().is_empty());
    }

    #[test]
    fn slots_past_boundary_are_player_inventory() {
        let session = FakeSession {
            container: Some(OpenContainer {
                window_id: 7,
                name: "Large Chest".into(),
                non_player_slots: 27,
            }),
            ..FakeSession::default()
        };
        let (mut tracker, store, exports) = make_tracker(session);

        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(10, 64, 20),
                container: true,
            },
            ms(0),
        );
        let mut slots: Vec<Option<ItemSnapshot>> = vec![None; 31];
        slots[30] = item("Pickaxe");
        tracker.handle_event(&set_items(7, slots), ms(100));

        let stored = store.stored.borrow();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.container, PLAYER_INVENTORY);
        assert_eq!(stored[0].1.pos, None);

        let exported = exports.items.borrow();
        assert_eq!(exported[0].location_label, PLAYER_INVENTORY);
    }

    #[test]
    fn admission_gates_drop_everything() {
        let base = FakeSession::default();
        let gates = [
            FakeSession {
                profile: None,
                ..base.clone()
            },
            FakeSession {
                export_enabled: false,
                ..base.clone()
            },
            FakeSession {
                container: None,
                ..base.clone()
            },
            FakeSession {
                map: Some("Hub"),
                ..base.clone()
            },
            FakeSession {
                map: None,
                ..base.clone()
            },
        ];

        for session in gates {
            let (mut tracker, store, exports) = make_tracker(session);
            tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(0));
            assert!(store.stored.borrow().is_empty());
            assert!(exports.items.borrow().is_empty());
        }
    }

    #[test]
    fn stale_window_id_is_discarded() {
        let (mut tracker, store, exports) = make_tracker(FakeSession::default());
        tracker.handle_event(&set_items(6, vec![item("Rock")]), ms(0));

        assert!(store.stored.borrow().is_empty());
        assert!(exports.items.borrow().is_empty());
    }

    #[test]
    fn single_slot_update_past_boundary_is_noise() {
        let (mut tracker, store, exports) = make_tracker(FakeSession::default());

        tracker.handle_event(
            &PacketEvent::SetSlot {
                window_id: 7,
                slot: 30,
                item: item("Pickaxe"),
            },
            ms(0),
        );
        assert!(store.stored.borrow().is_empty());
        assert!(exports.items.borrow().is_empty());

        // A container slot is processed.
        tracker.handle_event(
            &PacketEvent::SetSlot {
                window_id: 7,
                slot: 3,
                item: item("Pickaxe"),
            },
            ms(10),
        );
        assert_eq!(store.stored.borrow().len(), 1);
    }

    #[test]
    fn dispatches_are_independent() {
        // always_export off, exporting on: only the export queue fires.
        let session = FakeSession {
            always_export: false,
            ..FakeSession::default()
        };
        let (mut tracker, store, exports) = make_tracker(session);
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(0));
        assert!(store.stored.borrow().is_empty());
        assert_eq!(exports.items.borrow().len(), 1);

        // always_export on but off-island, exporting off: neither fires.
        let session = FakeSession {
            own_island: false,
            exporting: false,
            ..FakeSession::default()
        };
        let (mut tracker, store, exports) = make_tracker(session);
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(0));
        assert!(store.stored.borrow().is_empty());
        assert!(exports.items.borrow().is_empty());

        // Both on: both fire.
        let (mut tracker, store, exports) = make_tracker(FakeSession::default());
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(0));
        assert_eq!(store.stored.borrow().len(), 1);
        assert_eq!(exports.items.borrow().len(), 1);
    }

    #[test]
    fn processing_is_idempotent_for_identical_state() {
        let (mut tracker, store, _exports) = make_tracker(FakeSession::default());
        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(1, 2, 3),
                container: true,
            },
            ms(0),
        );

        let batch = set_items(7, vec![item("Rock"), item("Stick")]);
        tracker.handle_event(&batch, ms(100));
        tracker.handle_event(&batch, ms(100));

        let stored = store.stored.borrow();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].1, stored[2].1);
        assert_eq!(stored[1].1, stored[3].1);
    }

    #[test]
    fn home_map_comparison_is_case_insensitive() {
        let session = FakeSession {
            map: Some("private island"),
            ..FakeSession::default()
        };
        let (mut tracker, store, _exports) = make_tracker(session);
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(0));
        assert_eq!(store.stored.borrow().len(), 1);
    }

    #[test]
    fn non_container_blocks_leave_correlator_untouched() {
        let (mut tracker, store, _exports) = make_tracker(FakeSession::default());
        tracker.handle_event(
            &PacketEvent::BlockUpdate {
                pos: BlockPos::new(9, 9, 9),
                container: false,
            },
            ms(0),
        );
        tracker.handle_event(&set_items(7, vec![item("Rock")]), ms(100));

        assert_eq!(store.stored.borrow()[0].1.pos, None);
    }
}
