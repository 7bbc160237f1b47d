//! Location correlation across independent interaction signals.
//!
//! Slot updates carry no position, so the tracker keeps the last known
//! coordinates of three independent signals — server block updates, block
//! right-clicks, and entity interactions — and at processing time picks the
//! one the routing policy trusts, gated by a fixed recency window.

use chrono::{DateTime, Utc};

use crate::types::BlockPos;

/// Signals older than this are considered stale and untrustworthy for
/// location attribution.
pub const RECENCY_WINDOW_MS: i64 = 500;

/// The last known coordinates and time of one interaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionSignal {
    pub pos: BlockPos,
    pub at: DateTime<Utc>,
}

/// The three interaction kinds the correlator tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    BlockUpdate,
    BlockRightClick,
    EntityRightClick,
}

/// Resolution route for regular containers.
///
/// Block updates are the most reliable signal (the server explicitly
/// confirms container identity at a position) but may never arrive for
/// already-loaded chunks, so a stale block update falls back to the
/// always-available right-click proxy. The fallback triggers on the
/// block-update signal's age alone, not on which signal is fresher;
/// downstream behavior depends on this bias toward block updates.
const BLOCK_ROUTE: &[SignalKind] = &[SignalKind::BlockUpdate, SignalKind::BlockRightClick];

/// Resolution route for furniture chests: decorative chest-styled objects
/// with no block form, reachable only through entity interaction.
const FURNITURE_ROUTE: &[SignalKind] = &[SignalKind::EntityRightClick];

/// Rolling last-known state for the three interaction signals.
///
/// Mutated only from the event-dispatch path; one instance per session.
#[derive(Debug, Default)]
pub struct LocationCorrelator {
    block_update: Option<InteractionSignal>,
    block_right_click: Option<InteractionSignal>,
    entity_right_click: Option<InteractionSignal>,
}

impl LocationCorrelator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a server block update at `pos`. Unconditional overwrite.
    pub fn record_block_update(&mut self, pos: BlockPos, now: DateTime<Utc>) {
        self.block_update = Some(InteractionSignal { pos, at: now });
    }

    /// Records a block right-click at `pos`. Unconditional overwrite.
    pub fn record_block_right_click(&mut self, pos: BlockPos, now: DateTime<Utc>) {
        self.block_right_click = Some(InteractionSignal { pos, at: now });
    }

    /// Records an entity interaction at `pos`. Unconditional overwrite.
    pub fn record_entity_right_click(&mut self, pos: BlockPos, now: DateTime<Utc>) {
        self.entity_right_click = Some(InteractionSignal { pos, at: now });
    }

    /// Resolves the best-guess container coordinates at instant `now`.
    ///
    /// Walks the route for the container class in order, stopping at the
    /// first signal within the recency window; the final route entry stands
    /// regardless of age. The chosen signal's coordinates are returned only
    /// if it is strictly inside the window, otherwise `None` — absent, not
    /// stale.
    #[must_use]
    pub fn resolve(&self, furniture: bool, now: DateTime<Utc>) -> Option<BlockPos> {
        let route = if furniture {
            FURNITURE_ROUTE
        } else {
            BLOCK_ROUTE
        };

        let mut chosen = None;
        for kind in route {
            chosen = self.signal(*kind);
            if chosen.is_some_and(|signal| age_ms(signal.at, now) <= RECENCY_WINDOW_MS) {
                break;
            }
        }

        let signal = chosen?;
        if age_ms(signal.at, now) < RECENCY_WINDOW_MS {
            Some(signal.pos)
        } else {
            None
        }
    }

    const fn signal(&self, kind: SignalKind) -> Option<InteractionSignal> {
        match kind {
            SignalKind::BlockUpdate => self.block_update,
            SignalKind::BlockRightClick => self.block_right_click,
            SignalKind::EntityRightClick => self.entity_right_click,
        }
    }
}

fn age_ms(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - at).num_milliseconds()
}
