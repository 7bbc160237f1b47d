//! Typed packet events consumed by the tracker.
//!
//! Raw packet decoding happens upstream in the host; by the time events
//! reach this crate they are already typed. The same shape is used as the
//! wire format of captured replay logs.

use serde::{Deserialize, Serialize};

use crate::types::{BlockPos, ItemSnapshot};

/// A typed event from the client session's dispatch path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PacketEvent {
    /// The server set a single slot in the open window.
    SetSlot {
        window_id: i32,
        slot: usize,
        item: Option<ItemSnapshot>,
    },
    /// The server set the full slot contents of the open window.
    SetItems {
        window_id: i32,
        items: Vec<Option<ItemSnapshot>>,
    },
    /// The server confirmed a block state at a position.
    ///
    /// `container` is resolved by the host: whether the block is a
    /// container-bearing world object. Non-container updates are ignored.
    BlockUpdate { pos: BlockPos, container: bool },
    /// The player right-clicked a block.
    BlockRightClick { pos: BlockPos, container: bool },
    /// The player interacted with an entity. `pos` is `None` when the
    /// host could not resolve the entity.
    EntityInteract { pos: Option<BlockPos> },
}
