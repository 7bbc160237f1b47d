//! Implementation of the `stash replay` command.
//!
//! Reads a captured session log (JSONL), runs every packet through the
//! tracker, writes drained exportable items as JSONL to stdout, and
//! persists unique items to the local database via the store writer.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use st_core::{ChestTracker, ExportDrain, PacketEvent, export_queue};
use st_db::{Database, StoreWriter};

use crate::config::Config;
use crate::session::{SessionState, SharedSession};

/// One line of a captured session log.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayRecord {
    /// Full session-state update.
    Session(SessionState),
    /// A timestamped packet event.
    Packet(PacketRecord),
}

#[derive(Debug, Deserialize)]
struct PacketRecord {
    at: DateTime<Utc>,
    event: PacketEvent,
}

/// Run the replay command.
pub fn run(config: &Config, input: &Path) -> Result<()> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let db = Database::open(&config.database_path).context("failed to open database")?;
    let writer = StoreWriter::spawn(db);

    let (queue, drain) = export_queue(config.export_queue_capacity);
    let session = SharedSession::default();
    let mut tracker = ChestTracker::new(session.clone(), writer.handle(), queue)
        .with_home_map(&config.home_map);

    let file = File::open(input)
        .with_context(|| format!("failed to open session log: {}", input.display()))?;
    let reader = BufReader::new(file);

    let out = stdout();
    let mut out = BufWriter::new(out.lock());

    let mut packets = 0_usize;
    let mut exported = 0_usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("failed to read session log")?;
        if line.trim().is_empty() {
            continue;
        }
        // A malformed record must not kill the replay loop.
        let record: ReplayRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(error) => {
                warn!(line = line_no + 1, %error, "skipping malformed record");
                continue;
            }
        };
        match record {
            ReplayRecord::Session(state) => session.replace(state),
            ReplayRecord::Packet(packet) => {
                packets += 1;
                tracker.handle_event(&packet.event, packet.at);
            }
        }
        exported += write_exports(&drain, &mut out)?;
    }

    // Tracker holds the queue producer; drop it so the final drain sees
    // everything.
    drop(tracker);
    exported += write_exports(&drain, &mut out)?;
    out.flush().context("failed to flush stdout")?;

    // Blocks until queued stores hit the database.
    writer.shutdown();

    eprintln!("replayed {packets} packets, exported {exported} items");
    Ok(())
}

/// Writes everything currently queued as JSONL. Broken pipes (e.g. piping
/// into `head`) end the output quietly.
fn write_exports(drain: &ExportDrain, out: &mut impl Write) -> Result<usize> {
    let mut written = 0_usize;
    for item in drain.drain() {
        serde_json::to_writer(&mut *out, &item).context("failed to serialize export")?;
        if writeln!(out).is_err() {
            break;
        }
        written += 1;
    }
    Ok(written)
}
