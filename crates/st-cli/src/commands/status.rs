//! Implementation of the `stash status` command.

use anyhow::{Context, Result};

use st_db::Database;

use crate::config::Config;

/// Run the status command.
pub fn run(config: &Config) -> Result<()> {
    if !config.database_path.exists() {
        println!("no stash database at {}", config.database_path.display());
        return Ok(());
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    let total = db.count_items().context("failed to count items")?;
    println!("{total} unique items stored");

    for tally in db
        .items_by_container()
        .context("failed to tally containers")?
    {
        println!("  {}: {}", tally.container, tally.items);
    }
    Ok(())
}
