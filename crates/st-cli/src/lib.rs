//! CLI for replaying captured session logs through the item tracker.

pub mod cli;
pub mod commands;
pub mod config;
pub mod session;

pub use cli::{Cli, Commands};
pub use config::Config;
