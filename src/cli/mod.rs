//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the audit library.

pub mod diff;
pub mod history;

pub use diff::{handle_diff_command, DiffArgs};
pub use history::{handle_history_command, HistoryArgs};
