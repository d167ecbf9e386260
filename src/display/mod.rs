//! Display formatting for terminal output
//!
//! Provides utilities for formatting audit histories for terminal display.

pub mod history;

pub use history::{entry_time, format_history, format_step, format_timestamp};
