//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

pub mod check;
pub mod completions;
pub mod inspect;

pub use check::handle_check;
pub use completions::handle_completions;
pub use inspect::handle_inspect;
