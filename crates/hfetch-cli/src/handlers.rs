//! Command handlers for CLI subcommands
//!
//! Each handler writes its result to the supplied writer and reports
//! failures as [`crate::error::Error`].

mod check;
mod completions;
mod get;
mod send;
mod usage;
pub mod utils;

pub use check::handle_check;
pub use completions::handle_completions;
pub use get::handle_get;
pub use send::handle_send;
pub use usage::print_usage;
