//! Baby tracker CLI library.
//!
//! This crate provides the CLI interface for the baby tracker.

mod cli;
pub mod commands;
mod config;
pub mod sleep_timer;

pub use cli::{Cli, Commands, SleepAction};
pub use config::Config;
