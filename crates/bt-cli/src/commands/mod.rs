//! CLI subcommand implementations.

pub mod export;
pub mod import;
pub mod log;
pub mod report;
pub mod sleep;
pub mod status;
pub mod timeline;
pub mod today;
pub mod util;
