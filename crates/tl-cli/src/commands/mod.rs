//! CLI subcommand implementations.

pub mod add;
pub mod log;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
pub mod tags;
pub mod util;
