//! Plain-text time log CLI library.
//!
//! This crate provides the `tl` command-line interface on top of `tl-store`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
