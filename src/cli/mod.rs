//! Command-line interface definitions.
//!
//! - `Cli`, `Commands`: argument definitions via clap
//! - `Display`: terminal output with a palette fixed at startup

mod commands;
mod display;

pub use commands::{Cli, Commands, OutputFormat};
pub use display::Display;
