//! Shared utility functions.
//!
//! - Best-effort file and directory copies
//! - Owner-only permission restriction for key material

mod file_ops;

pub use file_ops::{CopyOutcome, copy_best_effort, restrict_to_owner};
