//! File-backed save data
//!
//! Features:
//! - One JSON file per concern (progress, player stats, achievements)
//! - In-process cache, written through on every mutation
//! - Atomic replace (tmp → save)
//! - Fail-soft: corrupt or missing files fall back to defaults

mod error;
mod store;

pub use error::SaveError;
pub use store::{Progress, SaveStore, read_json, write_json};
