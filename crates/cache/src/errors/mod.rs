//! Error handling for the cache engine
//!
//! Store-level functions return [`Result`]; the engine boundary logs these
//! errors and converts them into absence or `false` so cache misses are never
//! fatal to callers.

mod conversions;
mod recovery;
mod types;

pub use types::*;
