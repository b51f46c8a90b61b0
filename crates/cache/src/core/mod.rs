//! The cache engine
//!
//! [`Cache`] coordinates the disk stores, the memory layer and the change
//! notifier. Its operations are split across `impl Cache` blocks by concern.
//! Every public operation absorbs store errors: failures are logged and
//! reported as absence, `false` or zero.

pub(crate) mod internal;

mod builder;
mod cleanup;
mod locks;
mod operations;
mod types;

pub use cleanup::{CleanupScheduler, CleanupStatus, ExpirySweep, RetryPolicy};
pub use types::Cache;

#[cfg(test)]
mod tests;
