//! Cache operations, implemented directly on the `Cache` type

mod batch;
mod clear;
mod convenience;
mod file;
mod get;
mod metadata_ops;
mod object;
mod observe;
mod put;
mod query;
mod remove;
mod stats;
mod validate;
