//! Core types and the enrichment pipeline for the Roost tweet archive.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the record model, media normalisation, tweet enrichment, and the
//! [`ArchiveStore`](store::ArchiveStore) abstraction the other crates build on.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod enrich;
pub mod error;
pub mod gallery;
pub mod media;
pub mod page;
pub mod stats;
pub mod store;
pub mod text;
pub mod tweet;

pub use error::{Error, Result};
