//! Core types and trait definitions for the Sodan household registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contribution;
pub mod credential;
pub mod error;
pub mod event;
pub mod household;
pub mod normalize;
pub mod notify;
pub mod person;
pub mod staff;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
