//! Core types and trait definitions for the CHURCHOS access layer.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! role hierarchy lives here as pure functions; the identity provider and the
//! principal store are traits implemented elsewhere.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod error;
pub mod identity;
pub mod principal;
pub mod role;
pub mod store;

pub use error::{Error, Result};
