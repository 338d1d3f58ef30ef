//! In-memory key/value store with per-key advisory locks over HTTP.
//!
//! Every key has at most one live lock at a time, identified by an opaque
//! lock id minted at acquisition. Writers that do not hold a key's lock
//! wait for the current holder; reservations take the lock and read the
//! current value in one step. All state lives in memory and is lost on
//! restart.

#![warn(missing_docs)]

/// Environment-driven server configuration.
pub mod config;
/// HTTP surface: router and handlers.
pub mod server;
/// Shared application state for HTTP handlers.
pub mod state;
/// The lock-coordinated store.
pub mod store;
