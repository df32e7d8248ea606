//! # Matchgate
//!
//! Library half of the Matchgate binary: the HTTP API and its configuration.
//! Exposed as a library so integration tests can build the router without
//! binding a socket.

pub mod api;
pub mod config;
