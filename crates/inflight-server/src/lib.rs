//! TCP front end of the reservation system
//!
//! Clients talk newline-delimited JSON over long-lived connections. Every
//! accepted connection is served by its own OS thread until the peer hangs
//! up.

#![warn(missing_docs)]

mod connection;
mod listener;

pub use connection::MAX_LINE_LEN;
pub use listener::{Server, ServerHandle};
