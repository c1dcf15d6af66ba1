//! 🏗 Infrastructure for handling requests, etc.
#![warn(missing_docs)]

use std::path::PathBuf;

mod model;
mod request;
mod response;

pub use model::{
    Booking, BookingId, BookingStatus, CancellationRefund, ChatMessage, Credits, InventoryItem,
    ItemId, Passenger, PassengerId, Photographer, PhotographerId, RoleTag, Slot, SlotId, Tier,
    UnknownRole, UnknownTier, UserRole,
};
pub use request::{
    dispatch_line, parse_envelope, ActionKind, ProtocolError, RawRequest, Request,
    RequestHandler,
};
pub use response::{Response, Status, GENERIC_ERROR};

/// Default port of the reservation server
pub const DEFAULT_PORT: u16 = 5555;

/// Configuration of the reservation system
#[derive(Clone, Debug)]
pub struct Config {
    /// Address for the TCP listener to bind to
    pub host: String,
    /// Port for the TCP listener
    pub port: u16,
    /// Refund rule applied when a tier 3 booking is cancelled
    pub cancellation_refund: CancellationRefund,
    /// TOML file with passengers, slots, inventory and photographers to load
    /// at launch
    pub seed: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
            cancellation_refund: CancellationRefund::default(),
            seed: None,
        }
    }
}
