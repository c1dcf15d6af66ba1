//! Domain services orchestrating the record store

mod booking;
mod chat;
mod inventory;
mod ledger;
mod passenger;
mod photographer;
mod slots;

pub use booking::{BookingService, Refund, Reservation};
pub use chat::ChatService;
pub use inventory::{InventoryService, ItemUpdate};
pub use ledger::Ledger;
pub use passenger::PassengerDirectory;
pub use photographer::PhotographerRegistry;
pub use slots::SlotRegistry;
