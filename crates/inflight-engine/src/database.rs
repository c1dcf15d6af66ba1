//! In-memory implementation of the record store

use std::collections::BTreeMap;

use inflight_core::{
    Booking, BookingId, BookingStatus, ChatMessage, Credits, InventoryItem, ItemId, Passenger,
    PassengerId, Photographer, PhotographerId, Slot, SlotId, UserRole,
};
use parking_lot::RwLock;

use crate::store::{NewBooking, NewItem, NewPassenger, RecordStore, StoreError, StoreResult};

/// Rows of one entity, keyed by id
struct Table<T> {
    name: &'static str,
    rows: BTreeMap<u32, T>,
    /// Ids are never reused, even after a delete
    next_id: u32,
}

impl<T: Clone> Table<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(u32) -> T) -> StoreResult<T> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted { table: self.name })?;
        let row = build(id);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn get(&self, id: u32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| pred(row)).cloned()
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| pred(row)).cloned().collect()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn update(&mut self, id: u32, apply: impl FnOnce(&mut T)) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => {
                apply(row);
                true
            }
            None => false,
        }
    }
}

/// Implementation of the central database
///
/// Each table sits behind its own lock, so a single call is atomic but
/// nothing spans two calls.
pub struct Database {
    passengers: RwLock<Table<Passenger>>,
    slots: RwLock<Table<Slot>>,
    bookings: RwLock<Table<Booking>>,
    items: RwLock<Table<InventoryItem>>,
    photographers: RwLock<Table<Photographer>>,
    /// Append-only, insertion order
    chat: RwLock<Vec<ChatMessage>>,
}

impl Database {
    /// Create a new, empty [`Database`].
    pub fn new() -> Self {
        Self {
            passengers: RwLock::new(Table::new("passengers")),
            slots: RwLock::new(Table::new("spacewalk_slots")),
            bookings: RwLock::new(Table::new("bookings")),
            items: RwLock::new(Table::new("inventory_item")),
            photographers: RwLock::new(Table::new("photographer")),
            chat: RwLock::new(Vec::new()),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for Database {
    fn insert_passenger(&self, passenger: NewPassenger) -> StoreResult<Passenger> {
        let mut table = self.passengers.write();
        if table
            .find(|p| p.username == passenger.username)
            .is_some()
        {
            return Err(StoreError::Duplicate {
                table: table.name,
                key: passenger.username,
            });
        }
        table.insert_with(|passenger_id| Passenger {
            passenger_id,
            username: passenger.username,
            password: passenger.password,
            nova_credits: passenger.nova_credits,
            checked_out: false,
        })
    }

    fn passenger(&self, id: PassengerId) -> StoreResult<Option<Passenger>> {
        Ok(self.passengers.read().get(id))
    }

    fn passenger_by_username(&self, username: &str) -> StoreResult<Option<Passenger>> {
        Ok(self.passengers.read().find(|p| p.username == username))
    }

    fn passengers(&self) -> StoreResult<Vec<Passenger>> {
        Ok(self.passengers.read().all())
    }

    fn set_nova_credits(&self, id: PassengerId, credits: Credits) -> StoreResult<bool> {
        Ok(self
            .passengers
            .write()
            .update(id, |p| p.nova_credits = credits))
    }

    fn set_passenger_checked_out(&self, id: PassengerId, checked_out: bool) -> StoreResult<bool> {
        Ok(self
            .passengers
            .write()
            .update(id, |p| p.checked_out = checked_out))
    }

    fn insert_slot(&self, slot_time: String) -> StoreResult<Slot> {
        self.slots.write().insert_with(|slot_id| Slot {
            slot_id,
            slot_time,
            available: true,
        })
    }

    fn slot(&self, id: SlotId) -> StoreResult<Option<Slot>> {
        Ok(self.slots.read().get(id))
    }

    fn slots(&self) -> StoreResult<Vec<Slot>> {
        Ok(self.slots.read().all())
    }

    fn set_slot_available(&self, id: SlotId, available: bool) -> StoreResult<bool> {
        Ok(self.slots.write().update(id, |s| s.available = available))
    }

    fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        self.bookings.write().insert_with(|booking_id| Booking {
            booking_id,
            passenger_id: booking.passenger_id,
            slot_id: booking.slot_id,
            tier: booking.tier,
            status: booking.status,
        })
    }

    fn booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().get(id))
    }

    fn bookings(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.bookings.read().all())
    }

    fn bookings_for_passenger(&self, passenger: PassengerId) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .filter(|b| b.passenger_id == passenger))
    }

    fn set_booking_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<bool> {
        Ok(self.bookings.write().update(id, |b| b.status = status))
    }

    fn delete_booking(&self, id: BookingId) -> StoreResult<bool> {
        Ok(self.bookings.write().rows.remove(&id).is_some())
    }

    fn append_chat(&self, message: ChatMessage) -> StoreResult<()> {
        self.chat.write().push(message);
        Ok(())
    }

    fn chat_between(&self, a: UserRole, b: UserRole) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .chat
            .read()
            .iter()
            .filter(|m| (m.sender == a && m.receiver == b) || (m.sender == b && m.receiver == a))
            .cloned()
            .collect())
    }

    fn insert_item(&self, item: NewItem) -> StoreResult<InventoryItem> {
        self.items.write().insert_with(|id| InventoryItem {
            id,
            name: item.name,
            condition: item.condition,
            available: item.available,
            owner_role: item.owner_role,
            checked_out: false,
        })
    }

    fn item(&self, id: ItemId) -> StoreResult<Option<InventoryItem>> {
        Ok(self.items.read().get(id))
    }

    fn items_by_role(&self, role: UserRole) -> StoreResult<Vec<InventoryItem>> {
        Ok(self.items.read().filter(|i| i.owner_role == role))
    }

    fn update_item(&self, item: &InventoryItem) -> StoreResult<bool> {
        Ok(self.items.write().update(item.id, |row| {
            row.condition.clone_from(&item.condition);
            row.available = item.available;
            row.checked_out = item.checked_out;
        }))
    }

    fn insert_photographer(&self, name: &str) -> StoreResult<Photographer> {
        let mut table = self.photographers.write();
        if table.find(|p| p.name == name).is_some() {
            return Err(StoreError::Duplicate {
                table: table.name,
                key: name.to_owned(),
            });
        }
        table.insert_with(|id| Photographer {
            id,
            name: name.to_owned(),
            checked_out: false,
        })
    }

    fn photographer(&self, id: PhotographerId) -> StoreResult<Option<Photographer>> {
        Ok(self.photographers.read().get(id))
    }

    fn photographer_by_name(&self, name: &str) -> StoreResult<Option<Photographer>> {
        Ok(self.photographers.read().find(|p| p.name == name))
    }

    fn set_photographer_checked_out(
        &self,
        id: PhotographerId,
        checked_out: bool,
    ) -> StoreResult<bool> {
        Ok(self
            .photographers
            .write()
            .update(id, |p| p.checked_out = checked_out))
    }
}

#[cfg(test)]
mod tests {
    use inflight_core::Tier;

    use super::*;

    #[test]
    fn ids_start_at_one_and_are_not_reused() {
        let db = Database::new();
        let booking = NewBooking {
            passenger_id: 1,
            slot_id: 1,
            tier: Tier::One,
            status: BookingStatus::Pending,
        };
        assert_eq!(db.insert_booking(booking).unwrap().booking_id, 1);
        assert!(db.delete_booking(1).unwrap());
        assert_eq!(db.insert_booking(booking).unwrap().booking_id, 2);
        assert!(db.booking(1).unwrap().is_none());
    }

    #[test]
    fn usernames_and_photographer_names_are_unique() {
        let db = Database::new();
        db.insert_passenger(NewPassenger::new("ada", 0)).unwrap();
        assert!(matches!(
            db.insert_passenger(NewPassenger::new("ada", 5)),
            Err(StoreError::Duplicate { .. })
        ));

        db.insert_photographer("Nadia").unwrap();
        assert!(matches!(
            db.insert_photographer("Nadia"),
            Err(StoreError::Duplicate { table: "photographer", .. })
        ));
    }

    #[test]
    fn chat_is_bidirectional_and_ordered() {
        let db = Database::new();
        let line = |sender: UserRole, receiver: UserRole, content: &str| ChatMessage {
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.to_owned(),
        };
        db.append_chat(line(UserRole::Passenger, UserRole::Attendant, "water?"))
            .unwrap();
        db.append_chat(line(UserRole::Pilot, UserRole::Atc, "request descent"))
            .unwrap();
        db.append_chat(line(UserRole::Attendant, UserRole::Passenger, "coming"))
            .unwrap();

        let history = db
            .chat_between(UserRole::Attendant, UserRole::Passenger)
            .unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["water?", "coming"]);
    }
}
