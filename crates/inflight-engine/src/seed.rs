//! Initial records loaded into the store at launch
//!
//! A seed file is TOML:
//!
//! ```toml
//! [[passengers]]
//! username = "ada"
//! nova-credits = 250000
//!
//! [[slots]]
//! time = "2031-07-01 09:00"
//!
//! [[inventory]]
//! name = "Camera"
//! owner-role = "PHOTOGRAPHER"
//!
//! [[photographers]]
//! name = "Nadia"
//! ```

use std::path::Path;

use inflight_core::{Credits, UserRole};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::store::{NewItem, NewPassenger, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("could not store seed records: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedSlot {
    pub time: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedPhotographer {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Seed {
    pub passengers: Vec<NewPassenger>,
    pub slots: Vec<SeedSlot>,
    pub inventory: Vec<NewItem>,
    pub photographers: Vec<SeedPhotographer>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(text)?)
    }

    pub fn passenger(mut self, username: &str, nova_credits: Credits) -> Self {
        self.passengers.push(NewPassenger::new(username, nova_credits));
        self
    }

    pub fn slot(mut self, time: &str) -> Self {
        self.slots.push(SeedSlot {
            time: time.to_owned(),
        });
        self
    }

    pub fn item(mut self, name: &str, owner_role: UserRole) -> Self {
        self.inventory.push(NewItem {
            name: name.to_owned(),
            condition: String::from("good"),
            available: true,
            owner_role,
        });
        self
    }

    pub fn photographer(mut self, name: &str) -> Self {
        self.photographers.push(SeedPhotographer {
            name: name.to_owned(),
        });
        self
    }

    /// Insert every record, in file order, so ids follow the file
    pub fn apply(&self, store: &dyn RecordStore) -> Result<(), SeedError> {
        for passenger in &self.passengers {
            store.insert_passenger(passenger.clone())?;
        }
        for slot in &self.slots {
            store.insert_slot(slot.time.clone())?;
        }
        for item in &self.inventory {
            store.insert_item(item.clone())?;
        }
        for photographer in &self.photographers {
            store.insert_photographer(&photographer.name)?;
        }
        info!(
            passengers = self.passengers.len(),
            slots = self.slots.len(),
            items = self.inventory.len(),
            photographers = self.photographers.len(),
            "seed loaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[test]
    fn parses_the_documented_format() {
        let seed = Seed::from_toml(
            r#"
            [[passengers]]
            username = "ada"
            password = "hunter2"
            nova-credits = 250000

            [[slots]]
            time = "2031-07-01 09:00"

            [[inventory]]
            name = "Camera"
            owner-role = "photographer"
            "#,
        )
        .unwrap();
        let store = Database::new();
        seed.apply(&store).unwrap();

        let ada = store.passenger_by_username("ada").unwrap().unwrap();
        assert_eq!(ada.nova_credits, 250_000);
        assert_eq!(ada.password, "hunter2");
        assert!(store.slot(1).unwrap().unwrap().available);
        let items = store.items_by_role(UserRole::Photographer).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].available);
    }

    #[test]
    fn rejects_unknown_tables_and_duplicates() {
        assert!(matches!(
            Seed::from_toml("[[rockets]]\nname = \"x\""),
            Err(SeedError::Toml(_))
        ));
        let seed = Seed::new().passenger("ada", 1).passenger("ada", 2);
        assert!(matches!(
            seed.apply(&Database::new()),
            Err(SeedError::Store(StoreError::Duplicate { .. }))
        ));
    }
}
