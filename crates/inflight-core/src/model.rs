//! Entities exchanged between clients and the reservation engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Balance unit
pub type Credits = u32;
/// Passenger identity
pub type PassengerId = u32;
/// Slot identity
pub type SlotId = u32;
/// Booking identity
pub type BookingId = u32;
/// Inventory item identity
pub type ItemId = u32;
/// Photographer identity
pub type PhotographerId = u32;

/// A passenger account
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    /// Unique id
    pub passenger_id: PassengerId,
    /// Unique display name, used to log in
    pub username: String,
    /// Credential
    pub password: String,
    /// Balance
    pub nova_credits: Credits,
    /// Whether the passenger has left the station
    pub checked_out: bool,
}

/// A bookable spacewalk slot
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Unique id
    pub slot_id: SlotId,
    /// Time label shown to clients
    pub slot_time: String,
    /// Whether no booking holds the slot
    pub available: bool,
}

/// Price class of a booking
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Tier {
    /// 100 000 credits
    One = 1,
    /// 250 000 credits
    Two = 2,
    /// 500 000 credits
    Three = 3,
}

/// A tier number outside `1..=3`
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[error("unknown tier {0}")]
pub struct UnknownTier(pub u8);

impl Tier {
    /// List price of the tier
    pub const fn price(self) -> Credits {
        match self {
            Tier::One => 100_000,
            Tier::Two => 250_000,
            Tier::Three => 500_000,
        }
    }

    /// Amount refunded when a booking of this tier is cancelled
    pub fn cancellation_refund(self, policy: CancellationRefund) -> Credits {
        let base = match (self, policy) {
            (Tier::Three, CancellationRefund::Legacy) => 50_000,
            _ => self.price(),
        };
        base / 4 * 3
    }
}

impl TryFrom<u8> for Tier {
    type Error = UnknownTier;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(UnknownTier(other)),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier as u8
    }
}

/// Which base the 75% cancellation refund of a tier 3 booking uses
///
/// Tiers 1 and 2 always refund 75% of their list price.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CancellationRefund {
    /// 75% of 50 000, the constant the deployed system has always paid out
    #[default]
    Legacy,
    /// 75% of the 500 000 list price
    ListPrice,
}

impl FromStr for CancellationRefund {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "list-price" => Ok(Self::ListPrice),
            other => Err(format!("unknown refund policy `{other}`")),
        }
    }
}

/// Lifecycle state of a booking
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Waiting for a pilot's decision
    Pending,
    /// Accepted by a pilot
    Approved,
    /// Rejected by a pilot, price refunded
    Denied,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Denied => "denied",
        })
    }
}

/// A passenger's claim on a slot
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique id
    pub booking_id: BookingId,
    /// Who booked
    pub passenger_id: PassengerId,
    /// What was booked
    pub slot_id: SlotId,
    /// Price class paid
    pub tier: Tier,
    /// Lifecycle state
    pub status: BookingStatus,
}

/// Role a client acts under
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UserRole {
    /// Books slots
    Passenger,
    /// Approves and denies bookings
    Pilot,
    /// Looks after passengers and inventory
    Attendant,
    /// Takes pictures, owns camera gear
    Photographer,
    /// Air traffic control
    Atc,
}

/// A role name that is not part of [`UserRole`]
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl UserRole {
    /// Canonical spelling
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Passenger => "PASSENGER",
            UserRole::Pilot => "PILOT",
            UserRole::Attendant => "ATTENDANT",
            UserRole::Photographer => "PHOTOGRAPHER",
            UserRole::Atc => "ATC",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    /// Role names are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            UserRole::Passenger,
            UserRole::Pilot,
            UserRole::Attendant,
            UserRole::Photographer,
            UserRole::Atc,
        ]
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A role as spelled by the client that named it
///
/// Tags compare by role, so `"Pilot"` and `"PILOT"` address the same
/// endpoint, but a tag serializes back to the exact spelling it was read
/// from.
#[derive(Clone, Debug)]
pub struct RoleTag {
    role: UserRole,
    spelling: String,
}

impl RoleTag {
    /// The role named by this tag
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// The spelling the tag was read from
    pub fn as_str(&self) -> &str {
        &self.spelling
    }
}

impl From<UserRole> for RoleTag {
    fn from(role: UserRole) -> Self {
        Self {
            role,
            spelling: role.as_str().to_owned(),
        }
    }
}

impl FromStr for RoleTag {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            role: s.parse()?,
            spelling: s.to_owned(),
        })
    }
}

impl PartialEq for RoleTag {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role
    }
}

impl Eq for RoleTag {}

impl PartialEq<UserRole> for RoleTag {
    fn eq(&self, other: &UserRole) -> bool {
        self.role == *other
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

impl Serialize for RoleTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.spelling)
    }
}

impl<'de> Deserialize<'de> for RoleTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A piece of equipment owned by a role
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Unique id
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Free-text description of its state
    pub condition: String,
    /// Whether the item may be used
    pub available: bool,
    /// Role responsible for the item
    pub owner_role: UserRole,
    /// Whether the item is currently handed out
    pub checked_out: bool,
}

/// One chat line between two roles
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role that wrote the message
    pub sender: RoleTag,
    /// Role the message is addressed to
    pub receiver: RoleTag,
    /// Text
    pub content: String,
}

/// A registered photographer
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photographer {
    /// Unique id
    pub id: PhotographerId,
    /// Unique name
    pub name: String,
    /// Whether the photographer has left the station
    pub checked_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_refunds() {
        use CancellationRefund::*;
        assert_eq!(Tier::One.cancellation_refund(Legacy), 75_000);
        assert_eq!(Tier::Two.cancellation_refund(Legacy), 187_500);
        assert_eq!(Tier::Three.cancellation_refund(Legacy), 37_500);
        assert_eq!(Tier::Three.cancellation_refund(ListPrice), 375_000);
        assert_eq!(Tier::One.cancellation_refund(ListPrice), 75_000);
    }

    #[test]
    fn roles_are_case_insensitive() {
        let role: UserRole = serde_json::from_str(r#""Photographer""#).unwrap();
        assert_eq!(role, UserRole::Photographer);
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""PHOTOGRAPHER""#);
        assert!("captain".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_tags_keep_their_spelling() {
        let tag: RoleTag = serde_json::from_str(r#""Pilot""#).unwrap();
        assert_eq!(tag.role(), UserRole::Pilot);
        assert_eq!(tag, RoleTag::from(UserRole::Pilot));
        assert_eq!(tag, UserRole::Pilot);
        assert_eq!(serde_json::to_string(&tag).unwrap(), r#""Pilot""#);
        assert_eq!(RoleTag::from(UserRole::Atc).as_str(), "ATC");
        assert!(serde_json::from_str::<RoleTag>(r#""Captain""#).is_err());
    }

    #[test]
    fn booking_wire_shape() {
        let booking = Booking {
            booking_id: 4,
            passenger_id: 1,
            slot_id: 10,
            tier: Tier::Two,
            status: BookingStatus::Pending,
        };
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["bookingId"], 4);
        assert_eq!(value["tier"], 2);
        assert_eq!(value["status"], "pending");
        assert!(serde_json::from_str::<Tier>("4").is_err());
    }
}
