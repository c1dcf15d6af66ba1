use inflight_core::{PassengerId, UserRole};
use inflight_engine::Seed;

#[allow(unused)]
pub const ADA: PassengerId = 1;
#[allow(unused)]
pub const BOB: PassengerId = 2;
#[allow(unused)]
pub const CLEO: PassengerId = 3;
#[allow(unused)]
pub const DMITRI: PassengerId = 4;

/// Four passengers, ten free slots, a little inventory and one photographer
#[allow(unused)]
pub fn station() -> Seed {
    let mut seed = Seed::new()
        .passenger("ada", 250_000)
        .passenger("bob", 100_000)
        .passenger("cleo", 0)
        .passenger("dmitri", 500_000);
    for hour in 8..18 {
        seed = seed.slot(&format!("2031-07-01 {hour:02}:00"));
    }
    seed.item("Camera", UserRole::Photographer)
        .item("Tether", UserRole::Attendant)
        .item("Helmet", UserRole::Attendant)
        .photographer("Nadia")
}

/// `passengers` passengers with `credits` each and `slots` free slots
#[allow(unused)]
pub fn crowd(passengers: u32, credits: u32, slots: u32) -> Seed {
    let mut seed = Seed::new();
    for i in 0..passengers {
        seed = seed.passenger(&format!("passenger-{i}"), credits);
    }
    for i in 0..slots {
        seed = seed.slot(&format!("slot-{i}"));
    }
    seed
}
