//! One handler function per action

use std::collections::HashMap;

use inflight_core::{
    ActionKind, BookingId, PassengerId, PhotographerId, Request, Response, RoleTag, SlotId,
    UserRole,
};

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::services::ItemUpdate;

pub(crate) type Handler = fn(&Dispatcher, &Request) -> Result<Response, DispatchError>;

type Outcome = Result<Response, DispatchError>;

pub(crate) fn table() -> HashMap<ActionKind, Handler> {
    let routes: [(ActionKind, Handler); 28] = [
        (ActionKind::Login, login),
        (ActionKind::GetBookings, get_bookings),
        (ActionKind::SendChat, send_chat),
        (ActionKind::GetChat, get_chat),
        (ActionKind::UpdateNovaCredits, update_nova_credits),
        (ActionKind::TriggerSurvey, trigger_survey),
        (ActionKind::GetAvailableSlots, get_available_slots),
        (ActionKind::BookSlot, book_slot),
        (ActionKind::GetBookingsForPassenger, get_bookings_for_passenger),
        (ActionKind::GetSlotById, get_slot_by_id),
        (ActionKind::CancelBooking, cancel_booking),
        (ActionKind::ApproveBooking, approve_booking),
        (ActionKind::DenyBooking, deny_booking),
        (ActionKind::GetPassengerById, get_passenger_by_id),
        (ActionKind::TriggerBroadcast, trigger_broadcast),
        (ActionKind::GetBroadcast, get_broadcast),
        (ActionKind::GetLastCancellation, get_last_cancellation),
        (ActionKind::CheckSurveyTrigger, check_survey_trigger),
        (ActionKind::GetAllPassengers, get_all_passengers),
        (ActionKind::CheckOutPassenger, check_out_passenger),
        (ActionKind::CheckCheckoutStatus, check_checkout_status),
        (ActionKind::SetCheckedOutStatus, set_checked_out_status),
        (ActionKind::RegisterPhotographer, register_photographer),
        (ActionKind::GetPhotographerByName, get_photographer_by_name),
        (ActionKind::GetPhotographerById, get_photographer_by_id),
        (ActionKind::SetPhotographerCheckedOut, set_photographer_checked_out),
        (ActionKind::GetInventoryByRole, get_inventory_by_role),
        (ActionKind::UpdateInventoryItem, update_inventory_item),
    ];
    HashMap::from(routes)
}

// Passengers

fn login(d: &Dispatcher, rq: &Request) -> Outcome {
    let username: String = rq.field("username")?;
    let passenger = d.services.passengers.login(&username)?;
    Ok(Response::ok().with("passenger", passenger))
}

fn get_passenger_by_id(d: &Dispatcher, rq: &Request) -> Outcome {
    let passenger = d.services.passengers.get(rq.field("passengerId")?)?;
    Ok(Response::ok().with("passenger", passenger))
}

fn get_all_passengers(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(Response::ok().with("passengers", d.services.passengers.all()?))
}

fn check_out_passenger(d: &Dispatcher, rq: &Request) -> Outcome {
    d.services
        .passengers
        .set_checked_out(rq.field("passengerId")?, true)?;
    Ok(Response::ok())
}

fn check_checkout_status(d: &Dispatcher, rq: &Request) -> Outcome {
    let checked_out = d
        .services
        .passengers
        .is_checked_out(rq.field("passengerId")?)?;
    Ok(Response::ok().with("checkedOut", checked_out))
}

fn set_checked_out_status(d: &Dispatcher, rq: &Request) -> Outcome {
    let passenger: PassengerId = rq.field("passengerId")?;
    let checked_out: bool = rq.field("checkedOut")?;
    d.services.passengers.set_checked_out(passenger, checked_out)?;
    Ok(Response::ok())
}

fn update_nova_credits(d: &Dispatcher, rq: &Request) -> Outcome {
    let passenger: PassengerId = rq.field("passengerId")?;
    let amount: i64 = rq.field("amount")?;
    let balance = d.services.ledger.adjust(passenger, amount)?;
    Ok(Response::ok().with("newBalance", balance))
}

// Slots and bookings

fn get_available_slots(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(Response::ok().with("slots", d.services.slots.available()?))
}

fn get_slot_by_id(d: &Dispatcher, rq: &Request) -> Outcome {
    let slot = d.services.slots.get(rq.field("slotId")?)?;
    Ok(Response::ok().with("slot", slot))
}

fn book_slot(d: &Dispatcher, rq: &Request) -> Outcome {
    let passenger: PassengerId = rq.field("passengerId")?;
    let slot: SlotId = rq.field("slotId")?;
    let tier: u8 = rq.field("tier")?;
    let reservation = d.services.bookings.reserve(passenger, slot, tier)?;
    Ok(Response::ok()
        .with("newBalance", reservation.new_balance)
        .with("bookingId", reservation.booking.booking_id))
}

fn get_bookings(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(Response::ok().with("bookings", d.services.bookings.all()?))
}

fn get_bookings_for_passenger(d: &Dispatcher, rq: &Request) -> Outcome {
    let bookings = d
        .services
        .bookings
        .for_passenger(rq.field("passengerId")?)?;
    Ok(Response::ok().with("bookings", bookings))
}

fn approve_booking(d: &Dispatcher, rq: &Request) -> Outcome {
    let id: BookingId = rq.field("bookingId")?;
    d.services.bookings.approve(id)?;
    Ok(Response::ok())
}

fn deny_booking(d: &Dispatcher, rq: &Request) -> Outcome {
    let refund = d.services.bookings.deny(rq.field("bookingId")?)?;
    Ok(Response::ok()
        .with("newBalance", refund.new_balance)
        .with("refund", refund.refund))
}

fn cancel_booking(d: &Dispatcher, rq: &Request) -> Outcome {
    let refund = d.services.bookings.cancel(rq.field("bookingId")?)?;
    Ok(Response::ok()
        .with("newBalance", refund.new_balance)
        .with("refund", refund.refund))
}

// Chat

fn send_chat(d: &Dispatcher, rq: &Request) -> Outcome {
    let sender: RoleTag = rq.field("sender")?;
    let receiver: RoleTag = rq.field("receiver")?;
    let content: String = rq.field("content")?;
    d.services.chat.send(sender, receiver, content)?;
    Ok(Response::ok())
}

fn get_chat(d: &Dispatcher, rq: &Request) -> Outcome {
    let messages = d
        .services
        .chat
        .history(rq.field("sender")?, rq.field("receiver")?)?;
    Ok(Response::ok().with("messages", messages))
}

// Signals

fn trigger_survey(d: &Dispatcher, _: &Request) -> Outcome {
    d.signals.trigger_survey();
    Ok(Response::ok())
}

fn check_survey_trigger(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(Response::ok().with("triggered", d.signals.survey_triggered()))
}

fn trigger_broadcast(d: &Dispatcher, rq: &Request) -> Outcome {
    let message: String = rq.field("message")?;
    d.signals.broadcast(message);
    Ok(Response::ok())
}

fn get_broadcast(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(match d.signals.latest_broadcast() {
        Some(b) => Response::ok()
            .with("message", b.message)
            .with("timestamp", b.timestamp),
        None => Response::ok()
            .with("message", None::<String>)
            .with("timestamp", 0),
    })
}

fn get_last_cancellation(d: &Dispatcher, _: &Request) -> Outcome {
    Ok(match d.signals.last_cancellation() {
        Some(c) => Response::ok()
            .with("passenger", c.passenger)
            .with("timestamp", c.timestamp),
        None => Response::ok()
            .with("passenger", None::<String>)
            .with("timestamp", 0),
    })
}

// Photographers

fn register_photographer(d: &Dispatcher, rq: &Request) -> Outcome {
    let name: String = rq.field("name")?;
    let photographer = d.services.photographers.register(&name)?;
    Ok(Response::ok().with("photographer", photographer))
}

fn get_photographer_by_name(d: &Dispatcher, rq: &Request) -> Outcome {
    let name: String = rq.field("name")?;
    Ok(match d.services.photographers.by_name(&name)? {
        Some(p) => Response::ok().with("photographer", p),
        None => Response::not_found(),
    })
}

fn get_photographer_by_id(d: &Dispatcher, rq: &Request) -> Outcome {
    let id: PhotographerId = rq.field("id")?;
    Ok(match d.services.photographers.by_id(id)? {
        Some(p) => Response::ok().with("photographer", p),
        None => Response::not_found(),
    })
}

fn set_photographer_checked_out(d: &Dispatcher, rq: &Request) -> Outcome {
    let id: PhotographerId = rq.field("id")?;
    let checked_out: bool = rq.field("checkedOut")?;
    Ok(if d.services.photographers.set_checked_out(id, checked_out)? {
        Response::ok()
    } else {
        Response::not_found()
    })
}

// Inventory

fn get_inventory_by_role(d: &Dispatcher, rq: &Request) -> Outcome {
    let role: UserRole = rq.field("role")?;
    Ok(Response::ok().with("items", d.services.inventory.by_role(role)?))
}

fn update_inventory_item(d: &Dispatcher, rq: &Request) -> Outcome {
    let item: ItemUpdate = rq.field("item")?;
    d.services.inventory.update(item)?;
    Ok(Response::ok())
}
