use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::response::Response;

/// Kind of the request
///
/// The set is closed: every action a client may send is listed here, and
/// the wire name of each variant is its `SCREAMING_SNAKE_CASE` spelling.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum ActionKind {
    /// Look a passenger up by username
    Login,
    /// List every booking
    GetBookings,
    /// Append a message to the chat log
    SendChat,
    /// Read the conversation between two roles
    GetChat,
    /// Top up (positive amount) or deduct (negative amount) NovaCredits
    UpdateNovaCredits,
    /// Raise the survey flag for all clients
    TriggerSurvey,
    /// List slots that can still be booked
    GetAvailableSlots,
    /// Reserve a slot, charging the tier price
    BookSlot,
    /// List the bookings of one passenger
    GetBookingsForPassenger,
    /// Fetch one slot
    GetSlotById,
    /// Cancel a booking, refunding 75% of the tier price
    CancelBooking,
    /// Move a pending booking to approved
    ApproveBooking,
    /// Move a pending booking to denied, refunding the full tier price
    DenyBooking,
    /// Fetch one passenger
    GetPassengerById,
    /// Overwrite the broadcast register
    TriggerBroadcast,
    /// Read the broadcast register
    GetBroadcast,
    /// Read the cancellation register
    GetLastCancellation,
    /// Read the survey flag
    CheckSurveyTrigger,
    /// List every passenger
    GetAllPassengers,
    /// Mark a passenger as checked out
    CheckOutPassenger,
    /// Read the checked-out flag of a passenger
    CheckCheckoutStatus,
    /// Set the checked-out flag of a passenger
    SetCheckedOutStatus,
    /// Register a photographer by name (idempotent)
    RegisterPhotographer,
    /// Look a photographer up by name
    GetPhotographerByName,
    /// Look a photographer up by id
    GetPhotographerById,
    /// Set the checked-out flag of a photographer
    SetPhotographerCheckedOut,
    /// List the inventory owned by a role
    GetInventoryByRole,
    /// Overwrite condition and flags of an inventory item
    UpdateInventoryItem,
}

impl ActionKind {
    /// Every action, in declaration order
    pub const ALL: [ActionKind; 28] = [
        ActionKind::Login,
        ActionKind::GetBookings,
        ActionKind::SendChat,
        ActionKind::GetChat,
        ActionKind::UpdateNovaCredits,
        ActionKind::TriggerSurvey,
        ActionKind::GetAvailableSlots,
        ActionKind::BookSlot,
        ActionKind::GetBookingsForPassenger,
        ActionKind::GetSlotById,
        ActionKind::CancelBooking,
        ActionKind::ApproveBooking,
        ActionKind::DenyBooking,
        ActionKind::GetPassengerById,
        ActionKind::TriggerBroadcast,
        ActionKind::GetBroadcast,
        ActionKind::GetLastCancellation,
        ActionKind::CheckSurveyTrigger,
        ActionKind::GetAllPassengers,
        ActionKind::CheckOutPassenger,
        ActionKind::CheckCheckoutStatus,
        ActionKind::SetCheckedOutStatus,
        ActionKind::RegisterPhotographer,
        ActionKind::GetPhotographerByName,
        ActionKind::GetPhotographerById,
        ActionKind::SetPhotographerCheckedOut,
        ActionKind::GetInventoryByRole,
        ActionKind::UpdateInventoryItem,
    ];

    /// Name of the action on the wire
    pub fn wire_name(self) -> &'static str {
        use ActionKind::*;
        match self {
            Login => "LOGIN",
            GetBookings => "GET_BOOKINGS",
            SendChat => "SEND_CHAT",
            GetChat => "GET_CHAT",
            UpdateNovaCredits => "UPDATE_NOVACREDITS",
            TriggerSurvey => "TRIGGER_SURVEY",
            GetAvailableSlots => "GET_AVAILABLE_SLOTS",
            BookSlot => "BOOK_SLOT",
            GetBookingsForPassenger => "GET_BOOKINGS_FOR_PASSENGER",
            GetSlotById => "GET_SLOT_BY_ID",
            CancelBooking => "CANCEL_BOOKING",
            ApproveBooking => "APPROVE_BOOKING",
            DenyBooking => "DENY_BOOKING",
            GetPassengerById => "GET_PASSENGER_BY_ID",
            TriggerBroadcast => "TRIGGER_BROADCAST",
            GetBroadcast => "GET_BROADCAST",
            GetLastCancellation => "GET_LAST_CANCELLATION",
            CheckSurveyTrigger => "CHECK_SURVEY_TRIGGER",
            GetAllPassengers => "GET_ALL_PASSENGERS",
            CheckOutPassenger => "CHECK_OUT_PASSENGER",
            CheckCheckoutStatus => "CHECK_CHECKOUT_STATUS",
            SetCheckedOutStatus => "SET_CHECKED_OUT_STATUS",
            RegisterPhotographer => "REGISTER_PHOTOGRAPHER",
            GetPhotographerByName => "GET_PHOTOGRAPHER_BY_NAME",
            GetPhotographerById => "GET_PHOTOGRAPHER_BY_ID",
            SetPhotographerCheckedOut => "SET_PHOTOGRAPHER_CHECKED_OUT",
            GetInventoryByRole => "GET_INVENTORY_BY_ROLE",
            UpdateInventoryItem => "UPDATE_INVENTORY_ITEM",
        }
    }

    /// Whether the action only reads state
    pub fn is_read_only(self) -> bool {
        use ActionKind::*;
        matches!(
            self,
            Login
                | GetBookings
                | GetChat
                | GetAvailableSlots
                | GetBookingsForPassenger
                | GetSlotById
                | GetPassengerById
                | GetBroadcast
                | GetLastCancellation
                | CheckSurveyTrigger
                | GetAllPassengers
                | CheckCheckoutStatus
                | GetPhotographerByName
                | GetPhotographerById
                | GetInventoryByRole
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ActionKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.wire_name() == s)
            .ok_or_else(|| ProtocolError::UnknownAction(s.to_owned()))
    }
}

/// Errors raised while decoding a request envelope or its data fields
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line is not a JSON request envelope
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
    /// `data` is present but not a JSON object
    #[error("request data must be an object")]
    DataNotObject,
    /// `action` is not part of the closed action set
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    /// A field the action needs is absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A field has the wrong shape
    #[error("invalid field `{field}`: {source}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// Decoding failure
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// Response sent back to the client for this error
    ///
    /// Unknown actions are named in the message; every other decoding
    /// failure gets the generic error.
    pub fn response(&self) -> Response {
        match self {
            ProtocolError::UnknownAction(_) => Response::error(self.to_string()),
            _ => Response::generic_error(),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    action: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Parse one request line into its action and data object
///
/// A missing or `null` `data` is treated as an empty object.
pub fn parse_envelope(line: &str) -> Result<(ActionKind, Map<String, Value>), ProtocolError> {
    let envelope: Envelope = serde_json::from_str(line)?;
    let kind = envelope.action.parse()?;
    let data = match envelope.data {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(data)) => data,
        Some(_) => return Err(ProtocolError::DataNotObject),
    };
    Ok((kind, data))
}

/// Request sent by a connected client
///
/// Carries the decoded action and data object. The transport that produced
/// it is reached through [`Request::respond()`].
pub struct Request {
    kind: ActionKind,
    data: Map<String, Value>,
    raw: Box<dyn RawRequest + Send>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("data", &self.data)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// Interface for handling requests from a client
pub trait RequestHandler {
    /// Handle a request from a client
    ///
    /// This method may be called concurrently from different threads. The
    /// handler must answer every request exactly once via
    /// [`Request::respond()`].
    fn handle(&self, request: Request);

    /// Shut the reservation system down
    fn shutdown(self)
    where
        Self: Sized;
}

/// A raw request, implemented by the transport
///
/// The TCP server and the in-process test transport each provide one.
pub trait RawRequest {
    /// Deliver the response to the client
    fn respond(self: Box<Self>, response: Response);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Decode the data field `name`
    pub fn field<T: DeserializeOwned>(&self, name: &'static str) -> Result<T, ProtocolError> {
        let value = self
            .data
            .get(name)
            .ok_or(ProtocolError::MissingField(name))?;
        T::deserialize(value).map_err(|source| ProtocolError::InvalidField {
            field: name,
            source,
        })
    }

    /// Respond to the client
    ///
    /// This method blocks until the transport accepted the response.
    #[inline]
    pub fn respond(self, response: Response) {
        self.raw.respond(response);
    }

    /// Create a new request from a [`RawRequest`]
    ///
    /// Only transports call this.
    #[inline]
    pub fn from_raw(
        kind: ActionKind,
        data: Map<String, Value>,
        raw: Box<dyn RawRequest + Send>,
    ) -> Self {
        Self { kind, data, raw }
    }
}

struct ChannelRequest(crossbeam::channel::Sender<Response>);

impl RawRequest for ChannelRequest {
    fn respond(self: Box<Self>, response: Response) {
        let _ = self.0.send(response);
    }
}

/// Parse `line`, hand it to `handler` and wait for the response
///
/// Malformed envelopes and unknown actions are answered here without
/// reaching the handler. A handler that drops the request without answering
/// yields the generic error.
pub fn dispatch_line<H: RequestHandler + ?Sized>(handler: &H, line: &str) -> Response {
    let (kind, data) = match parse_envelope(line) {
        Ok(parsed) => parsed,
        Err(err) => return err.response(),
    };
    let (sender, receiver) = crossbeam::channel::bounded(1);
    handler.handle(Request::from_raw(kind, data, Box::new(ChannelRequest(sender))));
    receiver
        .recv()
        .unwrap_or_else(|_| Response::generic_error())
}
