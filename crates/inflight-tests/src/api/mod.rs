//! Client side of the protocol as seen by the tests

use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::Arc;

use eyre::{eyre, Result};
use flume::Sender;
use inflight_core::{
    Booking, BookingId, Credits, Passenger, PassengerId, Response, Slot, SlotId,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub mod direct;
pub mod tcp;

struct RequestMsg {
    line: String,
    response_channel: oneshot::Sender<Response>,
}

#[derive(Clone)]
enum Endpoint {
    /// One channel per dispatcher worker
    Direct {
        channels: Arc<Vec<Sender<RequestMsg>>>,
        my_index: usize,
    },
    Tcp(SocketAddr),
}

/// Entry point for talking to the reservation system
///
/// Clones of a direct `Api` are spread round-robin over the dispatcher
/// workers.
pub struct Api {
    endpoint: Endpoint,
}

impl Api {
    fn direct(channels: Vec<Sender<RequestMsg>>) -> Self {
        Self {
            endpoint: Endpoint::Direct {
                channels: Arc::new(channels),
                my_index: 0,
            },
        }
    }

    fn tcp(addr: SocketAddr) -> Self {
        Self {
            endpoint: Endpoint::Tcp(addr),
        }
    }

    /// Open a client session; over TCP this is a new connection
    pub async fn session(&self) -> Result<Session<'_>> {
        let link = match &self.endpoint {
            Endpoint::Direct { channels, my_index } => Link::Direct(channels[*my_index].clone()),
            Endpoint::Tcp(addr) => Link::Tcp(tcp::Connection::connect(*addr).await?),
        };
        Ok(Session {
            link,
            _api: PhantomData,
        })
    }

    /// Send a single request on a fresh session
    pub async fn request(&self, action: &str, data: Value) -> Result<Response> {
        self.session().await?.send(action, data).await
    }

    /// Address of the TCP server, if the tests run over TCP
    pub fn server_addr(&self) -> Option<SocketAddr> {
        match self.endpoint {
            Endpoint::Tcp(addr) => Some(addr),
            Endpoint::Direct { .. } => None,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let endpoint = match &self.endpoint {
            Endpoint::Direct { channels, my_index } => Endpoint::Direct {
                channels: channels.clone(),
                my_index: (my_index + 1) % channels.len(),
            },
            Endpoint::Tcp(addr) => Endpoint::Tcp(*addr),
        };
        Self { endpoint }
    }
}

enum Link {
    Direct(Sender<RequestMsg>),
    Tcp(tcp::Connection),
}

/// One client connection
///
/// Requests on a session are answered strictly in order.
pub struct Session<'a> {
    link: Link,
    _api: PhantomData<&'a Api>,
}

/// Decode the field `key` of a successful response
pub fn field<T: DeserializeOwned>(response: &Response, key: &str) -> Result<T> {
    if !response.is_ok() {
        return Err(eyre!(
            "expected OK, got {:?}: {}",
            response.status,
            response.message().unwrap_or("<no message>")
        ));
    }
    response
        .get(key)
        .ok_or_else(|| eyre!("response has no `{key}` field: {response:?}"))
}

impl Session<'_> {
    /// Send one raw request line (without the trailing newline)
    pub async fn send_line(&mut self, line: &str) -> Result<Response> {
        match &mut self.link {
            Link::Direct(channel) => {
                let (sender, receiver) = oneshot::channel();
                let msg = RequestMsg {
                    line: line.to_owned(),
                    response_channel: sender,
                };
                channel.send_async(msg).await?;
                Ok(receiver.await?)
            }
            Link::Tcp(connection) => connection.round_trip(line).await,
        }
    }

    pub async fn send(&mut self, action: &str, data: Value) -> Result<Response> {
        let line = json!({ "action": action, "data": data }).to_string();
        self.send_line(&line).await
    }

    pub async fn login(&mut self, username: &str) -> Result<Response> {
        self.send("LOGIN", json!({ "username": username })).await
    }

    pub async fn book_slot(
        &mut self,
        passenger: PassengerId,
        slot: SlotId,
        tier: u8,
    ) -> Result<Response> {
        let data = json!({ "passengerId": passenger, "slotId": slot, "tier": tier });
        self.send("BOOK_SLOT", data).await
    }

    pub async fn approve_booking(&mut self, booking: BookingId) -> Result<Response> {
        self.send("APPROVE_BOOKING", json!({ "bookingId": booking }))
            .await
    }

    pub async fn deny_booking(&mut self, booking: BookingId) -> Result<Response> {
        self.send("DENY_BOOKING", json!({ "bookingId": booking }))
            .await
    }

    pub async fn cancel_booking(&mut self, booking: BookingId) -> Result<Response> {
        self.send("CANCEL_BOOKING", json!({ "bookingId": booking }))
            .await
    }

    pub async fn update_nova_credits(
        &mut self,
        passenger: PassengerId,
        amount: i64,
    ) -> Result<Response> {
        let data = json!({ "passengerId": passenger, "amount": amount });
        self.send("UPDATE_NOVACREDITS", data).await
    }

    pub async fn passenger(&mut self, passenger: PassengerId) -> Result<Passenger> {
        let response = self
            .send("GET_PASSENGER_BY_ID", json!({ "passengerId": passenger }))
            .await?;
        field(&response, "passenger")
    }

    pub async fn balance(&mut self, passenger: PassengerId) -> Result<Credits> {
        Ok(self.passenger(passenger).await?.nova_credits)
    }

    pub async fn slot(&mut self, slot: SlotId) -> Result<Slot> {
        let response = self
            .send("GET_SLOT_BY_ID", json!({ "slotId": slot }))
            .await?;
        field(&response, "slot")
    }

    pub async fn available_slots(&mut self) -> Result<Vec<Slot>> {
        let response = self.send("GET_AVAILABLE_SLOTS", json!({})).await?;
        field(&response, "slots")
    }

    pub async fn bookings(&mut self) -> Result<Vec<Booking>> {
        let response = self.send("GET_BOOKINGS", json!({})).await?;
        field(&response, "bookings")
    }

    pub async fn bookings_for(&mut self, passenger: PassengerId) -> Result<Vec<Booking>> {
        let response = self
            .send(
                "GET_BOOKINGS_FOR_PASSENGER",
                json!({ "passengerId": passenger }),
            )
            .await?;
        field(&response, "bookings")
    }
}
