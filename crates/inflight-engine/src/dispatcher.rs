//! Implementation of the protocol dispatcher
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use inflight_core::{ActionKind, ProtocolError, Request, RequestHandler, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::ServiceError;
use crate::routes::{self, Handler};
use crate::services::{
    BookingService, ChatService, InventoryService, Ledger, PassengerDirectory,
    PhotographerRegistry, SlotRegistry,
};
use crate::signals::Signals;

/// Why a handler did not produce a response
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl DispatchError {
    fn into_response(self, kind: ActionKind) -> Response {
        let err = match self {
            DispatchError::Protocol(err) => return err.response(),
            DispatchError::Service(err) => err,
        };
        match kind {
            ActionKind::BookSlot => Response::error(format!("Booking failed: {err}")),
            ActionKind::CancelBooking => Response::error("Invalid cancel request"),
            ActionKind::UpdateInventoryItem if err.is_not_found() => Response::not_found(),
            _ => Response::error(err.to_string()),
        }
    }
}

/// The services backing the protocol
pub struct Services {
    pub passengers: PassengerDirectory,
    pub ledger: Arc<Ledger>,
    pub slots: Arc<SlotRegistry>,
    pub bookings: BookingService,
    pub chat: ChatService,
    pub inventory: InventoryService,
    pub photographers: PhotographerRegistry,
}

/// Answers client requests
///
/// Every action is routed to its own handler function. Handler failures are
/// turned into `ERROR` or `NOT_FOUND` responses and a panicking handler is
/// answered with the generic error, so every request gets exactly one
/// response.
pub struct Dispatcher {
    pub(crate) services: Services,
    pub(crate) signals: Arc<Signals>,
    routes: HashMap<ActionKind, Handler>,
}

impl Dispatcher {
    /// Create a new [`Dispatcher`]
    pub fn new(services: Services, signals: Arc<Signals>) -> Self {
        Self {
            services,
            signals,
            routes: routes::table(),
        }
    }

    fn run(&self, request: &Request) -> Response {
        let kind = request.kind();
        let Some(handler) = self.routes.get(&kind) else {
            error!(action = %kind, "no route registered");
            return Response::generic_error();
        };
        match std::panic::catch_unwind(AssertUnwindSafe(|| handler(self, request))) {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(action = %kind, %err, "request rejected");
                err.into_response(kind)
            }
            Err(_) => {
                error!(action = %kind, "handler panicked");
                Response::generic_error()
            }
        }
    }
}

impl RequestHandler for Dispatcher {
    fn handle(&self, request: Request) {
        debug!(action = %request.kind(), "dispatching");
        let response = self.run(&request);
        request.respond(response);
    }

    fn shutdown(self) {
        info!("dispatcher shut down");
    }
}

#[cfg(test)]
mod tests {
    use inflight_core::{dispatch_line, Config, GENERIC_ERROR};

    use super::*;
    use crate::seed::Seed;

    fn explode(_: &Dispatcher, _: &Request) -> Result<Response, DispatchError> {
        panic!("handler exploded")
    }

    #[test]
    fn panicking_handler_gets_the_generic_error() {
        let mut dispatcher = crate::launch_with_seed(&Config::default(), &Seed::new()).unwrap();
        dispatcher.routes.insert(ActionKind::TriggerSurvey, explode);

        let response = dispatch_line(&dispatcher, r#"{"action": "TRIGGER_SURVEY"}"#);
        assert_eq!(response.message(), Some(GENERIC_ERROR));

        let check = dispatch_line(&dispatcher, r#"{"action": "CHECK_SURVEY_TRIGGER"}"#);
        assert_eq!(check.get::<bool>("triggered"), Some(false));
    }
}
