//! Network request handling.
//!
//! The HTTP adapter turns requests into [`NetRequest`] values and
//! queues them; the network worker drains the queue one request per
//! iteration and replies through the same source. The worker never
//! blocks on a socket, so a stalled client cannot stall control flow.

use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};

use crate::adapters::wifi::ConnectivityPort;
use crate::app::ports::{EventSink, MotorPort};
use crate::control::pump::PumpController;
use crate::store::StateStore;

// ───────────────────────────────────────────────────────────────
// Request model
// ───────────────────────────────────────────────────────────────

/// One inbound network request, already parsed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetRequest {
    /// GET /turbidity/data
    Status,
    /// POST /pump/on
    PumpOn,
    /// POST /pump/off
    PumpOff,
    /// POST /wifi/reset
    ResetCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetResponse {
    /// JSON body, served as application/json.
    Json(String),
    /// Plain-text acknowledgement.
    Ok(&'static str),
    /// The backing state could not be read right now (503).
    Unavailable,
}

/// Where requests come from and replies go back. The HTTP adapter is
/// the production implementation; tests drive a plain queue.
pub trait RequestSource {
    /// Take the next pending request, if any. Non-blocking.
    fn next_request(&mut self) -> Option<NetRequest>;

    /// Answer the request last returned by `next_request`.
    fn respond(&mut self, response: NetResponse);
}

// ───────────────────────────────────────────────────────────────
// Service
// ───────────────────────────────────────────────────────────────

/// Request dispatcher owned by the network worker.
pub struct NetService<M: MotorPort, W: ConnectivityPort> {
    store: Arc<StateStore>,
    pump: PumpController<M>,
    wifi: Arc<Mutex<W>>,
}

impl<M: MotorPort, W: ConnectivityPort> NetService<M, W> {
    pub fn new(store: Arc<StateStore>, pump: PumpController<M>, wifi: Arc<Mutex<W>>) -> Self {
        Self { store, pump, wifi }
    }

    /// Service at most one request. Returns `true` if one was handled.
    pub fn handle_one(
        &mut self,
        source: &mut impl RequestSource,
        sink: &mut impl EventSink,
    ) -> bool {
        let Some(request) = source.next_request() else {
            return false;
        };
        let response = self.dispatch(request, sink);
        source.respond(response);
        true
    }

    fn dispatch(&mut self, request: NetRequest, sink: &mut impl EventSink) -> NetResponse {
        match request {
            NetRequest::Status => match self.store.turbidity_data.get() {
                Some(data) if !data.json_record.is_empty() => NetResponse::Json(data.json_record),
                Some(_) => NetResponse::Unavailable, // no committed sample yet
                None => NetResponse::Unavailable,
            },
            NetRequest::PumpOn => self.pump_command(true, sink),
            NetRequest::PumpOff => self.pump_command(false, sink),
            NetRequest::ResetCredentials => {
                info!("net: credential reset requested");
                self.wifi
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .reset_credentials();
                NetResponse::Ok("credentials cleared; restarting")
            }
        }
    }

    fn pump_command(&mut self, on: bool, sink: &mut impl EventSink) -> NetResponse {
        match self.pump.request_pump(on, sink) {
            Ok(()) => NetResponse::Ok(if on { "pump running" } else { "pump stopped" }),
            Err(e) => {
                warn!("net: pump command failed: {}", e);
                NetResponse::Unavailable
            }
        }
    }
}
