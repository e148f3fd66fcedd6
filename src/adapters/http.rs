//! HTTP transport for the request queue.
//!
//! Handlers run on the HTTP server's own task; each one packages its
//! route as a [`NetRequest`], parks on a rendezvous channel, and waits
//! for the network worker to reply. The worker side sees only the
//! [`RequestSource`] trait.
//!
//! Routes:
//!   GET  /turbidity/data   latest committed aggregate as JSON
//!   POST /pump/on          manual pump start
//!   POST /pump/off         manual pump stop
//!   POST /wifi/reset       clear credentials and restart

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

use log::warn;

use crate::net::{NetRequest, NetResponse, RequestSource};

/// How long a handler waits for the worker before giving up. Covers a
/// full worker iteration including a contended store write.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Pending requests the server will buffer while the worker catches up.
const QUEUE_DEPTH: usize = 4;

// ───────────────────────────────────────────────────────────────
// Channel plumbing
// ───────────────────────────────────────────────────────────────

struct PendingRequest {
    request: NetRequest,
    reply: SyncSender<NetResponse>,
}

/// Handler-side handle. Cloned into each route closure.
#[derive(Clone)]
pub struct RequestQueue {
    tx: SyncSender<PendingRequest>,
}

impl RequestQueue {
    /// Enqueue a request and block until the worker replies or the
    /// timeout passes.
    pub fn dispatch(&self, request: NetRequest) -> NetResponse {
        let (reply_tx, reply_rx) = mpsc::sync_channel(0);
        let pending = PendingRequest { request, reply: reply_tx };
        if self.tx.try_send(pending).is_err() {
            warn!("http: request queue full, rejecting {:?}", request);
            return NetResponse::Unavailable;
        }
        match reply_rx.recv_timeout(REPLY_TIMEOUT) {
            Ok(response) => response,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                warn!("http: no reply for {:?} within {:?}", request, REPLY_TIMEOUT);
                NetResponse::Unavailable
            }
        }
    }
}

/// Worker-side end, implementing [`RequestSource`].
pub struct QueuedRequestSource {
    rx: Receiver<PendingRequest>,
    inflight: Option<SyncSender<NetResponse>>,
}

/// Build a connected queue/source pair.
pub fn request_channel() -> (RequestQueue, QueuedRequestSource) {
    let (tx, rx) = mpsc::sync_channel(QUEUE_DEPTH);
    (RequestQueue { tx }, QueuedRequestSource { rx, inflight: None })
}

impl RequestSource for QueuedRequestSource {
    fn next_request(&mut self) -> Option<NetRequest> {
        if let Some(stale) = self.inflight.take() {
            // Previous request was taken but never answered.
            let _ = stale.try_send(NetResponse::Unavailable);
        }
        match self.rx.try_recv() {
            Ok(pending) => {
                self.inflight = Some(pending.reply);
                Some(pending.request)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn respond(&mut self, response: NetResponse) {
        match self.inflight.take() {
            // Handler may have timed out already; the drop is fine.
            Some(reply) => {
                let _ = reply.try_send(response);
            }
            None => warn!("http: respond() with no request in flight"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF server wiring
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn serve(
    queue: RequestQueue,
) -> anyhow::Result<esp_idf_svc::http::server::EspHttpServer<'static>> {
    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer, Request};
    use esp_idf_svc::io::Write;

    fn write_reply(
        req: Request<&mut esp_idf_svc::http::server::EspHttpConnection>,
        response: NetResponse,
    ) -> Result<(), esp_idf_svc::io::EspIOError> {
        match response {
            NetResponse::Json(body) => {
                let mut resp = req.into_response(
                    200,
                    Some("OK"),
                    &[("Content-Type", "application/json")],
                )?;
                resp.write_all(body.as_bytes())?;
            }
            NetResponse::Ok(msg) => {
                let mut resp =
                    req.into_response(200, Some("OK"), &[("Content-Type", "text/plain")])?;
                resp.write_all(msg.as_bytes())?;
            }
            NetResponse::Unavailable => {
                req.into_response(503, Some("Service Unavailable"), &[])?;
            }
        }
        Ok(())
    }

    let mut server = EspHttpServer::new(&Configuration::default())?;

    for (uri, method, request) in [
        ("/turbidity/data", Method::Get, NetRequest::Status),
        ("/pump/on", Method::Post, NetRequest::PumpOn),
        ("/pump/off", Method::Post, NetRequest::PumpOff),
        ("/wifi/reset", Method::Post, NetRequest::ResetCredentials),
    ] {
        let q = queue.clone();
        server.fn_handler(uri, method, move |req| {
            write_reply(req, q.dispatch(request))
        })?;
    }

    log::info!("http: server listening");
    Ok(server)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
