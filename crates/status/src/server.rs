// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The read-only status HTTP view.
//!
//! Two endpoints, `GET /status` and `GET /outputs`, both served off a
//! snapshot of `LiveRunState` taken under its lock. The server runs on its
//! own OS thread so a slow or wedged HTTP client can never stall the
//! scheduler.

use std::net::ToSocketAddrs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tiny_http::{Method, Response, Server};
use tracing::{debug, error, warn};
use weft_runtime::LiveRunState;

use crate::dto::StatusResponse;
use crate::error::StatusError;

/// How long `recv_timeout` blocks between checks of the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A running status server. Dropping this without calling [`shutdown`] leaves
/// the server thread running until the process exits.
///
/// [`shutdown`]: StatusServerHandle::shutdown
pub struct StatusServerHandle {
    addr: String,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl StatusServerHandle {
    /// The address the server actually bound to. Useful when `serve` was
    /// called with port `0` and the OS picked an ephemeral one.
    pub fn local_addr(&self) -> &str {
        &self.addr
    }

    /// Signal the server thread to stop and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Bind a status server to `addr` and serve `state` until the returned
/// handle is shut down.
pub fn serve(
    addr: impl ToSocketAddrs,
    state: Arc<LiveRunState>,
) -> Result<StatusServerHandle, StatusError> {
    let requested = addr
        .to_socket_addrs()
        .ok()
        .and_then(|mut it| it.next())
        .map(|a| a.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());

    let server = Server::http(addr).map_err(|source| StatusError::Bind {
        addr: requested.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
    })?;
    let bound_addr = server
        .server_addr()
        .to_ip()
        .map(|a| a.to_string())
        .unwrap_or(requested);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_thread = Arc::clone(&stop);
    debug!(addr = %bound_addr, "status server listening");

    let join = std::thread::spawn(move || {
        while !stop_for_thread.load(Ordering::SeqCst) {
            match server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => handle_request(request, &state),
                Ok(None) => continue,
                Err(err) => {
                    error!(%err, "status server receive error");
                    break;
                }
            }
        }
        debug!("status server stopped");
    });

    Ok(StatusServerHandle {
        addr: bound_addr,
        stop,
        join: Some(join),
    })
}

fn handle_request(request: tiny_http::Request, state: &LiveRunState) {
    let (status_code, body) = match (request.method(), request.url()) {
        (Method::Get, "/status") => respond_json(&StatusResponse::from(&state.to_run_state())),
        (Method::Get, "/outputs") => {
            respond_json(&serde_json::Value::from(state.snapshot().flows))
        }
        (method, url) => {
            warn!(%method, %url, "status server received unknown route");
            (404, "{\"error\":\"not found\"}".to_string())
        }
    };

    let response = Response::from_string(body).with_status_code(status_code);
    if let Err(err) = request.respond(response) {
        error!(%err, "failed to write status response");
    }
}

fn respond_json(value: &impl serde::Serialize) -> (u16, String) {
    match serde_json::to_string(value) {
        Ok(body) => (200, body),
        Err(err) => {
            error!(%err, "failed to serialize status response");
            (500, format!("{{\"error\":\"{err}\"}}"))
        }
    }
}
