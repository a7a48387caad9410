//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, method checks and
//! access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::run;
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

const INDEX_HTML: &str = include_str!("index.html");

/// Paths this server answers on
const KNOWN_PATHS: [&str; 5] = ["/", "/index.html", "/run", "/healthz", "/readyz"];

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;
    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let cors = state.config.http.enable_cors;
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (&method, path.as_str()) {
        (&Method::OPTIONS, _) => http::build_options_response(cors),
        (&Method::GET | &Method::HEAD, "/" | "/index.html") => {
            http::build_html_response(INDEX_HTML, method == Method::HEAD)
        }
        (&Method::GET, "/healthz") => http::build_health_response(true, cors),
        (&Method::GET, "/readyz") => readiness(state).await,
        (&Method::GET, "/run") => run::reject_get(cors),
        (&Method::POST, "/run") => run::handle_run(req, state).await,
        (_, p) if KNOWN_PATHS.contains(&p) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(cors)
        }
        _ => http::build_404_response(cors),
    }
}

/// Ready when the store answers a ping
async fn readiness(state: &AppState) -> Response<Full<Bytes>> {
    let cors = state.config.http.enable_cors;
    match state.store.ping().await {
        Ok(()) => http::build_health_response(true, cors),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            http::build_health_response(false, cors)
        }
    }
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.user_agent = req
        .headers()
        .get(hyper::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}
