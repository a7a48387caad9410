//! Command endpoint
//!
//! `POST /run` reads the `command` form field, runs it and answers with the
//! JSON envelope. The HTTP status is always 200; success or failure lives in
//! the envelope's `status` field.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::time::Instant;

use crate::command::Operation;
use crate::config::AppState;
use crate::dispatch::{self, Envelope, Status};
use crate::http;
use crate::logger;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handle `POST /run`
pub async fn handle_run<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
{
    let cors = state.config.http.enable_cors;
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Command body exceeds {limit} bytes"));
            return http::build_413_response(cors);
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            let envelope = Envelope::error("Failed to read request body");
            return http::build_json_response(StatusCode::OK, &envelope, cors);
        }
    };

    let envelope = execute_command(&command_field(&body), state).await;
    http::build_json_response(StatusCode::OK, &envelope, cors)
}

/// Answer for `GET /run`
pub fn reject_get(enable_cors: bool) -> Response<Full<Bytes>> {
    let envelope = Envelope::error("Use POST to execute commands.");
    http::build_json_response(StatusCode::OK, &envelope, enable_cors)
}

/// Run one command against the shared store
pub async fn execute_command(command: &str, state: &AppState) -> Envelope {
    let started = Instant::now();
    let result = dispatch::run(command, state.store.as_ref()).await;

    if state.config.logging.log_commands {
        let operation = Operation::recognize(command).map_or("-", Operation::name);
        let status = if result.is_ok() {
            Status::Success
        } else {
            Status::Error
        };
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_command(operation, status.as_str(), elapsed_us);
    }

    Envelope::from(result)
}

/// Value of the `command` form field; missing means empty
fn command_field(body: &[u8]) -> String {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "command")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
