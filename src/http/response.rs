//! HTTP response building module
//!
//! Builders for the handful of responses the server sends. When CORS is
//! enabled every response allows any origin, matching the console page being
//! served from elsewhere during development.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

fn with_cors(builder: Builder, enable_cors: bool) -> Builder {
    if enable_cors {
        builder.header("Access-Control-Allow-Origin", "*")
    } else {
        builder
    }
}

/// Build a plain-text response
pub fn build_text_response(
    status: StatusCode,
    body: &'static str,
    enable_cors: bool,
) -> Response<Full<Bytes>> {
    with_cors(Response::builder(), enable_cors)
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Build 404 Not Found response
pub fn build_404_response(enable_cors: bool) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", enable_cors)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut response = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        enable_cors,
    );
    response.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response(enable_cors: bool) -> Response<Full<Bytes>> {
    build_text_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large",
        enable_cors,
    )
}

/// Build health probe response
pub fn build_health_response(healthy: bool, enable_cors: bool) -> Response<Full<Bytes>> {
    if healthy {
        build_text_response(StatusCode::OK, "ok", enable_cors)
    } else {
        build_text_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable", enable_cors)
    }
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build HTML response
pub fn build_html_response(content: &'static str, is_head: bool) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(content.as_bytes())
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content.len())
        .header("Cache-Control", "no-cache")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    enable_cors: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
                enable_cors,
            );
        }
    };

    with_cors(Response::builder(), enable_cors)
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_with_cors() {
        let response = build_json_response(
            StatusCode::OK,
            &serde_json::json!({"status": "success"}),
            true,
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(body_string(response).await, r#"{"status":"success"}"#);
    }

    #[test]
    fn test_cors_disabled_omits_header() {
        let response = build_json_response(StatusCode::OK, &"x", false);
        assert!(response
            .headers()
            .get("Access-Control-Allow-Origin")
            .is_none());
    }

    #[test]
    fn test_options_response() {
        let response = build_options_response(true);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            ALLOWED_METHODS
        );
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let response = build_405_response(false);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], ALLOWED_METHODS);
    }

    #[tokio::test]
    async fn test_head_html_has_length_but_no_body() {
        let response = build_html_response("<p>hi</p>", true);
        assert_eq!(response.headers()["Content-Length"], "9");
        assert_eq!(body_string(response).await, "");
    }

    #[test]
    fn test_health_response() {
        assert_eq!(build_health_response(true, false).status(), StatusCode::OK);
        assert_eq!(
            build_health_response(false, false).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
