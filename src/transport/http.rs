//! HTTP transport
//!
//! Accepts connections, decodes each request into the extractor's inputs and
//! writes back the token (200), a bare bearer challenge (401) or an
//! `invalid_request` challenge (400).

use super::body;
use crate::config::Config;
use crate::error::{ErrorStatus, ExtractionError, ServerError, ServerResult};
use crate::extractor::{HeaderMap, TokenExtractor};
use crate::logging::Logger;
use crate::types::LogLevel;
use http::request::Parts;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, header};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

pub const HEALTH_PATH: &str = "/health";

/// Decrements the live connection count when a connection task ends
struct ConnectionGuard {
    connection_count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn new(connection_count: Arc<AtomicUsize>) -> Self {
        connection_count.fetch_add(1, Ordering::Relaxed);
        Self { connection_count }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connection_count.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Per-request settings shared by every connection
#[derive(Debug)]
pub struct RequestContext {
    pub realm: String,
    pub max_payload_size: usize,
    pub logger: Logger,
}

impl RequestContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            realm: config.realm.clone(),
            max_payload_size: config.max_payload_size,
            logger: Logger::new(config.log_level),
        }
    }
}

pub struct HttpTransport {
    config: Config,
    connection_count: Arc<AtomicUsize>,
}

impl HttpTransport {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connection_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.connection_count.load(Ordering::Relaxed)
    }

    /// Bind the listener and serve in a background task
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    pub async fn start(&self) -> ServerResult<SocketAddr> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let addr = listener.local_addr()?;

        let ctx = Arc::new(RequestContext::from_config(&self.config));
        let logger = ctx.logger;
        let max_connections = self.config.max_connections;
        let timeout_duration = self.config.connection_timeout;
        let connection_count = self.connection_count.clone();

        logger.info(&format!("HTTP transport starting on {addr}"));

        tokio::spawn(async move {
            loop {
                let (stream, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        logger.error(&format!("Error accepting connection: {e}"));
                        continue;
                    }
                };

                if connection_count.load(Ordering::Relaxed) >= max_connections {
                    logger.warn(&format!(
                        "Connection limit reached ({max_connections}), rejecting {peer}"
                    ));
                    continue;
                }

                let guard = ConnectionGuard::new(connection_count.clone());
                let ctx = ctx.clone();
                let io = TokioIo::new(stream);

                tokio::spawn(async move {
                    let _guard = guard;
                    let service = service_fn(move |req| handle_request(req, ctx.clone()));
                    let connection_fut =
                        hyper::server::conn::http1::Builder::new().serve_connection(io, service);

                    match tokio::time::timeout(timeout_duration, connection_fut).await {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => logger.debug(&format!("Error serving connection: {err}")),
                        Err(_) => logger.debug(&format!(
                            "Connection from {peer} timed out after {}s",
                            timeout_duration.as_secs()
                        )),
                    }
                });
            }
        });

        Ok(addr)
    }
}

/// Handle one request; internal failures become a bare 500
pub async fn handle_request(
    req: Request<Incoming>,
    ctx: Arc<RequestContext>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match handle_request_inner(req, &ctx).await {
        Ok(response) => Ok(response),
        Err(e) => {
            ctx.logger.error(&format!("Error handling request: {e}"));
            let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(response)
        }
    }
}

async fn handle_request_inner(
    req: Request<Incoming>,
    ctx: &RequestContext,
) -> ServerResult<Response<Full<Bytes>>> {
    let (parts, body) = req.into_parts();

    let bytes = match Limited::new(body, ctx.max_payload_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            ctx.logger.warn(&format!(
                "Rejected {} {}: body exceeds {} bytes",
                parts.method,
                parts.uri.path(),
                ctx.max_payload_size
            ));
            return payload_too_large(ctx.max_payload_size);
        }
        Err(err) => return Err(ServerError::Body(err.to_string())),
    };

    respond(&parts, &bytes, ctx)
}

/// Build the response for a fully read request
pub fn respond(
    parts: &Parts,
    body: &[u8],
    ctx: &RequestContext,
) -> ServerResult<Response<Full<Bytes>>> {
    if parts.method == Method::GET && parts.uri.path() == HEALTH_PATH {
        return health_check();
    }

    let kind = body::classify(
        parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );
    let fields = match body::parse_body(kind, body) {
        Ok(fields) => fields,
        Err(e @ ServerError::Serialization(_)) => {
            ctx.logger.warn(&format!(
                "Rejected {} {}: {e}",
                parts.method,
                parts.uri.path()
            ));
            return error_response(StatusCode::BAD_REQUEST, "invalid_body", &e.to_string(), None);
        }
        Err(e) => return Err(e),
    };

    let headers = header_view(&parts.headers);
    let query = body::parse_query(parts.uri.query());
    let extractor = TokenExtractor::new(&headers, &query, &fields, kind.is_form_encoded());

    match extractor.locate() {
        Ok(found) => {
            ctx.logger.log_with_context(
                LogLevel::Debug,
                "Access token extracted",
                json!({
                    "method": parts.method.as_str(),
                    "path": parts.uri.path(),
                    "channel": found.channel,
                }),
            );
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .header(header::CACHE_CONTROL, "no-store")
                .body(Full::new(Bytes::from(found.value.to_string())))?)
        }
        Err(err) => {
            ctx.logger.log_with_context(
                LogLevel::Info,
                "Access token rejected",
                json!({
                    "method": parts.method.as_str(),
                    "path": parts.uri.path(),
                    "status": err.status().as_u16(),
                    "reason": err.reason(),
                }),
            );
            extraction_error_response(&err, &ctx.realm)
        }
    }
}

/// Case-insensitive view of the request headers; non-UTF-8 values are skipped
pub fn header_view(headers: &hyper::HeaderMap) -> HeaderMap {
    headers
        .keys()
        .filter_map(|name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| (name.as_str(), value))
        })
        .collect()
}

/// `WWW-Authenticate` challenge for a failed extraction (RFC 6750 §3)
pub fn challenge(realm: &str, err: &ExtractionError) -> String {
    match err.oauth_error_code() {
        None => format!(r#"Bearer realm="{realm}""#),
        Some(code) => format!(
            r#"Bearer realm="{realm}", error="{code}", error_description="{}""#,
            err.reason()
        ),
    }
}

pub fn extraction_error_response(
    err: &ExtractionError,
    realm: &str,
) -> ServerResult<Response<Full<Bytes>>> {
    let (status, code) = match err.status() {
        ErrorStatus::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        ErrorStatus::BadRequest => (StatusCode::BAD_REQUEST, "invalid_request"),
    };
    error_response(status, code, &err.to_string(), Some(challenge(realm, err)))
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    challenge: Option<String>,
) -> ServerResult<Response<Full<Bytes>>> {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
        }
    });

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(challenge) = challenge {
        builder = builder.header(header::WWW_AUTHENTICATE, challenge);
    }
    Ok(builder.body(Full::new(Bytes::from(serde_json::to_string(&body)?)))?)
}

fn payload_too_large(limit: usize) -> ServerResult<Response<Full<Bytes>>> {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "payload_too_large",
        &format!("Request body exceeds maximum size of {limit} bytes"),
        None,
    )
}

fn health_check() -> ServerResult<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(
            r#"{"status":"healthy","service":"oauth2-bearer"}"#,
        )))?)
}
