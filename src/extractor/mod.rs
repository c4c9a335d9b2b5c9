//! OAuth 2.0 bearer token extraction (RFC 6750 §2)
//!
//! A request may carry its access token in the Authorization header, in the
//! `access_token` query parameter, or in the `access_token` field of a
//! form-encoded body. Exactly one of those channels must be used.
//!
//! Extraction is a pure function of its four inputs: no I/O, no shared state,
//! safe to call from any number of request handlers at once.

pub mod arbiter;
pub mod header_map;
pub mod probe;

pub use header_map::HeaderMap;
pub use probe::{ACCESS_TOKEN_PARAM, AUTHORIZATION_HEADER, BEARER_SCHEME, Channel, Probe};

use crate::error::ExtractionError;
use std::collections::HashMap;

/// Flat string mapping used for decoded query strings and bodies
pub type ParamMap = HashMap<String, String>;

/// A token and the channel it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundToken<'a> {
    pub channel: Channel,
    pub value: &'a str,
}

/// Borrowed view over everything extraction depends on
#[derive(Debug, Clone, Copy)]
pub struct TokenExtractor<'a> {
    headers: &'a HeaderMap,
    query: &'a ParamMap,
    body: &'a ParamMap,
    form_encoded: bool,
}

impl<'a> TokenExtractor<'a> {
    /// `form_encoded` must be true only for `application/x-www-form-urlencoded`
    /// bodies; any other body is never searched.
    pub fn new(
        headers: &'a HeaderMap,
        query: &'a ParamMap,
        body: &'a ParamMap,
        form_encoded: bool,
    ) -> Self {
        Self {
            headers,
            query,
            body,
            form_encoded,
        }
    }

    pub fn probes(&self) -> [Probe<'a>; 3] {
        [
            Probe::Header(self.headers),
            Probe::Query(self.query),
            Probe::Body {
                fields: self.body,
                form_encoded: self.form_encoded,
            },
        ]
    }

    /// Find the single token and report which channel supplied it
    pub fn locate(&self) -> Result<FoundToken<'a>, ExtractionError> {
        arbiter::arbitrate(
            self.probes()
                .into_iter()
                .map(|probe| (probe.channel(), probe.try_find())),
        )
    }

    pub fn extract(&self) -> Result<String, ExtractionError> {
        self.locate().map(|found| found.value.to_string())
    }
}

/// Extract the access token from a request's headers, query and parsed body
///
/// # Errors
/// * [`ExtractionError::Unauthorized`] when no channel carries a token
/// * [`ExtractionError::BadRequest`] when more than one does
///
/// # Examples
/// ```
/// use oauth2_bearer::extractor::{HeaderMap, ParamMap, extract_token};
///
/// let headers: HeaderMap = [("Authorization", "Bearer token")].into_iter().collect();
/// let token = extract_token(&headers, &ParamMap::new(), &ParamMap::new(), false);
/// assert_eq!(token.unwrap(), "token");
/// ```
pub fn extract_token(
    headers: &HeaderMap,
    query: &ParamMap,
    body: &ParamMap,
    is_form_encoded_body: bool,
) -> Result<String, ExtractionError> {
    TokenExtractor::new(headers, query, body, is_form_encoded_body).extract()
}
