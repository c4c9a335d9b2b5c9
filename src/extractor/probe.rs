//! Token probes for the three RFC 6750 channels
//!
//! Each probe looks at exactly one input and answers the same question:
//! did this channel carry an access token? The arbiter only sees that answer.

use super::{HeaderMap, ParamMap};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Authorization scheme name, compared case-insensitively (RFC 6750 §2.1)
pub const BEARER_SCHEME: &str = "bearer";

/// Header carrying the credential
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Query and form field name (RFC 6750 §2.2, §2.3)
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Header,
    Query,
    Body,
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            Channel::Header => "header",
            Channel::Query => "query",
            Channel::Body => "body",
        };
        write!(f, "{name}")
    }
}

/// One lookup strategy bound to its input
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    Header(&'a HeaderMap),
    Query(&'a ParamMap),
    Body {
        fields: &'a ParamMap,
        form_encoded: bool,
    },
}

impl<'a> Probe<'a> {
    pub fn channel(&self) -> Channel {
        match self {
            Probe::Header(_) => Channel::Header,
            Probe::Query(_) => Channel::Query,
            Probe::Body { .. } => Channel::Body,
        }
    }

    /// Look for a token in this probe's input
    ///
    /// An empty `access_token` in the query or body is still a token; an empty
    /// credential after the bearer scheme is not.
    pub fn try_find(&self) -> Option<&'a str> {
        match *self {
            Probe::Header(headers) => headers
                .get(AUTHORIZATION_HEADER)
                .and_then(bearer_credential),
            Probe::Query(query) => query.get(ACCESS_TOKEN_PARAM).map(String::as_str),
            Probe::Body {
                fields,
                form_encoded,
            } => {
                if !form_encoded {
                    return None;
                }
                fields.get(ACCESS_TOKEN_PARAM).map(String::as_str)
            }
        }
    }
}

/// Extract the credential from an Authorization header value
///
/// The value must split on whitespace into exactly two parts: the bearer
/// scheme (any case) and a credential. Every other shape yields `None`.
///
/// # Examples
/// ```
/// use oauth2_bearer::extractor::probe::bearer_credential;
///
/// assert_eq!(bearer_credential("Bearer abc123"), Some("abc123"));
/// assert_eq!(bearer_credential("bearer lowercase"), Some("lowercase"));
/// assert_eq!(bearer_credential("Bearer "), None);
/// assert_eq!(bearer_credential("Basic auth"), None);
/// ```
pub fn bearer_credential(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let credential = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(credential)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bearer_credential() {
        // Recognized shapes
        assert_eq!(bearer_credential("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_credential("bearer lowercase"), Some("lowercase"));
        assert_eq!(bearer_credential("BEARER upper"), Some("upper"));
        assert_eq!(bearer_credential("Bearer   spaced"), Some("spaced"));
        assert_eq!(bearer_credential("Bearer\ttabbed"), Some("tabbed"));

        // Folded into "not found"
        assert_eq!(bearer_credential(""), None);
        assert_eq!(bearer_credential("Bearer"), None);
        assert_eq!(bearer_credential("Bearer "), None);
        assert_eq!(bearer_credential("Bearer    "), None);
        assert_eq!(bearer_credential("foo token"), None);
        assert_eq!(bearer_credential("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_credential("NotBearer token"), None);
        assert_eq!(bearer_credential("Bearer token extra"), None);
    }

    #[test]
    fn test_credential_is_not_altered() {
        assert_eq!(
            bearer_credential("Bearer a.b-c_d~e+f/g=="),
            Some("a.b-c_d~e+f/g==")
        );
    }

    #[test]
    fn test_header_probe() {
        let headers: HeaderMap = [("Authorization", "Bearer token")].into_iter().collect();
        let probe = Probe::Header(&headers);
        assert_eq!(probe.channel(), Channel::Header);
        assert_eq!(probe.try_find(), Some("token"));

        let empty = HeaderMap::new();
        assert_eq!(Probe::Header(&empty).try_find(), None);

        let other: HeaderMap = [("x-authorization", "Bearer token")].into_iter().collect();
        assert_eq!(Probe::Header(&other).try_find(), None);
    }

    #[test]
    fn test_query_probe_keeps_empty_value() {
        let query = params(&[("access_token", "")]);
        assert_eq!(Probe::Query(&query).try_find(), Some(""));

        let query = params(&[("token", "abc")]);
        assert_eq!(Probe::Query(&query).try_find(), None);
    }

    #[test]
    fn test_body_probe_requires_form_encoding() {
        let fields = params(&[("access_token", "token")]);

        let form = Probe::Body {
            fields: &fields,
            form_encoded: true,
        };
        assert_eq!(form.channel(), Channel::Body);
        assert_eq!(form.try_find(), Some("token"));

        let json = Probe::Body {
            fields: &fields,
            form_encoded: false,
        };
        assert_eq!(json.try_find(), None);

        let empty = params(&[("access_token", "")]);
        let form = Probe::Body {
            fields: &empty,
            form_encoded: true,
        };
        assert_eq!(form.try_find(), Some(""));
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Header.to_string(), "header");
        assert_eq!(Channel::Query.to_string(), "query");
        assert_eq!(Channel::Body.to_string(), "body");
        assert_eq!(serde_json::to_value(Channel::Body).unwrap(), "body");
    }
}
