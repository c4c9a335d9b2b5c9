//! Query string and request body decoding
//!
//! Turns raw request parts into the flat string maps the extractor consumes.

use crate::error::ServerResult;
use crate::extractor::ParamMap;
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Other,
}

impl BodyKind {
    pub fn is_form_encoded(&self) -> bool {
        matches!(self, BodyKind::Form)
    }
}

/// Classify a body by its Content-Type header, ignoring case and parameters
pub fn classify(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Other;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();

    if essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
        BodyKind::Json
    } else if essence.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// Decode a body of the given kind into a flat map
///
/// Bodies of any other kind are not read and produce an empty map.
pub fn parse_body(kind: BodyKind, body: &[u8]) -> ServerResult<ParamMap> {
    match kind {
        BodyKind::Json => parse_json(body),
        BodyKind::Form => Ok(parse_form(&String::from_utf8_lossy(body))),
        BodyKind::Other => Ok(ParamMap::new()),
    }
}

/// Flatten a JSON object body; strings are kept as-is, other values as JSON text
///
/// Well-formed JSON that is not an object carries no fields and yields an
/// empty map. Only text that fails to parse is an error.
pub fn parse_json(body: &[u8]) -> ServerResult<ParamMap> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParamMap::new());
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Object(object) => Ok(object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()),
        _ => Ok(ParamMap::new()),
    }
}

/// Decode `application/x-www-form-urlencoded` pairs; the last duplicate wins
pub fn parse_form(input: &str) -> ParamMap {
    let mut params = ParamMap::new();

    for pair in input.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key), decode_component(value));
    }

    params
}

/// Query strings use the same encoding as form bodies
pub fn parse_query(query: Option<&str>) -> ParamMap {
    query.map(parse_form).unwrap_or_default()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
