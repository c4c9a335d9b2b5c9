//! HTTP collaborator around the extractor
//!
//! Decodes requests into header, query and body maps and maps extraction
//! outcomes onto HTTP responses.

pub mod body;
pub mod http;

pub use self::http::HttpTransport;
