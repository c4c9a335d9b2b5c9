pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod transport;
pub mod types;

pub use error::{ErrorStatus, ExtractionError, ServerError, ServerResult};
pub use extractor::{HeaderMap, ParamMap, TokenExtractor, extract_token};
