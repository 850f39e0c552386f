//! Request parameter handling: decoding URL-encoded payloads into a nested
//! document and coercing the resulting string leaves into the JSON types a
//! request-body schema demands.

pub mod coercer;
pub mod parser;

pub use coercer::{coerce_params, CoerceError};
pub use parser::{parse_form_string, ParseError};
