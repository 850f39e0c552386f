//! HTTP surface of the stub: request parsing, the handler pipeline, and a
//! thin wrapper over `may_minihttp` for starting and stopping the server.
//!
//! Each request is handled to completion on one coroutine. The routing
//! table, API description, and fixtures are shared read-only, so concurrent
//! requests need no synchronization.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::{validate_auth, StubServer};
