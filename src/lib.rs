pub mod cli;
pub mod expansion;
pub mod generator;
pub mod param;
pub mod router;
pub mod server;
pub mod spec;
pub mod validator;

pub use expansion::{extract_expansions, parse_expansion_level, ExpansionLevel};
pub use generator::{DataGenerator, GenerateError};
pub use router::{compile_path, Router, StubRoute};
pub use server::{HttpServer, ServerHandle, StubServer};
pub use spec::{load_api, load_fixtures, Api, Fixtures, Schema, SchemaKind};
