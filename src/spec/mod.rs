//! Data model for the API description and fixtures that drive the stub.
//!
//! [`Api`] holds the path → verb → operation table and the components
//! catalogue; [`Fixtures`] holds one canonical sample document per resource.
//! Both are loaded once at startup and shared read-only for the process
//! lifetime.

mod load;
mod types;

pub use load::{load_api, load_fixtures};
pub use types::{
    Api, Components, Fixtures, MediaType, Operation, PathItem, RequestBody, ResponseDef, Schema,
    SchemaKind, SchemaType,
};
