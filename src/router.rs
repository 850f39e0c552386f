//! Route compilation and dispatch: OpenAPI path templates become anchored
//! regexes at startup, bucketed by verb, and matched in registration order.

use crate::spec::{Api, Operation};
use crate::validator::compile_request_validator;
use http::Method;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Path suffixes that signal the URL carries the primary id of the returned
/// object: a trailing template parameter, or one of the action verbs that
/// place the id immediately before them.
const ENDS_WITH_ID_SUFFIXES: &[&str] = &["}", "/close", "/pay"];

/// A whole segment that is a template parameter, e.g. `{id}`.
static PATH_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{(\w+)\}$").expect("path parameter pattern"));

/// One compiled entry in the routing table.
pub struct StubRoute {
    /// Template the route was compiled from, for logs.
    pub path: String,
    /// Fully anchored pattern with one named capture per template parameter.
    pub pattern: Regex,
    /// Whether the last capture group holds the primary object id.
    pub ends_with_id: bool,
    pub operation: Operation,
    /// Compiled request-body validator; absent when the operation has no
    /// form body or its schema does not compile.
    pub validator: Option<JSONSchema>,
}

/// Verb-bucketed routing table, built once from a loaded API description and
/// read-only afterwards.
pub struct Router {
    routes: HashMap<Method, Vec<Arc<StubRoute>>>,
}

impl Router {
    pub fn new(api: &Api) -> Self {
        let mut routes: HashMap<Method, Vec<Arc<StubRoute>>> = HashMap::new();
        let mut num_paths = 0usize;
        let mut num_endpoints = 0usize;
        let mut num_validators = 0usize;

        for (path, item) in &api.paths {
            num_paths += 1;
            let pattern = compile_path(path);
            debug!(path = %path, pattern = %pattern, "compiled path");

            let ends_with_id = ENDS_WITH_ID_SUFFIXES
                .iter()
                .any(|suffix| path.ends_with(suffix));

            for (method, operation) in item.methods() {
                num_endpoints += 1;

                let validator = operation
                    .form_request_schema()
                    .and_then(|schema| compile_request_validator(schema, &api.components));
                if validator.is_some() {
                    num_validators += 1;
                }

                routes.entry(method).or_default().push(Arc::new(StubRoute {
                    path: path.clone(),
                    pattern: pattern.clone(),
                    ends_with_id,
                    operation: operation.clone(),
                    validator,
                }));
            }
        }

        info!(
            paths = num_paths,
            endpoints = num_endpoints,
            validators = num_validators,
            "routing table compiled"
        );

        Router { routes }
    }

    /// Find the first registered route matching `method` + `path`.
    ///
    /// When the route's template ends with a parameter or a recognized
    /// action, the last capture group is returned as the primary object id.
    pub fn route(&self, method: &Method, path: &str) -> Option<(Arc<StubRoute>, Option<String>)> {
        let bucket = self.routes.get(method)?;
        for route in bucket {
            let Some(captures) = route.pattern.captures(path) else {
                continue;
            };
            if !route.ends_with_id {
                return Some((Arc::clone(route), None));
            }
            let id = captures
                .get(captures.len() - 1)
                .map(|m| m.as_str().to_string());
            return Some((Arc::clone(route), id));
        }
        None
    }
}

/// Compile a path template like `/v1/charges/{id}/capture` into an anchored
/// regex with a named capture group per parameter.
///
/// The parameter character class is deliberately narrow: ids in this API
/// family never span slashes or carry punctuation beyond `_ . -`, and a
/// wider class would swallow neighboring segments.
pub fn compile_path(template: &str) -> Regex {
    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');
    for segment in template.split('/') {
        if segment.is_empty() {
            continue;
        }
        if let Some(captures) = PATH_PARAMETER.captures(segment) {
            pattern.push_str("/(?P<");
            pattern.push_str(&captures[1]);
            pattern.push_str(r">[A-Za-z0-9_.\-]+)");
        } else {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }
    pattern.push('$');
    Regex::new(&pattern).expect("compiled path template")
}
