use super::request::{parse_request, ParsedRequest};
use super::response::{encode_body, is_curl, status_reason, ApiError};
use crate::expansion::extract_expansions;
use crate::generator::DataGenerator;
use crate::param::{coerce_params, parse_form_string};
use crate::router::Router;
use crate::spec::{Api, Fixtures};
use crate::validator::validate;
use base64::{engine::general_purpose, Engine as _};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

fn invalid_authorization_message(auth: &str) -> String {
    format!(
        "Please authenticate by specifying an `Authorization` header with any \
         valid looking testmode secret API key. For example, `Authorization: \
         Bearer sk_test_123`. Authorization was '{auth}'."
    )
}

fn invalid_route_message(method: &str, path: &str) -> String {
    format!("Unrecognized request URL ({method}: {path}).")
}

/// Serves stubbed responses for every operation in a loaded API description.
///
/// All fields are established at startup and read-only afterwards; the
/// service clones per worker without synchronization.
#[derive(Clone)]
pub struct StubServer {
    api: Arc<Api>,
    fixtures: Arc<Fixtures>,
    router: Arc<Router>,
    verbose: bool,
    /// Preformatted `Stripe-Mock-Version: <version>` line. Leaked once at
    /// construction because the HTTP layer takes only `'static` headers.
    version_header: &'static str,
}

impl StubServer {
    pub fn new(api: Arc<Api>, fixtures: Arc<Fixtures>, verbose: bool, version: &str) -> Self {
        let router = Arc::new(Router::new(&api));
        let version_header: &'static str =
            Box::leak(format!("Stripe-Mock-Version: {version}").into_boxed_str());
        StubServer {
            api,
            fixtures,
            router,
            verbose,
            version_header,
        }
    }

    fn handle(&self, parsed: ParsedRequest, res: &mut Response) -> io::Result<()> {
        let start = Instant::now();
        info!(method = %parsed.method, path = %parsed.path, "request received");

        let auth = parsed.header("authorization");
        if !validate_auth(auth) {
            let error = ApiError::invalid_request(invalid_authorization_message(auth));
            return self.write_response(res, &parsed, start, 401, &error.to_value());
        }

        // every authorized response carries the fixed request id
        res.header("Request-Id: req_123");

        let method = parsed.method.parse::<Method>().ok();
        let matched = method
            .as_ref()
            .and_then(|m| self.router.route(m, &parsed.path));
        let Some((route, primary_id)) = matched else {
            let error = ApiError::invalid_request(invalid_route_message(
                &parsed.method,
                &parsed.path,
            ));
            return self.write_response(res, &parsed, start, 404, &error.to_value());
        };

        let Some(response_schema) = route.operation.ok_response_schema() else {
            error!(path = %route.path, "operation has no 200 application/json schema");
            return self.write_response(res, &parsed, start, 500, &ApiError::internal().to_value());
        };

        if self.verbose {
            debug!(route = %route.path, primary_id = ?primary_id, "route matched");
        }

        let form_string = if parsed.method == "GET" || parsed.method == "DELETE" {
            &parsed.query
        } else {
            &parsed.body
        };
        let request_data = match parse_form_string(form_string) {
            Ok(data) => data,
            Err(err) => {
                error!(error = %err, "could not parse request payload");
                return self.write_response(
                    res,
                    &parsed,
                    start,
                    500,
                    &ApiError::internal().to_value(),
                );
            }
        };
        if self.verbose {
            debug!(payload = %form_string, "request payload");
        }

        let request_data = if let Some(body_schema) = route.operation.form_request_schema() {
            let coerced = match coerce_params(body_schema, request_data) {
                Ok(data) => data,
                Err(err) => {
                    debug!(error = %err, "coercion failed");
                    let error = ApiError::invalid_request(format!("Request error: {err}"));
                    return self.write_response(res, &parsed, start, 400, &error.to_value());
                }
            };
            if let Some(validator) = &route.validator {
                if let Err(err) = validate(validator, &coerced) {
                    debug!(error = %err, "validation failed");
                    let error = ApiError::invalid_request(format!("Request error: {err}"));
                    return self.write_response(res, &parsed, start, 400, &error.to_value());
                }
            }
            coerced
        } else {
            request_data
        };

        let (expansions, raw_expansions) = extract_expansions(&request_data);
        if self.verbose {
            debug!(expansions = ?raw_expansions, "expansions requested");
        }

        let generator = DataGenerator::new(&self.api.components.schemas, &self.fixtures);
        match generator.generate(
            response_schema,
            &parsed.path,
            primary_id.as_deref(),
            expansions.as_ref(),
        ) {
            Ok(data) => self.write_response(res, &parsed, start, 200, &data),
            Err(err) => {
                error!(error = %err, "response generation failed");
                self.write_response(res, &parsed, start, 500, &ApiError::internal().to_value())
            }
        }
    }

    fn write_response(
        &self,
        res: &mut Response,
        parsed: &ParsedRequest,
        start: Instant,
        status: u16,
        data: &Value,
    ) -> io::Result<()> {
        let pretty = is_curl(parsed.header("user-agent"));
        let (status, encoded) = match encode_body(data, pretty) {
            Ok(bytes) => (status, bytes),
            Err(err) => {
                error!(error = %err, "could not serialize response");
                (500, ApiError::internal().to_value().to_string().into_bytes())
            }
        };

        res.status_code(status as usize, status_reason(status));
        res.header(self.version_header);
        res.header("Content-Type: application/json");
        res.body_vec(encoded);

        info!(
            status = status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "response written"
        );
        Ok(())
    }
}

impl HttpService for StubServer {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        self.handle(parsed, res)
    }
}

/// Accept `Bearer <key>` or `Basic <base64 key>` where the key splits on
/// `_` into exactly `sk`, `test`, and a non-empty remainder. Anything else
/// is rejected.
pub fn validate_auth(auth: &str) -> bool {
    if auth.is_empty() {
        return false;
    }

    let parts: Vec<&str> = auth.split(' ').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return false;
    }

    let key = match parts[0] {
        "Basic" => {
            let Ok(decoded) = general_purpose::STANDARD.decode(parts[1]) else {
                return false;
            };
            match String::from_utf8(decoded) {
                Ok(key) => key,
                Err(_) => return false,
            }
        }
        "Bearer" => parts[1].to_string(),
        _ => return false,
    };

    let key_parts: Vec<&str> = key.split('_').collect();
    key_parts.len() == 3
        && key_parts[0] == "sk"
        && key_parts[1] == "test"
        && !key_parts[2].is_empty()
}
