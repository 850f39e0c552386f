use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;

/// Everything the handler pipeline needs out of a raw HTTP request: the
/// verb, the path split from its query string, lowercased headers, and the
/// fully read body.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ParsedRequest {
    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Extract the pieces of a `may_minihttp` request the stub consumes. The
/// body is read to completion here so nothing downstream touches the socket.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_ascii_uppercase();
    let raw_path = req.path().to_string();
    let (path, query) = match raw_path.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (raw_path, String::new()),
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let mut body = String::new();
    let _ = req.body().read_to_string(&mut body);

    ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
    }
}
