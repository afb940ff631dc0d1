use std::time::Duration;

use crate::error::RequestError;

/// Fixed response preamble, emitted for every request.
///
/// The trailing `\r\n\n` is the historical header terminator of this
/// protocol; clients depend on the exact byte sequence.
pub const RESPONSE_PREAMBLE: &str = "HTTP/1.1 200 OK\r\nAccess-Control-Allow-Origin: *\r\n\n";

/// Separates the ignored header block from the body.
pub const BODY_DELIMITER: &[u8] = b"\r\n\r\n";

/// Default bound on a captured request body.
pub const DEFAULT_MAX_BODY: usize = 4096;

/// Bound on handler output appended to the response preamble.
pub const MAX_RESPONSE_BODY: usize = 4096;

/// Request method. Unrecognized tokens map to [`Method::Unknown`], which
/// still routes — endpoint matching is method-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Unknown,
}

impl Method {
    /// Case-sensitive token match, like the wire protocol.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Unknown,
        }
    }
}

/// One parsed request: method, endpoint path, bounded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub body: String,
}

/// Connection-level protocol bounds.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum captured body bytes; longer bodies are truncated, not errors.
    pub max_body_size: usize,
    /// Size of the per-connection receive buffer.
    pub request_buffer_size: usize,
    /// Read timeout for a connection.
    pub read_timeout: Option<Duration>,
    /// Write timeout for a connection.
    pub write_timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY,
            request_buffer_size: 8 * 1024,
            read_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Parse a raw request buffer.
///
/// The first line is split on whitespace into method, endpoint and protocol
/// version (the version is ignored). Everything after the first
/// [`BODY_DELIMITER`] is the body, captured verbatim up to `max_body` bytes —
/// truncation, not an error, on overflow. A missing delimiter means an empty
/// body; there is no length negotiation.
pub fn parse_request(raw: &[u8], max_body: usize) -> Result<Request, RequestError> {
    let line_end = raw.iter().position(|&b| b == b'\n').unwrap_or(raw.len());
    let first_line = String::from_utf8_lossy(&raw[..line_end]);
    let mut tokens = first_line.split_whitespace();
    let (Some(method), Some(endpoint)) = (tokens.next(), tokens.next()) else {
        return Err(RequestError::MissingRequestLine);
    };

    let method = Method::from_token(method);
    let endpoint = endpoint.to_string();

    let body = match find_delimiter(raw) {
        Some(start) => {
            let body = &raw[start + BODY_DELIMITER.len()..];
            let bounded = &body[..body.len().min(max_body)];
            String::from_utf8_lossy(bounded).into_owned()
        }
        None => String::new(),
    };

    Ok(Request {
        method,
        endpoint,
        body,
    })
}

/// Build the response: fixed preamble plus bounded handler output.
///
/// Always the success preamble — this protocol has no other status line, a
/// documented limitation rather than an omission.
pub fn build_response(body: &str) -> String {
    let body = truncate_at_char_boundary(body, MAX_RESPONSE_BODY);
    let mut response = String::with_capacity(RESPONSE_PREAMBLE.len() + body.len());
    response.push_str(RESPONSE_PREAMBLE);
    response.push_str(body);
    response
}

fn find_delimiter(raw: &[u8]) -> Option<usize> {
    raw.windows(BODY_DELIMITER.len())
        .position(|window| window == BODY_DELIMITER)
}

fn truncate_at_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_body() {
        let raw = b"POST /motors HTTP/1.1\r\nHost: node\r\n\r\n1.0,2.0,3.0,4.0";
        let request = parse_request(raw, DEFAULT_MAX_BODY).expect("request should parse");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.endpoint, "/motors");
        assert_eq!(request.body, "1.0,2.0,3.0,4.0");
    }

    #[test]
    fn missing_delimiter_yields_empty_body() {
        let raw = b"GET /duty HTTP/1.1\r\nHost: node\r\n";
        let request = parse_request(raw, DEFAULT_MAX_BODY).expect("request should parse");

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.endpoint, "/duty");
        assert_eq!(request.body, "");
    }

    #[test]
    fn unrecognized_method_maps_to_unknown_and_still_parses() {
        let raw = b"BREW /teapot HTTP/1.1\r\n\r\n";
        let request = parse_request(raw, DEFAULT_MAX_BODY).expect("request should parse");

        assert_eq!(request.method, Method::Unknown);
        assert_eq!(request.endpoint, "/teapot");
    }

    #[test]
    fn method_match_is_case_sensitive() {
        assert_eq!(Method::from_token("get"), Method::Unknown);
        assert_eq!(Method::from_token("GET"), Method::Get);
    }

    #[test]
    fn oversized_body_truncates_at_exact_bound() {
        let mut raw = b"POST /motors HTTP/1.1\r\n\r\n".to_vec();
        raw.extend(std::iter::repeat(b'x').take(10_000));

        let request = parse_request(&raw, 128).expect("request should parse");
        assert_eq!(request.body.len(), 128);
        assert!(request.body.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn empty_buffer_is_a_missing_request_line() {
        let err = parse_request(b"", DEFAULT_MAX_BODY).expect_err("should fail");
        assert!(matches!(err, RequestError::MissingRequestLine));
    }

    #[test]
    fn lone_method_token_is_a_missing_request_line() {
        let err = parse_request(b"GET\r\n\r\n", DEFAULT_MAX_BODY).expect_err("should fail");
        assert!(matches!(err, RequestError::MissingRequestLine));
    }

    #[test]
    fn response_starts_with_exact_preamble() {
        let response = build_response("");
        assert_eq!(response, RESPONSE_PREAMBLE);
        assert!(response.ends_with("\r\n\n"));
    }

    #[test]
    fn response_appends_handler_output_verbatim() {
        let response = build_response("ok");
        assert_eq!(
            response,
            format!("{RESPONSE_PREAMBLE}ok")
        );
    }

    #[test]
    fn response_bounds_handler_output() {
        let huge = "y".repeat(MAX_RESPONSE_BODY + 500);
        let response = build_response(&huge);
        assert_eq!(response.len(), RESPONSE_PREAMBLE.len() + MAX_RESPONSE_BODY);
    }
}
