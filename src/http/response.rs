//! Response building and serialization.
//!
//! # Responsibilities
//! - Carry the handler's reply (status, extra headers, body)
//! - Apply the server's default headers
//! - Serialize status line, headers and body to wire bytes
//!
//! # Design Decisions
//! - Only 200, 302, 400 and 404 have their own reason phrase; every other
//!   code is written as "Internal Server Error"
//! - Content-Length is the UTF-8 byte length of the body, omitted when empty
//! - Headers are written in insertion order

use std::fmt;

use crate::http::request::Headers;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const LOCATION: &str = "Location";
pub const SERVER: &str = "Server";

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Numeric HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Reason phrase written on the status line.
    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            302 => "Found",
            400 => "Bad Request",
            404 => "Not Found",
            _ => "Internal Server Error",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// What a handler wants sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: StatusCode,
    headers: Headers,
    body: String,
}

impl Reply {
    pub fn new(status: impl Into<StatusCode>, body: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// 302 to `location` with an empty body.
    pub fn redirect(location: impl Into<String>) -> Self {
        let mut reply = Self::new(StatusCode::FOUND, String::new());
        reply.headers.insert(LOCATION, location);
        reply
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A response being assembled for one connection.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: String,
}

impl Response {
    /// Start a response carrying the default headers.
    pub fn new(server_name: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        headers.insert(SERVER, server_name);
        Self {
            status: StatusCode::OK,
            headers,
            body: String::new(),
        }
    }

    /// Merge a handler reply into this response.
    pub fn apply(mut self, reply: Reply) -> Self {
        self.status = reply.status;
        for (name, value) in reply.headers.iter() {
            self.headers.insert(name, value);
        }
        self.body = reply.body;
        if !self.body.is_empty() {
            self.headers.insert(CONTENT_LENGTH, self.body.len().to_string());
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(reply: Reply) -> String {
        String::from_utf8(Response::new("test-server").apply(reply).to_bytes()).unwrap()
    }

    #[test]
    fn reason_phrases() {
        assert_eq!(StatusCode::OK.reason(), "OK");
        assert_eq!(StatusCode::FOUND.reason(), "Found");
        assert_eq!(StatusCode::BAD_REQUEST.reason(), "Bad Request");
        assert_eq!(StatusCode::NOT_FOUND.reason(), "Not Found");
        assert_eq!(StatusCode::new(201).reason(), "Internal Server Error");
        assert_eq!(StatusCode::new(500).reason(), "Internal Server Error");
    }

    #[test]
    fn serializes_in_insertion_order() {
        let out = wire(Reply::ok("hello").with_header("X-Extra", "1"));
        assert_eq!(
            out,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             Server: test-server\r\n\
             X-Extra: 1\r\n\
             Content-Length: 5\r\n\
             \r\n\
             hello"
        );
    }

    #[test]
    fn content_length_counts_encoded_bytes() {
        let body = "Página não encontrada.";
        let response = Response::new("s").apply(Reply::not_found(body));
        assert_eq!(
            response.headers().get(CONTENT_LENGTH),
            Some(body.len().to_string().as_str())
        );
        assert_ne!(body.len(), body.chars().count());
    }

    #[test]
    fn empty_body_has_no_content_length() {
        let response = Response::new("s").apply(Reply::ok(""));
        assert!(!response.headers().contains(CONTENT_LENGTH));
        assert!(response.to_bytes().ends_with(b"\r\n\r\n"));
    }

    #[test]
    fn redirect_is_302_with_location() {
        let out = wire(Reply::redirect("/usuarios"));
        assert!(out.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(out.contains("Location: /usuarios\r\n"));
        assert!(!out.contains(CONTENT_LENGTH));
        assert!(out.ends_with("\r\n\r\n"));
    }

    #[test]
    fn unknown_status_falls_back() {
        let out = wire(Reply::new(503u16, "down"));
        assert!(out.starts_with("HTTP/1.1 503 Internal Server Error\r\n"));
    }

    #[test]
    fn reply_can_override_content_type() {
        let response = Response::new("s")
            .apply(Reply::ok("plain").with_header("content-type", "text/plain"));
        assert_eq!(response.headers().get(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(response.headers().len(), 3);
    }
}
