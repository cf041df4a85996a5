//! Request parsing.
//!
//! # Responsibilities
//! - Decode the bytes of a single bounded read into a `Request`
//! - Reject a malformed request line with a distinct `ParseError`
//! - Parse headers best-effort (malformed header lines are skipped)
//! - Expose form-encoded bodies as key/value pairs
//!
//! # Wire Format
//! ```text
//! METHOD SP TARGET SP VERSION CRLF
//! Name: value CRLF
//! ...
//! CRLF
//! body
//! ```

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

const LINE_SEPARATOR: &str = "\r\n";
const HEADER_SEPARATOR: &str = ": ";

/// Errors that abort a connection before any routing happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The peer closed the connection without sending anything.
    #[error("empty request")]
    Empty,

    /// The request bytes are not valid UTF-8.
    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    /// The request line does not split into method, target and version.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// The request target is not an absolute path.
    #[error("request target must start with '/': {0:?}")]
    InvalidTarget(String),
}

/// HTTP request method.
///
/// Only GET and POST are served; any other token is kept verbatim so the
/// router can treat it like any unmatched request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(token) => token,
        }
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered header map.
///
/// Names compare case-insensitively. Inserting an existing name replaces its
/// value in place, so the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A parsed request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    version: String,
    headers: Headers,
    body: String,
}

impl Request {
    /// Parse the raw bytes read from a freshly accepted connection.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }
        let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidEncoding)?;

        let mut lines = text.split(LINE_SEPARATOR);
        let request_line = lines.next().unwrap_or_default();

        let parts: Vec<&str> = request_line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::MalformedRequestLine(request_line.to_string()));
        };
        if !target.starts_with('/') {
            return Err(ParseError::InvalidTarget(target.to_string()));
        }
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        let mut headers = Headers::new();
        let mut body_lines = Vec::new();
        let mut in_body = false;
        for line in lines {
            if in_body {
                body_lines.push(line);
                continue;
            }
            if line.is_empty() {
                in_body = true;
                continue;
            }
            match line.split_once(HEADER_SEPARATOR) {
                Some((name, value)) => headers.insert(name, value),
                None => tracing::debug!(line = %line, "Skipping malformed header line"),
            }
        }

        Ok(Self {
            method: Method::from(method),
            path: path.to_string(),
            query,
            version: version.to_string(),
            headers,
            body: body_lines.join(LINE_SEPARATOR),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string. Always starts with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Protocol version as sent; not validated.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// When a key repeats, the first value is kept.
    pub fn form(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(self.body.as_bytes()) {
            fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_request() {
        let raw = b"GET /usuarios HTTP/1.1\r\nHost: localhost:8080\r\nAccept: */*\r\n\r\n";
        let req = Request::parse(raw).unwrap();

        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/usuarios");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.headers().get("host"), Some("localhost:8080"));
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.body(), "");
    }

    #[test]
    fn parses_post_body() {
        let raw = b"POST /usuarios HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\nnome=Ana&email=a%40b.com&telefone=123";
        let req = Request::parse(raw).unwrap();

        assert_eq!(req.method(), &Method::Post);
        assert_eq!(req.body(), "nome=Ana&email=a%40b.com&telefone=123");

        let form = req.form();
        assert_eq!(form.get("nome").map(String::as_str), Some("Ana"));
        assert_eq!(form.get("email").map(String::as_str), Some("a@b.com"));
        assert_eq!(form.get("telefone").map(String::as_str), Some("123"));
    }

    #[test]
    fn body_lines_are_rejoined() {
        let raw = b"POST /x HTTP/1.1\r\n\r\nline one\r\n\r\nline two";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.body(), "line one\r\n\r\nline two");
    }

    #[test]
    fn duplicate_headers_last_wins() {
        let raw = b"GET / HTTP/1.1\r\nX-Token: first\r\nx-token: second\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.headers().get("X-Token"), Some("second"));
        assert_eq!(req.headers().len(), 1);
    }

    #[test]
    fn missing_blank_line_treats_rest_as_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\nAccept: b";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.headers().get("accept"), Some("b"));
        assert_eq!(req.body(), "");
    }

    #[test]
    fn malformed_header_lines_are_skipped() {
        let raw = b"GET / HTTP/1.1\r\nnot-a-header\r\nHost: a\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.headers().get("host"), Some("a"));
    }

    #[test]
    fn header_value_keeps_later_separators() {
        let raw = b"GET / HTTP/1.1\r\nX-Note: a: b\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.headers().get("x-note"), Some("a: b"));
    }

    #[test]
    fn query_is_split_from_path() {
        let req = Request::parse(b"GET /usuarios?page=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path(), "/usuarios");
        assert_eq!(req.query(), Some("page=2"));
    }

    #[test]
    fn malformed_request_line_is_an_error() {
        assert_eq!(
            Request::parse(b"GET /usuarios\r\n\r\n"),
            Err(ParseError::MalformedRequestLine("GET /usuarios".to_string()))
        );
        assert!(matches!(
            Request::parse(b"GET /a b HTTP/1.1\r\n\r\n"),
            Err(ParseError::MalformedRequestLine(_))
        ));
        assert!(matches!(
            Request::parse(b"garbage"),
            Err(ParseError::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn empty_and_invalid_input() {
        assert_eq!(Request::parse(b""), Err(ParseError::Empty));
        assert_eq!(
            Request::parse(b"GET /\xff HTTP/1.1\r\n\r\n"),
            Err(ParseError::InvalidEncoding)
        );
        assert_eq!(
            Request::parse(b"GET usuarios HTTP/1.1\r\n\r\n"),
            Err(ParseError::InvalidTarget("usuarios".to_string()))
        );
    }

    #[test]
    fn unknown_method_is_preserved() {
        let req = Request::parse(b"DELETE /usuarios/1 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method(), &Method::Other("DELETE".to_string()));
        assert_eq!(req.method().to_string(), "DELETE");
    }

    #[test]
    fn headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("a", "3");
        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(collected, vec![("A", "3"), ("B", "2")]);
    }
}
