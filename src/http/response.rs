use std::collections::HashMap;

/// HTTP status codes this server emits.
///
/// The set is closed on purpose; every connection ends in exactly one of:
/// - `Ok` (200): the file is being served
/// - `MethodNotAllowed` (405): the request was not GET or HEAD
/// - `InternalServerError` (500): the served file could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use streamix::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use streamix::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::InternalServerError.reason_phrase(), "Internal Server Error");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete HTTP response ready to be serialized.
///
/// The inline `body` only carries the short fixed texts (405, 500). A served
/// file is never buffered here: the 200 response states the length in an
/// explicit `Content-Length` header, keeps the inline body empty, and the
/// transfer engine streams the file bytes after the headers.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Inline response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use streamix::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::MethodNotAllowed)
///     .header("Allow", "GET, HEAD")
///     .body(b"405 Method Not Allowed".to_vec())
///     .build();
/// assert_eq!(response.headers.get("Connection").map(String::as_str), Some("close"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the inline response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// `Content-Length` is derived from the inline body only when that body is
    /// non-empty; a response whose body is streamed separately supplies the
    /// header itself via [`ResponseBuilder::header`]. Every response closes
    /// the connection, so `Connection: close` is always set last.
    pub fn build(mut self) -> Response {
        if !self.body.is_empty() {
            self.headers
                .entry("Content-Length".to_string())
                .or_insert_with(|| self.body.len().to_string());
        }
        self.headers
            .insert("Connection".to_string(), "close".to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates the 200 response announcing `len` bytes to be streamed.
    ///
    /// The inline body stays empty; the caller streams the file bytes once
    /// these headers are on the wire.
    pub fn ok_stream(len: u64) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Length", len.to_string())
            .header("Content-Type", "application/octet-stream")
            .build()
    }

    /// Creates the 405 response for anything that is not GET or HEAD.
    pub fn method_not_allowed() -> Self {
        ResponseBuilder::new(StatusCode::MethodNotAllowed)
            .header("Allow", "GET, HEAD")
            .header("Content-Type", "text/plain")
            .body(b"405 Method Not Allowed".to_vec())
            .build()
    }

    /// Creates the 500 response for a served file that cannot be opened.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .header("Content-Type", "text/plain")
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }
}
