use std::io::{self, Read};

/// How much of a request the server reads: one buffer, one read.
///
/// The method is decided from whatever the first read returns; the rest of
/// the request (remaining headers, any body) is never consumed. The response
/// closes the connection anyway, so unread bytes are discarded with it.
pub const REQUEST_BUFFER_LEN: usize = 4096;

/// The three classes a request can fall into.
///
/// The server never parses a request line. Only the method prefix matters:
/// the path, version and headers have no influence on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Starts with `GET ` - headers plus the streamed file.
    Get,
    /// Starts with `HEAD ` - headers only, identical to the GET headers.
    Head,
    /// Anything else, including truncated or non-HTTP bytes.
    Unsupported,
}

impl RequestKind {
    /// Classifies the opening bytes of a request.
    ///
    /// Matching is byte-exact: the prefix must include the space after the
    /// method name, and lowercase verbs do not count.
    ///
    /// # Example
    ///
    /// ```
    /// # use streamix::http::request::RequestKind;
    /// assert_eq!(RequestKind::classify(b"GET / HTTP/1.1\r\n"), RequestKind::Get);
    /// assert_eq!(RequestKind::classify(b"get / HTTP/1.1\r\n"), RequestKind::Unsupported);
    /// ```
    pub fn classify(first_bytes: &[u8]) -> RequestKind {
        if first_bytes.starts_with(b"HEAD ") {
            RequestKind::Head
        } else if first_bytes.starts_with(b"GET ") {
            RequestKind::Get
        } else {
            RequestKind::Unsupported
        }
    }

    /// Whether a response to this request carries the file bytes.
    pub fn wants_body(self) -> bool {
        matches!(self, RequestKind::Get)
    }
}

/// Performs the single classifying read from the peer.
///
/// Returns `Ok(None)` when the peer closed without sending anything; such a
/// connection gets no response at all. A successful read of any length
/// classifies via [`RequestKind::classify`].
pub fn read_request_kind<R: Read>(conn: &mut R) -> io::Result<Option<RequestKind>> {
    let mut buf = [0u8; REQUEST_BUFFER_LEN];
    let n = conn.read(&mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(RequestKind::classify(&buf[..n])))
}
