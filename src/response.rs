use std::fmt;
use std::io::{self, Write};

use crate::headers::Headers;

/// An HTTP response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const BAD_REQUEST: Self = Self(400);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Reason phrase for the known codes; empty for anything else.
    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// Write `HTTP/1.1 <code> <reason>\r\n`.
pub fn write_status_line<W: Write>(w: &mut W, code: StatusCode) -> io::Result<()> {
    write!(w, "HTTP/1.1 {code}\r\n")
}

/// Headers sent with every response: length, `connection: close` and
/// `content-type: text/plain`.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.insert("content-length", content_length.to_string());
    headers.insert("connection", "close");
    headers.insert("content-type", "text/plain");
    headers
}

/// Write one `name: value\r\n` line per header.
///
/// The blank line ending the header block is left to the caller.
pub fn write_headers<W: Write>(w: &mut W, headers: &Headers) -> io::Result<()> {
    for (name, value) in headers.iter() {
        write!(w, "{name}: {value}\r\n")?;
    }
    Ok(())
}

/// Write a complete response: status line, default headers, blank line and
/// `body`.
pub fn write_response<W: Write>(w: &mut W, code: StatusCode, body: &[u8]) -> io::Result<()> {
    write_status_line(w, code)?;
    write_headers(w, &default_headers(body.len()))?;
    w.write_all(b"\r\n")?;
    w.write_all(body)?;
    w.flush()
}
