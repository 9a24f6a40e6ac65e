use std::fmt;

use serde::Serialize;

use crate::error::ParseError;
use crate::parser::find_crlf;

/// The first line of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLine {
    /// Request method, one or more uppercase ASCII letters.
    pub method: String,
    /// Request target exactly as sent (path, query, `*`, ...).
    pub target: String,
    /// Protocol version without the `HTTP/` prefix, e.g. `1.1`.
    pub version: String,
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.version)
    }
}

/// Parse the request line from the start of `data`.
///
/// Returns `Ok(None)` when no CRLF has arrived yet. On success returns the
/// number of bytes consumed (the line plus its CRLF) and the parsed line.
///
/// # Errors
///
/// Returns [`ParseError::MalformedRequestLine`] once a complete line is
/// present but is not `<METHOD> <target> HTTP/1.1`.
pub fn parse_request_line(data: &[u8]) -> Result<Option<(usize, RequestLine)>, ParseError> {
    let Some(end) = find_crlf(data) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&data[..end])
        .map_err(|_| ParseError::MalformedRequestLine("request line is not UTF-8".into()))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine(format!(
            "expected 3 fields, found {}: '{line}'",
            parts.len()
        )));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::MalformedRequestLine(format!(
            "invalid method '{method}'"
        )));
    }
    if target.is_empty() {
        return Err(ParseError::MalformedRequestLine("empty request target".into()));
    }
    let Some(version) = version.strip_prefix("HTTP/") else {
        return Err(ParseError::MalformedRequestLine(format!(
            "not an HTTP version: '{version}'"
        )));
    };
    if !version.contains("1.1") {
        return Err(ParseError::MalformedRequestLine(format!(
            "unsupported HTTP version '{version}'"
        )));
    }

    let request_line = RequestLine {
        method: method.to_owned(),
        target: target.to_owned(),
        version: version.to_owned(),
    };
    Ok(Some((end + 2, request_line)))
}
