use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ParseError;
use crate::parser::{find_crlf, is_tchar};

/// Header fields of a request or response.
///
/// Names are stored lower-cased, so lookups are case-insensitive. A later
/// field with the same name replaces the earlier value. Iteration is in
/// ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers {
    map: BTreeMap<String, String>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse at most one CRLF-terminated header line from `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line
    /// ending the header block was reached. `(0, false)` means no complete
    /// line is available yet.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHeaderKey`] if the line has no `:` or the
    /// field name is empty, contains whitespace, or contains non-token bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(end) = find_crlf(data) else {
            return Ok((0, false));
        };
        if end == 0 {
            return Ok((2, true));
        }

        let line = &data[..end];
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(ParseError::InvalidHeaderKey(
                String::from_utf8_lossy(line).into_owned(),
            ));
        };

        let key = line[..colon].trim_ascii_start();
        if key.is_empty()
            || key.iter().any(u8::is_ascii_whitespace)
            || !key.iter().all(|&b| is_tchar(b))
        {
            return Err(ParseError::InvalidHeaderKey(
                String::from_utf8_lossy(key).into_owned(),
            ));
        }

        let value = String::from_utf8_lossy(&line[colon + 1..]);
        // Token bytes are ASCII, so the key is valid UTF-8.
        let key = String::from_utf8_lossy(key);
        self.insert(&key, value.trim_matches(' '));

        Ok((end + 2, false))
    }

    /// Look up a header value by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.map.get(name) {
            Some(value) => Some(value.as_str()),
            None => self
                .map
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
        }
    }

    /// Set a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.map.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Iterate over `(name, value)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no header has been stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The raw `Content-Length` value, if the header is present.
    pub fn content_length(&self) -> Option<&str> {
        self.get("content-length")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_header() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 23);
        assert!(!done);
    }

    #[test]
    fn valid_single_header_with_extra_whitespace() {
        let mut headers = Headers::new();
        let data = b"       Host: localhost:42069       \r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();
        assert_eq!(headers.get("Host"), Some("localhost:42069"));
        assert_eq!(n, data.len() - 2);
        assert!(!done);
    }

    #[test]
    fn two_headers_parsed_one_line_at_a_time() {
        let mut headers = Headers::new();
        let data = b"Host: localhost\r\nUser-Agent: curl/8.0\r\n\r\n";

        let (n1, done) = headers.parse(data).unwrap();
        assert!(!done);
        let (n2, done) = headers.parse(&data[n1..]).unwrap();
        assert!(!done);
        let (n3, done) = headers.parse(&data[n1 + n2..]).unwrap();
        assert!(done);
        assert_eq!(n3, 2);
        assert_eq!(n1 + n2 + n3, data.len());

        assert_eq!(headers.get("host"), Some("localhost"));
        assert_eq!(headers.get("user-agent"), Some("curl/8.0"));
    }

    #[test]
    fn terminator_consumes_two_bytes() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse(b"\r\nbody").unwrap(), (2, true));
        assert!(headers.is_empty());
    }

    #[test]
    fn partial_line_needs_more_data() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse(b"Host: loc").unwrap(), (0, false));
        assert_eq!(headers.parse(b"Host: localhost\r").unwrap(), (0, false));
        assert!(headers.is_empty());
    }

    #[test]
    fn space_inside_key_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.parse(b"Ho st: x\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderKey(_)));
    }

    #[test]
    fn space_before_colon_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.parse(b"       Host : localhost:42069       \r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderKey(_)));
    }

    #[test]
    fn non_token_key_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.parse(b"H\xc2\xa9st: localhost\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderKey(_)));
    }

    #[test]
    fn missing_colon_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.parse(b"NoColonHere\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderKey(_)));
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.parse(b": value\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderKey(_)));
    }

    #[test]
    fn key_is_lower_cased() {
        let mut headers = Headers::new();
        headers.parse(b"X-Custom-Thing: Yes\r\n").unwrap();
        assert_eq!(headers.iter().next(), Some(("x-custom-thing", "Yes")));
    }

    #[test]
    fn duplicate_key_overwrites() {
        let mut headers = Headers::new();
        headers.parse(b"Set-Person: lane\r\n").unwrap();
        headers.parse(b"set-person: prime\r\n").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("set-person"), Some("prime"));
    }

    #[test]
    fn value_keeps_interior_spaces_and_colons() {
        let mut headers = Headers::new();
        headers.parse(b"X-Note: a: b  c \r\n").unwrap();
        assert_eq!(headers.get("x-note"), Some("a: b  c"));
    }

    #[test]
    fn empty_value_is_allowed() {
        let mut headers = Headers::new();
        headers.parse(b"X-Empty:\r\n").unwrap();
        assert_eq!(headers.get("x-empty"), Some(""));
    }
}
