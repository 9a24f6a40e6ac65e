use log::{debug, trace};
use serde::Serialize;

use crate::error::ParseError;
use crate::headers::Headers;
use crate::request_line::{RequestLine, parse_request_line};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Size limits for [`request_from_reader_with_config`] and
/// [`Parser::with_config`].
///
/// [`request_from_reader_with_config`]: crate::request_from_reader_with_config
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Capacity of the read buffer before any growth (default: 8).
    pub initial_buffer_size: usize,
    /// Upper bound on read buffer capacity. `None` lets the buffer keep
    /// doubling (default: `None`).
    pub max_buffer_size: Option<usize>,
    /// Largest `Content-Length` accepted. `None` accepts any declared
    /// length (default: `None`).
    pub max_body_size: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: 8,
            max_buffer_size: None,
            max_body_size: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

/// Grammar element the parser is currently inside.
///
/// States only move forward, in declaration order. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    /// Waiting for the request line.
    Initialized,
    /// Reading header lines until the blank line.
    ParsingHeaders,
    /// Accumulating `Content-Length` bytes of body.
    ParsingBody,
    /// A complete request has been parsed.
    Done,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A fully parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub request_line: RequestLine,
    /// Header fields, names lower-cased.
    pub headers: Headers,
    /// Body bytes; empty when no `Content-Length` was sent.
    #[serde(serialize_with = "serialize_body")]
    pub body: Vec<u8>,
}

/// Serialize body bytes as a UTF-8 string (lossy) for JSON output.
fn serialize_body<S: serde::Serializer>(body: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(body))
}

impl Request {
    /// Return the body as `&str` if it is valid UTF-8.
    pub fn body_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Look up a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Resumable HTTP/1.1 request parser.
///
/// Call [`Parser::parse`] with everything buffered so far; it consumes only
/// whole grammar elements and reports how many bytes it used. Keep the rest
/// and call again once more bytes arrive.
///
/// ```rust
/// use reqframe::{ParseState, Parser};
///
/// let mut parser = Parser::new();
/// let mut buf = b"GET / HTTP/1.1\r\nHo".to_vec();
///
/// let n = parser.parse(&buf).unwrap();
/// assert_eq!(n, 16);
/// assert_eq!(parser.state(), ParseState::ParsingHeaders);
///
/// // Keep the unconsumed "Ho" and append the next read.
/// buf.drain(..n);
/// buf.extend_from_slice(b"st: a\r\n\r\n");
/// let n = parser.parse(&buf).unwrap();
/// assert_eq!(n, buf.len());
///
/// let request = parser.finish().unwrap();
/// assert_eq!(request.header("host"), Some("a"));
/// ```
#[derive(Debug)]
pub struct Parser {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
    max_body_size: Option<usize>,
}

impl Parser {
    /// Create a parser with no body size limit.
    pub fn new() -> Self {
        Self::with_config(&ParserConfig::default())
    }

    /// Create a parser enforcing `config.max_body_size`.
    pub fn with_config(config: &ParserConfig) -> Self {
        Self {
            state: ParseState::Initialized,
            request_line: None,
            headers: Headers::new(),
            body: Vec::new(),
            max_body_size: config.max_body_size,
        }
    }

    /// Current parse state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Returns `true` once a complete request has been parsed.
    pub fn is_complete(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Parse as many whole grammar elements from `data` as possible.
    ///
    /// Returns the number of bytes consumed from the front of `data`. A
    /// return of `0` means more input is needed.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] is fatal; the parser must not be used afterwards.
    /// Calling this after the request is complete returns
    /// [`ParseError::AlreadyComplete`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParseState::Done {
            return Err(ParseError::AlreadyComplete);
        }

        let mut consumed = 0;
        while self.state != ParseState::Done {
            let n = self.parse_single(&data[consumed..])?;
            if n == 0 {
                break;
            }
            consumed += n;
        }
        Ok(consumed)
    }

    /// Run the sub-parser for the current state once.
    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Initialized => {
                let Some((n, request_line)) = parse_request_line(data)? else {
                    return Ok(0);
                };
                debug!("parsed request line: {request_line}");
                self.request_line = Some(request_line);
                self.advance(ParseState::ParsingHeaders);
                Ok(n)
            }

            ParseState::ParsingHeaders => {
                let (n, done) = self.headers.parse(data)?;
                if done {
                    debug!("parsed {} header(s)", self.headers.len());
                    self.advance(ParseState::ParsingBody);
                }
                Ok(n)
            }

            ParseState::ParsingBody => {
                let Some(raw) = self.headers.content_length() else {
                    self.advance(ParseState::Done);
                    return Ok(0);
                };
                let expected = parse_content_length(raw)?;
                if let Some(limit) = self.max_body_size
                    && expected > limit
                {
                    return Err(ParseError::RequestTooLarge { limit });
                }

                self.body.extend_from_slice(data);
                if self.body.len() > expected {
                    return Err(ParseError::BodyTooLong {
                        expected,
                        actual: self.body.len(),
                    });
                }
                trace!("body: {}/{} bytes", self.body.len(), expected);
                if self.body.len() == expected {
                    self.advance(ParseState::Done);
                }
                Ok(data.len())
            }

            ParseState::Done => Err(ParseError::AlreadyComplete),
        }
    }

    fn advance(&mut self, next: ParseState) {
        debug_assert!(next > self.state, "parse state moved backwards");
        trace!("state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Consume the parser and return the parsed [`Request`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::IncompleteRequest`] unless the parser has
    /// reached [`ParseState::Done`].
    pub fn finish(self) -> Result<Request, ParseError> {
        let incomplete = ParseError::IncompleteRequest { state: self.state };
        if self.state != ParseState::Done {
            return Err(incomplete);
        }

        Ok(Request {
            request_line: self.request_line.ok_or(incomplete)?,
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `Content-Length` value: one or more ASCII digits.
fn parse_content_length(raw: &str) -> Result<usize, ParseError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength(raw.to_owned()));
    }
    raw.parse()
        .map_err(|_| ParseError::InvalidContentLength(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// Character classification helpers
// ---------------------------------------------------------------------------

/// Offset of the first CRLF in `data`.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

/// `tchar` – characters allowed in HTTP tokens (header names).
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
#[inline]
pub(crate) fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tchar_accepts_valid_bytes() {
        for &b in b"abcXYZ019!#$%&'*+-.^_`|~" {
            assert!(is_tchar(b), "expected tchar for byte 0x{b:02X}");
        }
    }

    #[test]
    fn tchar_rejects_invalid_bytes() {
        for &b in b" \t\r\n@[]{}:\"(),/;<=>?\\" {
            assert!(!is_tchar(b), "expected non-tchar for byte 0x{b:02X}");
        }
    }

    #[test]
    fn find_crlf_locates_first_terminator() {
        assert_eq!(find_crlf(b"ab\r\ncd\r\n"), Some(2));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"ab\rcd\n"), None);
        assert_eq!(find_crlf(b""), None);
    }

    #[test]
    fn content_length_rejects_signs_and_garbage() {
        assert_eq!(parse_content_length("42").unwrap(), 42);
        assert_eq!(parse_content_length("0").unwrap(), 0);
        for raw in ["", "-1", "+5", "abc", "1 2", "99999999999999999999999999"] {
            assert!(
                matches!(parse_content_length(raw), Err(ParseError::InvalidContentLength(_))),
                "expected rejection of {raw:?}"
            );
        }
    }

    #[test]
    fn parse_stops_when_request_line_incomplete() {
        let mut parser = Parser::new();
        assert_eq!(parser.parse(b"GET / HTT").unwrap(), 0);
        assert_eq!(parser.state(), ParseState::Initialized);
    }

    #[test]
    fn parse_consumes_only_whole_lines() {
        let mut parser = Parser::new();
        let data = b"GET / HTTP/1.1\r\nHost: a\r\nAcc";
        let n = parser.parse(data).unwrap();
        assert_eq!(&data[n..], b"Acc");
        assert_eq!(parser.state(), ParseState::ParsingHeaders);
    }

    #[test]
    fn no_content_length_finishes_with_empty_body() {
        let mut parser = Parser::new();
        let data = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
        assert_eq!(parser.parse(data).unwrap(), data.len());
        assert!(parser.is_complete());
        let request = parser.finish().unwrap();
        assert!(request.body.is_empty());
    }

    #[test]
    fn zero_content_length_finishes_immediately() {
        let mut parser = Parser::new();
        let data = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        assert_eq!(parser.parse(data).unwrap(), data.len());
        assert!(parser.is_complete());
    }

    #[test]
    fn body_accumulates_across_calls() {
        let mut parser = Parser::new();
        let head = b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\n";
        assert_eq!(parser.parse(head).unwrap(), head.len());
        assert_eq!(parser.state(), ParseState::ParsingBody);

        assert_eq!(parser.parse(b"hello").unwrap(), 5);
        assert_eq!(parser.state(), ParseState::ParsingBody);
        assert_eq!(parser.parse(b" world").unwrap(), 6);
        assert!(parser.is_complete());

        assert_eq!(parser.finish().unwrap().body, b"hello world");
    }

    #[test]
    fn body_longer_than_declared_is_fatal() {
        let mut parser = Parser::new();
        let err = parser
            .parse(b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nabc")
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::BodyTooLong {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn declared_body_over_limit_is_rejected_before_reading() {
        let config = ParserConfig {
            max_body_size: Some(4),
            ..ParserConfig::default()
        };
        let mut parser = Parser::with_config(&config);
        let err = parser
            .parse(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::RequestTooLarge { limit: 4 }));
        assert!(parser.body.is_empty());
    }

    #[test]
    fn declared_body_at_limit_is_accepted() {
        let config = ParserConfig {
            max_body_size: Some(4),
            ..ParserConfig::default()
        };
        let mut parser = Parser::with_config(&config);
        parser
            .parse(b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nabcd")
            .unwrap();
        assert_eq!(parser.finish().unwrap().body, b"abcd");
    }

    #[test]
    fn invalid_content_length_is_fatal() {
        let mut parser = Parser::new();
        let err = parser
            .parse(b"POST / HTTP/1.1\r\nContent-Length: five\r\n\r\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength(v) if v == "five"));
    }

    #[test]
    fn parse_after_done_is_rejected() {
        let mut parser = Parser::new();
        parser.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert!(parser.is_complete());
        assert!(matches!(parser.parse(b"x"), Err(ParseError::AlreadyComplete)));
    }

    #[test]
    fn finish_before_done_is_rejected() {
        let mut parser = Parser::new();
        parser.parse(b"GET / HTTP/1.1\r\n").unwrap();
        let err = parser.finish().unwrap_err();
        assert!(matches!(
            err,
            ParseError::IncompleteRequest {
                state: ParseState::ParsingHeaders
            }
        ));
    }
}
