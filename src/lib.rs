//! # reqframe
//!
//! A **resumable HTTP/1.1 request parser** for byte streams that deliver
//! data in arbitrarily small fragments, as raw TCP reads do.
//!
//! The parser never needs the whole request up front. Each call consumes
//! only complete grammar elements (the request line, one header line, or
//! body bytes) and leaves the rest in the caller's buffer for the next
//! round. Bodies are delimited by `Content-Length` only; chunked transfer
//! encoding and keep-alive are not supported.
//!
//! ## Quick start — reading from a stream
//!
//! ```rust
//! use reqframe::request_from_reader;
//!
//! let raw = &b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello"[..];
//! let request = request_from_reader(raw).expect("valid request");
//! assert_eq!(request.request_line.method, "POST");
//! assert_eq!(request.headers.get("content-length"), Some("5"));
//! assert_eq!(request.body, b"hello");
//! ```
//!
//! ## Quick start — answering
//!
//! ```rust
//! use reqframe::{StatusCode, default_headers, write_headers, write_status_line};
//!
//! let mut out = Vec::new();
//! write_status_line(&mut out, StatusCode::OK).unwrap();
//! write_headers(&mut out, &default_headers(0)).unwrap();
//! out.extend_from_slice(b"\r\n");
//! assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod error;
mod headers;
mod output;
mod parser;
mod reader;
mod request_line;
mod response;

// Re-export public API.
pub use error::ParseError;
pub use headers::Headers;
pub use output::{format_debug, format_headers_only, format_json};
pub use parser::{ParseState, Parser, ParserConfig, Request};
pub use reader::{FragmentedReader, request_from_reader, request_from_reader_with_config};
pub use request_line::{RequestLine, parse_request_line};
pub use response::{
    StatusCode, default_headers, write_headers, write_response, write_status_line,
};

/// Parse a **complete** HTTP request held in a byte slice.
///
/// Convenience wrapper around [`request_from_reader`].
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed or ends early.
pub fn parse_request(data: &[u8]) -> Result<Request, ParseError> {
    request_from_reader(data)
}
