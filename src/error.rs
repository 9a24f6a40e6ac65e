use std::io;

use thiserror::Error;

use crate::parser::ParseState;

/// Errors that can occur while reading and parsing an HTTP request.
///
/// Every variant is fatal to the parse session that produced it; the
/// partially built request must be discarded.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request line is not `<METHOD> <target> HTTP/1.1`.
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),
    /// A header name is empty, contains whitespace, or has non-token bytes.
    #[error("invalid header key: '{0}'")]
    InvalidHeaderKey(String),
    /// The `Content-Length` header value is not a non-negative integer.
    #[error("invalid Content-Length: '{0}'")]
    InvalidContentLength(String),
    /// More body bytes arrived than `Content-Length` declared.
    #[error("body exceeds Content-Length: expected {expected}, got {actual}")]
    BodyTooLong {
        /// Declared `Content-Length`.
        expected: usize,
        /// Bytes accumulated so far.
        actual: usize,
    },
    /// The stream ended before the request was fully framed.
    #[error("incomplete request: stream ended while in state {state:?}")]
    IncompleteRequest {
        /// State the parser was in when input ran out.
        state: ParseState,
    },
    /// `parse` was called after the request was already complete.
    #[error("request is already complete")]
    AlreadyComplete,
    /// The read buffer would outgrow `max_buffer_size`, or the declared
    /// body is longer than `max_body_size`.
    #[error("request exceeds configured limit of {limit} bytes")]
    RequestTooLarge {
        /// The limit that was hit.
        limit: usize,
    },
    /// Reading from the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
