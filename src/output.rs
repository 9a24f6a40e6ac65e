use std::fmt::Write;

use crate::parser::Request;

/// Bytes of a binary body shown in the hex preview.
const HEX_PREVIEW_LEN: usize = 16;

/// Serialize a [`Request`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(request: &Request, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(request)
    } else {
        serde_json::to_string(request)
    };
    result.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a [`Request`] for a human: the request line, an aligned header
/// table, and how the body was framed.
///
/// ```text
/// POST /x HTTP/1.1
/// headers (2):
///   content-length  5
///   host            a
/// body: 5 of 5 bytes (content-length)
///   hello
/// ```
pub fn format_debug(request: &Request) -> String {
    let mut out = String::with_capacity(256);

    let _ = writeln!(out, "{}", request.request_line);

    let width = request
        .headers
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    let _ = writeln!(out, "headers ({}):", request.headers.len());
    for (name, value) in request.headers.iter() {
        let _ = writeln!(out, "  {name:<width$}  {value}");
    }

    match request.headers.content_length() {
        None => out.push_str("body: none (no content-length)\n"),
        Some(declared) => {
            let _ = writeln!(
                out,
                "body: {} of {declared} bytes (content-length)",
                request.body.len()
            );
            match request.body_as_str() {
                Some(text) if !text.is_empty() => {
                    for line in text.lines() {
                        let _ = writeln!(out, "  {line}");
                    }
                }
                Some(_) => {}
                None => {
                    let shown = request.body.len().min(HEX_PREVIEW_LEN);
                    out.push_str("  <binary>");
                    for b in &request.body[..shown] {
                        let _ = write!(out, " {b:02x}");
                    }
                    if shown < request.body.len() {
                        out.push_str(" ...");
                    }
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Render the request head as it would appear on the wire, with
/// normalized (lower-cased) header names and CRLF line endings.
pub fn format_headers_only(request: &Request) -> String {
    let mut out = String::with_capacity(64 + request.headers.len() * 40);

    let _ = write!(out, "{}\r\n", request.request_line);
    for (name, value) in request.headers.iter() {
        let _ = write!(out, "{name}: {value}\r\n");
    }
    out.push_str("\r\n");

    out
}
