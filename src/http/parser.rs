use std::collections::HashMap;

use thiserror::Error;

use crate::http::headers::HeaderMap;
use crate::http::request::{Method, Request, RequestBuilder};

/// Why a buffer could not be turned into a [`Request`].
///
/// Every variant except [`ParseError::Incomplete`] means the request is
/// malformed; the connection answers `400 Bad Request` and closes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequestLine,

    #[error("invalid http method: {0}")]
    InvalidMethod(String),

    #[error("invalid request target: {0}")]
    InvalidPath(String),

    #[error("invalid header line: {0}")]
    InvalidHeader(String),

    #[error("invalid content-length header: {0}")]
    InvalidContentLength(String),

    #[error("request head is not valid utf-8")]
    InvalidEncoding,

    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("declared body of {0} bytes is too large")]
    BodyTooLarge(usize),

    #[error("incomplete request")]
    Incomplete,
}

impl ParseError {
    /// More bytes are needed before the request can be parsed.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete)
    }
}

/// Parses one request from the start of `buf`.
///
/// Returns the request and the number of bytes it occupied. The body is
/// `Content-Length` bytes long when that header is present, otherwise it is
/// everything received after the header block.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = headers_str.split("\r\n");

    // Request line; the version token is ignored
    let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let target = parts.next().ok_or(ParseError::InvalidRequestLine)?;

    let method =
        Method::from_str(method_str).ok_or_else(|| ParseError::InvalidMethod(method_str.to_string()))?;
    let (path, query) = split_target(target)?;

    // Headers
    let mut headers = HeaderMap::new();

    // A line without a colon is only malformed when a real header follows it
    let mut stray: Option<&str> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            if stray.is_none() {
                stray = Some(line);
            }
            continue;
        };
        if let Some(stray) = stray {
            return Err(ParseError::InvalidHeader(stray.to_string()));
        }

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader(line.to_string()));
        }

        headers.insert(key, value.strip_prefix(' ').unwrap_or(value));
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(v.to_string()))
        })
        .transpose()?;

    let body_len = match content_length {
        Some(len) if body_bytes.len() < len => return Err(ParseError::Incomplete),
        Some(len) => len,
        None => body_bytes.len(),
    };

    let mut builder = RequestBuilder::new()
        .method(method)
        .path(path)
        .headers(headers)
        .body(&body_bytes[..body_len]);
    for (k, v) in query {
        builder = builder.query(k, v);
    }
    let request = builder
        .build()
        .map_err(|_| ParseError::InvalidPath(target.to_string()))?;

    let total_consumed = headers_end + 4 + body_len;
    Ok((request, total_consumed))
}

/// Splits a request target into its path and decoded query parameters.
fn split_target(target: &str) -> Result<(&str, HashMap<String, String>), ParseError> {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let path = if path.is_empty() { "/" } else { path };
    if !path.starts_with('/') {
        return Err(ParseError::InvalidPath(target.to_string()));
    }

    let query = query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    Ok((path, query))
}

/// Offset of the `\r\n\r\n` that ends the request head.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// The `Content-Length` declared in a complete request head, if any.
///
/// Looks only at header lines, so a caller can size the body before the
/// whole request has arrived. The last declaration wins.
pub fn declared_body_len(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidEncoding)?;

    let mut declared = None;
    for line in head.split("\r\n").skip(1) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            declared = Some(
                value
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidContentLength(value.to_string()))?,
            );
        }
    }

    Ok(declared)
}
