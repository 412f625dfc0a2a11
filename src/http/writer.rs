use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::canonical_name;
use crate::http::request::Request;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response: status line, header block, blank line, body.
///
/// The header block is terminated by an empty line even when there are no
/// headers. Every queued cookie gets its own `Set-Cookie` line.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body().len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status().as_u16(),
        resp.status().reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers().iter() {
        write_header(&mut buf, &canonical_name(k), v);
    }
    for cookie in resp.cookies() {
        write_header(&mut buf, "Set-Cookie", &cookie.serialize());
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(resp.body().as_bytes());

    buf
}

/// Serializes a request back into wire form.
///
/// A `Content-Length` header is added when the request has a body and does
/// not declare its length already.
pub fn serialize_request(req: &Request) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + req.body.len());

    let mut target = req.path.clone();
    if !req.query.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(req.query.iter())
            .finish();
        target.push('?');
        target.push_str(&query);
    }

    buf.extend_from_slice(format!("{} {} {}\r\n", req.method, target, HTTP_VERSION).as_bytes());

    for (k, v) in req.headers.iter() {
        write_header(&mut buf, &canonical_name(k), v);
    }
    if !req.body.is_empty() && !req.headers.contains("Content-Length") {
        write_header(&mut buf, "Content-Length", &req.body.len().to_string());
    }

    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&req.body);

    buf
}

fn write_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Pushes a finalized response onto a stream, tracking partial writes.
pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(wire: Bytes) -> Self {
        Self {
            buffer: wire,
            written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
