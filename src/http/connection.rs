use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, error, warn};

use crate::http::parser::{ParseError, declared_body_len, find_headers_end, parse_http_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::router::{Dispatch, Router};
use crate::http::writer::ResponseWriter;

/// Largest request head accepted, terminating blank line excluded.
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Largest body a request may declare with `Content-Length`.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const READ_CHUNK: usize = 4096;

/// Serves exactly one request over a byte stream.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    /// Bytes of `buffer` already searched for the end of the head.
    scanned: usize,
    head_end: Option<usize>,
    /// Total request length, known once the head is in.
    needed: Option<usize>,
    router: Arc<Router>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            scanned: 0,
            head_end: None,
            needed: None,
            router,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(e) => {
                            warn!(error = %e, "Rejecting malformed request");
                            Self::finish(Some(Response::bad_request()?))
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.handle_request(&req).await?;
                    self.state = Self::finish(response);
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    // No keep-alive: one exchange per connection.
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until a full request is buffered.
    ///
    /// `Ok(Ok(None))` means the peer closed without sending anything.
    pub async fn read_request(&mut self) -> anyhow::Result<Result<Option<Request>, ParseError>> {
        loop {
            match self.take_buffered() {
                Ok(Some(request)) => return Ok(Ok(Some(request))),
                Ok(None) => {}
                Err(e) => return Ok(Err(e)),
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection
                if self.buffer.is_empty() {
                    return Ok(Ok(None));
                }
                return Ok(Err(ParseError::Incomplete));
            }
        }
    }

    /// Parses a request out of the buffer once all of it has arrived.
    fn take_buffered(&mut self) -> Result<Option<Request>, ParseError> {
        let Some(head_end) = self.locate_head()? else {
            return Ok(None);
        };

        let needed = match self.needed {
            Some(needed) => needed,
            None => {
                let body = declared_body_len(&self.buffer[..head_end])?.unwrap_or(0);
                if body > MAX_BODY_BYTES {
                    return Err(ParseError::BodyTooLarge(body));
                }
                *self.needed.insert(head_end + 4 + body)
            }
        };
        if self.buffer.len() < needed {
            return Ok(None);
        }

        let (request, consumed) = parse_http_request(&self.buffer)?;
        self.buffer.advance(consumed);
        self.scanned = 0;
        self.head_end = None;
        self.needed = None;

        debug!(method = %request.method, path = %request.path, "Parsed request");
        Ok(Some(request))
    }

    /// Finds the end of the head, searching only bytes not seen before.
    fn locate_head(&mut self) -> Result<Option<usize>, ParseError> {
        if self.head_end.is_none() {
            let start = self.scanned.saturating_sub(3);
            match find_headers_end(&self.buffer[start..]) {
                Some(pos) => self.head_end = Some(start + pos),
                None => self.scanned = self.buffer.len(),
            }
        }

        match self.head_end {
            Some(end) if end > MAX_HEAD_BYTES => Err(ParseError::HeadTooLarge(MAX_HEAD_BYTES)),
            None if self.buffer.len() > MAX_HEAD_BYTES => Err(ParseError::HeadTooLarge(MAX_HEAD_BYTES)),
            head_end => Ok(head_end),
        }
    }

    async fn handle_request(&self, req: &Request) -> anyhow::Result<Option<Response>> {
        let mut response = Response::for_request(req);

        match self.router.dispatch(req, &mut response).await {
            Ok(Dispatch::Sent) => Ok(Some(response)),
            Ok(Dispatch::NotFound) => {
                response.send_status(StatusCode::NotFound)?;
                Ok(Some(response))
            }
            Ok(Dispatch::Unanswered) => Ok(None),
            Err(e) => {
                error!(method = %req.method, path = %req.path, error = %e, "Aborting request");
                Ok(None)
            }
        }
    }

    fn finish(response: Option<Response>) -> ConnectionState {
        match response.and_then(|r| r.wire_bytes()) {
            Some(wire) => ConnectionState::Writing(ResponseWriter::new(wire)),
            None => ConnectionState::Closed,
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}
