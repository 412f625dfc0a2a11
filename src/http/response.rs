use std::time::UNIX_EPOCH;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::http::cookie::{Cookie, CookieOptions, http_date};
use crate::http::encoding;
use crate::http::headers::HeaderMap;
use crate::http::request::Request;
use crate::http::writer::serialize_response;

/// HTTP status codes supported by the server.
///
/// Common HTTP status codes used in responses:
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created successfully
/// - `NoContent` (204): Successful request with no content
/// - `TemporaryRedirect` (307): Resource temporarily at `Location`
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 307 Temporary Redirect
    TemporaryRedirect,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::TemporaryRedirect => 307,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::TemporaryRedirect => "Temporary Redirect",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            201 => Some(StatusCode::Created),
            204 => Some(StatusCode::NoContent),
            307 => Some(StatusCode::TemporaryRedirect),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }
}

/// A response body, either text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Binary(Bytes),
}

impl Body {
    pub fn empty() -> Self {
        Body::Binary(Bytes::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(s) => s.as_bytes(),
            Body::Binary(b) => &b[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Binary(b)
    }
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response has already been sent")]
    AlreadySent,

    #[error("failed to encode json body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extra `Cache-Control` directives for [`Response::cache`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheOptions {
    pub private: bool,
    pub immutable: bool,
}

#[derive(Debug)]
enum SendState {
    Pending,
    /// Finalized; holds the serialized message.
    Sent(Bytes),
}

/// An HTTP response under construction by a handler chain.
///
/// A response starts out pending. Handlers set the status, headers and
/// cookies, then finish it with one of the sending methods ([`send`],
/// [`text`], [`json`], [`redirect`], ...). Sending negotiates the content
/// encoding, fixes `Content-Length` and serializes the message. From then on
/// every mutating call, including a second send, fails with
/// [`ResponseError::AlreadySent`].
///
/// [`send`]: Response::send
/// [`text`]: Response::text
/// [`json`]: Response::json
/// [`redirect`]: Response::redirect
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    cookies: Vec<Cookie>,
    accept_encoding: Option<String>,
    state: SendState,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates a pending `200 OK` response that will never be compressed.
    pub fn new() -> Self {
        Self {
            status: StatusCode::Ok,
            headers: HeaderMap::new(),
            body: Body::empty(),
            cookies: Vec::new(),
            accept_encoding: None,
            state: SendState::Pending,
        }
    }

    /// Creates a pending response that honours the request's `Accept-Encoding`.
    pub fn for_request(req: &Request) -> Self {
        Self {
            accept_encoding: req.header("Accept-Encoding").map(str::to_string),
            ..Self::new()
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Cookies queued for `Set-Cookie`, in the order they were added.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn is_sent(&self) -> bool {
        matches!(self.state, SendState::Sent(_))
    }

    /// The serialized message, once the response has been sent.
    pub fn wire_bytes(&self) -> Option<Bytes> {
        match &self.state {
            SendState::Sent(bytes) => Some(bytes.clone()),
            SendState::Pending => None,
        }
    }

    pub(crate) fn ensure_pending(&self) -> Result<(), ResponseError> {
        match self.state {
            SendState::Pending => Ok(()),
            SendState::Sent(_) => Err(ResponseError::AlreadySent),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<&mut Self, ResponseError> {
        self.ensure_pending()?;
        self.status = status;
        Ok(self)
    }

    pub fn set_header(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ResponseError> {
        self.ensure_pending()?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn remove_header(&mut self, name: &str) -> Result<Option<String>, ResponseError> {
        self.ensure_pending()?;
        Ok(self.headers.remove(name))
    }

    pub fn set_body(&mut self, body: impl Into<Body>) -> Result<&mut Self, ResponseError> {
        self.ensure_pending()?;
        self.body = body.into();
        Ok(self)
    }

    /// Queues a `Set-Cookie` header. A cookie with the same name replaces the
    /// earlier one.
    pub fn set_cookie(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        options: CookieOptions,
    ) -> Result<&mut Self, ResponseError> {
        self.add_cookie(Cookie::with_options(name, value, options))
    }

    pub fn add_cookie(&mut self, cookie: Cookie) -> Result<&mut Self, ResponseError> {
        self.ensure_pending()?;
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
        Ok(self)
    }

    /// Tells the client to drop the cookie `name`.
    pub fn clear_cookie(&mut self, name: impl Into<String>) -> Result<&mut Self, ResponseError> {
        let options = CookieOptions {
            max_age: Some(0),
            expires: Some(http_date(UNIX_EPOCH)),
            ..CookieOptions::default()
        };
        self.set_cookie(name, "", options)
    }

    pub fn cache(&mut self, max_age: u64, options: CacheOptions) -> Result<&mut Self, ResponseError> {
        let mut value = format!("max-age={max_age}");
        if options.private {
            value.push_str(", private");
        }
        if options.immutable {
            value.push_str(", immutable");
        }
        self.set_header("Cache-Control", value)
    }

    pub fn no_cache(&mut self) -> Result<&mut Self, ResponseError> {
        self.set_header(
            "Cache-Control",
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        )?
        .set_header("Pragma", "no-cache")?
        .set_header("Expires", "0")
    }

    /// Finalizes the response with `body`.
    ///
    /// Compresses the body if the client accepts gzip, sets `Content-Length`
    /// and serializes the message. Fails if the response was already sent.
    pub fn send(&mut self, body: impl Into<Body>) -> Result<(), ResponseError> {
        self.ensure_pending()?;
        self.body = body.into();

        let accept_encoding = self.accept_encoding.take();
        encoding::negotiate(accept_encoding.as_deref(), self)?;

        let wire = serialize_response(self);
        tracing::debug!(
            status = self.status.as_u16(),
            bytes = wire.len(),
            "Response finalized"
        );
        self.state = SendState::Sent(Bytes::from(wire));
        Ok(())
    }

    /// Sends `status` with an empty body.
    pub fn send_status(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        self.set_status(status)?;
        self.send(Body::empty())
    }

    pub fn text(&mut self, body: impl Into<String>) -> Result<(), ResponseError> {
        self.set_header("Content-Type", "text/plain")?;
        self.send(Body::Text(body.into()))
    }

    pub fn html(&mut self, body: impl Into<String>) -> Result<(), ResponseError> {
        self.set_header("Content-Type", "text/html")?;
        self.send(Body::Text(body.into()))
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ResponseError> {
        self.ensure_pending()?;
        let body = serde_json::to_string(value)?;
        self.set_header("Content-Type", "application/json")?;
        self.send(Body::Text(body))
    }

    pub fn bytes(&mut self, body: impl Into<Bytes>) -> Result<(), ResponseError> {
        self.set_header("Content-Type", "application/octet-stream")?;
        self.send(Body::Binary(body.into()))
    }

    /// Redirects to `location`, usually with `307 Temporary Redirect`.
    pub fn redirect(&mut self, location: &str, status: StatusCode) -> Result<(), ResponseError> {
        self.set_status(status)?.set_header("Location", location)?;
        self.send(Body::empty())
    }

    /// Creates a sent `200 OK` text response.
    pub fn ok(body: impl Into<String>) -> Result<Self, ResponseError> {
        let mut response = Response::new();
        response.text(body)?;
        Ok(response)
    }

    /// Creates a sent `404 Not Found` response with an empty body.
    pub fn not_found() -> Result<Self, ResponseError> {
        let mut response = Response::new();
        response.send_status(StatusCode::NotFound)?;
        Ok(response)
    }

    /// Creates a sent `400 Bad Request` response with an empty body.
    pub fn bad_request() -> Result<Self, ResponseError> {
        let mut response = Response::new();
        response.send_status(StatusCode::BadRequest)?;
        Ok(response)
    }
}
