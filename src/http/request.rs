use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::http::cookie::{Cookie, parse_cookie_header};
use crate::http::headers::HeaderMap;

/// HTTP request methods understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive, uppercase)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Contains everything extracted from the request line, the header block and
/// the body. A request is never modified once built; the only interior state
/// is the cookie table, which is parsed from the `Cookie` header the first
/// time it is asked for.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path without its query string. Always starts with `/`.
    pub path: String,
    /// Decoded query string parameters
    pub query: HashMap<String, String>,
    /// Request headers, case-insensitive
    pub headers: HeaderMap,
    /// Request body, possibly empty
    pub body: Vec<u8>,
    cookies: OnceLock<HashMap<String, Cookie>>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request. An empty path becomes `/`.
    pub fn build(self) -> Result<Request, &'static str> {
        let mut path = self.path.ok_or("path missing")?;
        if path.is_empty() {
            path.push('/');
        }
        if !path.starts_with('/') {
            return Err("path must start with '/'");
        }

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path,
            query: self.query,
            headers: self.headers,
            body: self.body,
            cookies: OnceLock::new(),
        })
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.headers.contains(key)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Checks the media type of the body against `mime`, ignoring case and
    /// any parameters such as `; charset=utf-8`.
    pub fn is(&self, mime: &str) -> bool {
        self.header("Content-Type")
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().eq_ignore_ascii_case(mime))
            .unwrap_or(false)
    }

    /// Cookies sent by the client, keyed by name.
    ///
    /// Parsed from the `Cookie` header on first access and cached afterwards.
    pub fn cookies(&self) -> &HashMap<String, Cookie> {
        self.cookies.get_or_init(|| {
            self.header("Cookie")
                .map(parse_cookie_header)
                .unwrap_or_default()
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect()
        })
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies().get(name)
    }
}
