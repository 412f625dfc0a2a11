//! `Cookie` / `Set-Cookie` header codec.
//!
//! A cookie serializes as `name=value` followed by its attributes in a fixed
//! order (`Max-Age`, `Expires`, `HttpOnly`, `Secure`, `Domain`, `Path`,
//! `SameSite`). Name, value, domain and path are percent-encoded wherever
//! they hold bytes the header syntax would eat, so
//! `Cookie::parse(&c.serialize()) == c` holds for every cookie.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use httpdate::HttpDate;
use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left untouched when encoding a cookie name or value.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters escaped in `Domain` and `Path` values.
const ATTRIBUTE_VALUE: &AsciiSet = &CONTROLS.add(b' ').add(b';').add(b'%');

/// 9999-12-31T23:59:59Z, the last instant an HTTP-date can express.
const LATEST_HTTP_DATE: u64 = 253_402_300_799;

/// Converts `time` to an HTTP-date, clamped to the range the format can
/// express (the Unix epoch up to the end of year 9999). Sub-second
/// precision is dropped.
pub fn http_date(time: SystemTime) -> HttpDate {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .min(LATEST_HTTP_DATE);
    HttpDate::from(UNIX_EPOCH + Duration::from_secs(secs))
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Parses an attribute value, ignoring ASCII case.
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional cookie attributes. Unset fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    /// `Max-Age` in seconds. `Some(0)` expires the cookie immediately.
    pub max_age: Option<i64>,
    /// `Expires`; build one from a `SystemTime` with [`http_date`].
    pub expires: Option<HttpDate>,
    pub http_only: bool,
    pub secure: bool,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub same_site: Option<SameSite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_options(name, value, CookieOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        value: impl Into<String>,
        options: CookieOptions,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// Parses a single `Set-Cookie` style string.
    ///
    /// The first `;`-separated segment is `name=value`; every other segment
    /// is an attribute. Unknown attributes and attribute values that fail
    /// to parse are dropped.
    pub fn parse(s: &str) -> Self {
        let mut segments = s.split(';');

        let first = segments.next().unwrap_or_default();
        let (name, value) = first.split_once('=').unwrap_or((first, ""));

        let mut options = CookieOptions::default();

        for segment in segments {
            let (key, val) = match segment.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (segment.trim(), ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "max-age" => options.max_age = val.parse().ok(),
                "expires" => options.expires = val.parse().ok(),
                "httponly" => options.http_only = true,
                "secure" => options.secure = true,
                "domain" => options.domain = Some(decode(val)),
                "path" => options.path = Some(decode(val)),
                "samesite" => options.same_site = SameSite::from_str(val),
                _ => {}
            }
        }

        Cookie::with_options(decode(name.trim()), decode(value.trim()), options)
    }

    /// Renders the cookie as a `Set-Cookie` header value.
    pub fn serialize(&self) -> String {
        let mut out = format!(
            "{}={}",
            utf8_percent_encode(&self.name, COOKIE_VALUE),
            utf8_percent_encode(&self.value, COOKIE_VALUE)
        );
        let opts = &self.options;

        if let Some(max_age) = opts.max_age {
            out.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(expires) = opts.expires {
            out.push_str(&format!("; Expires={expires}"));
        }
        if opts.http_only {
            out.push_str("; HttpOnly");
        }
        if opts.secure {
            out.push_str("; Secure");
        }
        if let Some(domain) = &opts.domain {
            out.push_str(&format!("; Domain={}", utf8_percent_encode(domain, ATTRIBUTE_VALUE)));
        }
        if let Some(path) = &opts.path {
            out.push_str(&format!("; Path={}", utf8_percent_encode(path, ATTRIBUTE_VALUE)));
        }
        if let Some(same_site) = opts.same_site {
            out.push_str(&format!("; SameSite={same_site}"));
        }

        out
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Splits a request `Cookie` header (`a=1; b=2`) into its cookies.
///
/// Every pair is a separate cookie here; request cookies carry no attributes.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(Cookie::parse)
        .collect()
}
