//! `Accept-Encoding` negotiation.
//!
//! Only gzip is produced. Any other token the client lists is ignored and
//! the body goes out as-is.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{trace, warn};

use crate::http::response::{Body, Response, ResponseError};

pub const GZIP: &str = "gzip";

/// Whether a comma separated `Accept-Encoding` value lists gzip.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding
        .split(',')
        .map(str::trim)
        .any(|token| token.eq_ignore_ascii_case(GZIP))
}

pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Applies content negotiation to a pending response.
///
/// Gzips the body, empty or not, when `accept_encoding` lists gzip and no
/// `Content-Encoding` has been set yet. `Content-Length` is always rewritten
/// afterwards to the length of the final body.
pub fn negotiate(accept_encoding: Option<&str>, res: &mut Response) -> Result<(), ResponseError> {
    res.ensure_pending()?;

    let wants_gzip = accept_encoding.is_some_and(accepts_gzip);
    let already_encoded = res.headers().contains("Content-Encoding");

    if wants_gzip && !already_encoded {
        match gzip(res.body().as_bytes()) {
            Ok(compressed) => {
                trace!(
                    original = res.body().len(),
                    compressed = compressed.len(),
                    "Gzipped response body"
                );
                res.set_header("Content-Encoding", GZIP)?;
                res.set_body(Body::from(compressed))?;
            }
            Err(e) => {
                warn!(error = %e, "Gzip failed, sending body uncompressed");
            }
        }
    }

    let length = res.body().len();
    res.set_header("Content-Length", length.to_string())?;
    Ok(())
}
