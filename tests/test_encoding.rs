use std::io::Read;

use flate2::read::GzDecoder;

use courier::http::encoding::{accepts_gzip, gzip, negotiate};
use courier::http::response::{Response, StatusCode};

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

#[test]
fn test_gzip_round_trip() {
    let original = "abc".repeat(1000);
    let compressed = gzip(original.as_bytes()).unwrap();

    assert!(compressed.len() < original.len());
    assert_eq!(gunzip(&compressed), original.as_bytes());
}

#[test]
fn test_accepts_gzip_token_list() {
    assert!(accepts_gzip("gzip, deflate"));
    assert!(accepts_gzip("invalid-encoding-1, gzip, invalid-encoding-2"));
    assert!(!accepts_gzip("invalid-encoding"));
    assert!(!accepts_gzip("deflate;q=1.0, br"));
}

#[test]
fn test_negotiate_compresses_when_gzip_accepted() {
    let mut res = Response::new();
    res.set_body("abc").unwrap();

    negotiate(Some("gzip"), &mut res).unwrap();

    assert_eq!(res.header("Content-Encoding"), Some("gzip"));
    assert_eq!(gunzip(res.body().as_bytes()), b"abc");
    assert_eq!(
        res.header("Content-Length"),
        Some(res.body().len().to_string().as_str())
    );
    assert!(!res.is_sent());
}

#[test]
fn test_negotiate_without_accept_encoding_only_sets_length() {
    let mut res = Response::new();
    res.set_body("plain body").unwrap();

    negotiate(None, &mut res).unwrap();

    assert!(res.header("Content-Encoding").is_none());
    assert_eq!(res.body().as_bytes(), b"plain body");
    assert_eq!(res.header("Content-Length"), Some("10"));
}

#[test]
fn test_negotiate_ignores_unsupported_encodings() {
    let mut res = Response::new();
    res.set_body("plain body").unwrap();

    negotiate(Some("br, deflate"), &mut res).unwrap();

    assert!(res.header("Content-Encoding").is_none());
    assert_eq!(res.body().as_bytes(), b"plain body");
}

#[test]
fn test_negotiate_compresses_empty_body() {
    let mut res = Response::new();

    negotiate(Some("gzip"), &mut res).unwrap();

    assert_eq!(res.header("Content-Encoding"), Some("gzip"));
    assert!(!res.body().is_empty());
    assert!(gunzip(res.body().as_bytes()).is_empty());
    assert_eq!(
        res.header("Content-Length"),
        Some(res.body().len().to_string().as_str())
    );
}

#[test]
fn test_gzip_round_trip_for_assorted_bodies() {
    let bodies: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"a".to_vec(),
        (0..=255u8).collect(),
        "caf\u{e9} ".repeat(500).into_bytes(),
    ];

    for body in bodies {
        assert_eq!(gunzip(&gzip(&body).unwrap()), body);
    }
}

#[test]
fn test_negotiate_keeps_existing_content_encoding() {
    let mut res = Response::new();
    res.set_header("Content-Encoding", "identity").unwrap();
    res.set_body("already encoded").unwrap();

    negotiate(Some("gzip"), &mut res).unwrap();

    assert_eq!(res.header("Content-Encoding"), Some("identity"));
    assert_eq!(res.body().as_bytes(), b"already encoded");
}

#[test]
fn test_negotiate_after_send_fails() {
    let mut res = Response::new();
    res.send_status(StatusCode::Ok).unwrap();

    assert!(negotiate(Some("gzip"), &mut res).is_err());
}
