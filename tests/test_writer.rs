use courier::http::cookie::CookieOptions;
use courier::http::request::{Method, RequestBuilder};
use courier::http::response::{Response, StatusCode};
use courier::http::writer::{ResponseWriter, serialize_request, serialize_response};

#[test]
fn test_serialize_pending_response_without_headers() {
    let res = Response::new();

    assert_eq!(serialize_response(&res), b"HTTP/1.1 200 OK\r\n\r\n".to_vec());
}

#[test]
fn test_serialize_response_headers_in_wire_case() {
    let mut res = Response::new();
    res.set_status(StatusCode::NotFound).unwrap();
    res.set_header("content-type", "text/plain").unwrap();
    res.set_header("x-request-id", "42").unwrap();
    res.set_body("missing").unwrap();

    let wire = String::from_utf8(serialize_response(&res)).unwrap();

    assert_eq!(
        wire,
        "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nX-Request-Id: 42\r\n\r\nmissing"
    );
}

#[test]
fn test_serialize_response_set_cookie_after_headers() {
    let mut res = Response::new();
    res.set_header("Content-Length", "0").unwrap();
    res.set_cookie("a", "1", CookieOptions::default()).unwrap();
    res.set_cookie("b", "2", CookieOptions::default()).unwrap();

    let wire = String::from_utf8(serialize_response(&res)).unwrap();

    assert_eq!(
        wire,
        "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n"
    );
}

#[test]
fn test_serialize_response_binary_body() {
    let mut res = Response::new();
    res.set_body(vec![0u8, 255, 10]).unwrap();

    let wire = serialize_response(&res);

    assert!(wire.ends_with(b"\r\n\r\n\x00\xff\x0a"));
}

#[test]
fn test_serialize_request_adds_content_length() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/file/a")
        .header("Host", "localhost")
        .body(b"hello".to_vec())
        .build()
        .unwrap();

    let wire = String::from_utf8(serialize_request(&req)).unwrap();

    assert_eq!(
        wire,
        "POST /file/a HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello"
    );
}

#[test]
fn test_serialize_request_encodes_query() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/search")
        .query("q", "a b")
        .build()
        .unwrap();

    let wire = String::from_utf8(serialize_request(&req)).unwrap();

    assert_eq!(wire, "GET /search?q=a+b HTTP/1.1\r\n\r\n");
}

#[tokio::test]
async fn test_response_writer_writes_everything() {
    let res = Response::ok("hi").unwrap();
    let wire = res.wire_bytes().unwrap();

    let mut writer = ResponseWriter::new(wire.clone());
    let mut out: Vec<u8> = Vec::new();
    writer.write_to_stream(&mut out).await.unwrap();

    assert_eq!(writer.len(), wire.len());
    assert_eq!(out, wire.to_vec());
}
