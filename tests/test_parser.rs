use courier::http::parser::{ParseError, parse_http_request};
use courier::http::request::Method;
use courier::http::writer::serialize_request;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.header("Host").unwrap(), "example.com");
    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /file/data.txt HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/file/data.txt");
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_body_without_content_length_takes_remainder() {
    let req = b"POST /upload HTTP/1.1\r\nHost: localhost\r\n\r\nrest of the stream";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"rest of the stream".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_body_truncated_to_content_length() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"abc".to_vec());
    assert_eq!(consumed, req.len() - 3);
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("Host").unwrap(), "example.com");
    assert_eq!(parsed.header("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.header("Accept").unwrap(), "*/*");
    assert_eq!(parsed.headers.len(), 3);
}

#[test]
fn test_parse_header_names_case_insensitive() {
    let req = b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("content-type"), Some("application/json"));
    assert_eq!(parsed.header("CONTENT-TYPE"), Some("application/json"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Token: first\r\nx-token: second\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("X-Token"), Some("second"));
    assert_eq!(parsed.headers.len(), 1);
}

#[test]
fn test_parse_header_value_splits_on_first_colon() {
    let req = b"GET / HTTP/1.1\r\nHost: localhost:4221\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("localhost:4221"));
}

#[test]
fn test_parse_header_value_strips_one_leading_space() {
    let req = b"GET / HTTP/1.1\r\nX-A:  padded\r\nX-B:tight\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("X-A"), Some(" padded"));
    assert_eq!(parsed.header("X-B"), Some("tight"));
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust+lang&page=2&tag=a%26b HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/search");
    assert_eq!(parsed.query_param("q"), Some("rust lang"));
    assert_eq!(parsed.query_param("page"), Some("2"));
    assert_eq!(parsed.query_param("tag"), Some("a&b"));
}

#[test]
fn test_parse_version_token_is_optional() {
    let req = b"GET /echo/abc\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/echo/abc");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_incomplete_request_partial_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_invalid_http_method() {
    let req = b"PATCH / HTTP/1.1\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidMethod(m)) if m == "PATCH"));
}

#[test]
fn test_parse_missing_path() {
    let req = b"GET\r\nHost: example.com\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
}

#[test]
fn test_parse_empty_request_line() {
    let req = b"\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: example.com\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
}

#[test]
fn test_parse_trailing_line_without_colon_is_ignored() {
    let req = b"GET / HTTP/1.1\r\nHost: x\r\nbogus\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("x"));
    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_line_without_colon_before_header_is_rejected() {
    let req = b"GET / HTTP/1.1\r\nbogus\r\nstill bogus\r\nHost: x\r\n\r\n";
    let result = parse_http_request(req);

    assert_eq!(result.err(), Some(ParseError::InvalidHeader("bogus".to_string())));
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidContentLength(_))));
}

#[test]
fn test_parse_relative_target_rejected() {
    let req = b"GET echo/abc HTTP/1.1\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidPath(_))));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
}

#[test]
fn test_serialize_then_parse_reconstructs_request() {
    let inputs: Vec<&[u8]> = vec![
        b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n",
        b"GET /search?q=a+b&n=1 HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
        b"POST /file/x HTTP/1.1\r\nContent-Length: 5\r\nContent-Type: text/plain\r\n\r\nhello",
        b"DELETE /users/42 HTTP/1.1\r\nCookie: a=1; b=2\r\n\r\n",
    ];

    for input in inputs {
        let (first, _) = parse_http_request(input).unwrap();
        let wire = serialize_request(&first);
        let (second, consumed) = parse_http_request(&wire).unwrap();

        assert_eq!(consumed, wire.len());
        assert_eq!(second.method, first.method);
        assert_eq!(second.path, first.path);
        assert_eq!(second.query, first.query);
        assert_eq!(second.headers, first.headers);
        assert_eq!(second.body, first.body);
    }
}
