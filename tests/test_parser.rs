use breakwater::http::parser::{find_head_end, parse_head, parse_websocket_key, ParseError};
use breakwater::http::request::Verb;

fn allow_none(_uri: &str) -> bool {
    false
}

fn allow_all(_uri: &str) -> bool {
    true
}

fn head(req: &str) -> Vec<u8> {
    // Strip the blank line the way the connection does before parsing.
    let end = find_head_end(req.as_bytes()).expect("head terminator");
    req.as_bytes()[..end].to_vec()
}

#[test]
fn test_parse_simple_get_request() {
    let parsed = parse_head(
        &head("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n"),
        &allow_none,
    )
    .unwrap();

    assert_eq!(parsed.verb, Verb::Get);
    assert_eq!(parsed.uri, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert_eq!(parsed.content_length, 0);
}

#[test]
fn test_parse_header_lookup_is_case_insensitive() {
    let parsed = parse_head(
        &head("GET / HTTP/1.1\r\nContent-Type: text/plain\r\n\r\n"),
        &allow_none,
    )
    .unwrap();

    assert_eq!(parsed.headers.get("content-type").unwrap(), "text/plain");
    assert_eq!(parsed.headers.get("CONTENT-TYPE").unwrap(), "text/plain");
    assert!(parsed.headers.contains("Content-Type"));
}

#[test]
fn test_parse_duplicate_headers_last_wins() {
    let parsed = parse_head(
        &head("GET / HTTP/1.1\r\nX-Thing: one\r\nx-thing: two\r\n\r\n"),
        &allow_none,
    )
    .unwrap();

    assert_eq!(parsed.headers.get("X-Thing").unwrap(), "two");
    assert_eq!(parsed.headers.len(), 1);
}

#[test]
fn test_parse_header_value_trims_leading_whitespace() {
    let parsed = parse_head(
        &head("GET / HTTP/1.1\r\nX-Padded:   value\r\n\r\n"),
        &allow_none,
    )
    .unwrap();

    assert_eq!(parsed.headers.get("X-Padded").unwrap(), "value");
}

#[test]
fn test_parse_request_with_query_string() {
    let parsed = parse_head(
        &head("GET /search?q=rust HTTP/1.1\r\nHost: x\r\n\r\n"),
        &allow_none,
    )
    .unwrap();

    assert_eq!(parsed.uri, "/search?q=rust");
}

#[test]
fn test_parse_missing_version_is_malformed() {
    let result = parse_head(&head("GET /\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_parse_trailing_content_on_request_line() {
    let result = parse_head(&head("GET / HTTP/1.1 extra\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_parse_bad_version_wins_over_trailing_content() {
    // The version mismatch is detected before trailing request-line junk.
    let result = parse_head(&head("GET / HTTP/1.0 extra\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::UnsupportedVersion)));
}

#[test]
fn test_parse_unknown_verb_is_malformed() {
    let result = parse_head(&head("BREW / HTTP/1.1\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_parse_http_10_is_unsupported() {
    let result = parse_head(&head("GET / HTTP/1.0\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::UnsupportedVersion)));
}

#[test]
fn test_parse_header_without_colon_is_malformed() {
    let result = parse_head(&head("GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n"), &allow_none);
    assert!(matches!(result, Err(ParseError::MalformedHeader)));
}

#[test]
fn test_parse_content_length() {
    let parsed = parse_head(
        &head("POST /api HTTP/1.1\r\nContent-Length: 42\r\n\r\n"),
        &allow_none,
    )
    .unwrap();
    assert_eq!(parsed.content_length, 42);
}

#[test]
fn test_parse_garbage_content_length_reads_as_zero() {
    let parsed = parse_head(
        &head("POST /api HTTP/1.1\r\nContent-Length: banana\r\n\r\n"),
        &allow_none,
    )
    .unwrap();
    assert_eq!(parsed.content_length, 0);
}

#[test]
fn test_parse_upgrade_flags() {
    let parsed = parse_head(
        &head("GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: WebSocket\r\n\r\n"),
        &allow_none,
    )
    .unwrap();
    assert!(parsed.connection_upgrade);
    assert!(parsed.websocket_upgrade);
}

#[test]
fn test_parse_no_upgrade_flags_for_keep_alive() {
    let parsed = parse_head(
        &head("GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n"),
        &allow_none,
    )
    .unwrap();
    assert!(!parsed.connection_upgrade);
    assert!(!parsed.websocket_upgrade);
}

#[test]
fn test_parse_websocket_key_classic_vectors() {
    // The draft-76 example keys.
    assert_eq!(
        parse_websocket_key("18x 6]8vM;54 *(5:  {   U1]8  z [  8"),
        155_712_099
    );
    assert_eq!(
        parse_websocket_key("1_ tx7X d  <  nw  334J702) 7]o}` 0"),
        173_347_027
    );
}

#[test]
fn test_parse_websocket_key_without_spaces_is_zero() {
    assert_eq!(parse_websocket_key("12345"), 0);
    assert_eq!(parse_websocket_key(""), 0);
}

#[test]
fn test_parse_hixie_keys_from_headers() {
    let parsed = parse_head(
        &head(
            "GET /ws HTTP/1.1\r\n\
             Sec-WebSocket-Key1: 4 @1  46546xW%0l 1 5\r\n\
             Sec-WebSocket-Key2: 12998 5 Y3 1  .P00\r\n\r\n",
        ),
        &allow_none,
    )
    .unwrap();
    assert_eq!(parsed.websocket_keys[0], parse_websocket_key("4 @1  46546xW%0l 1 5"));
    assert_eq!(parsed.websocket_keys[1], parse_websocket_key("12998 5 Y3 1  .P00"));
}

#[test]
fn test_parse_hixie_location_header_same_origin() {
    let parsed = parse_head(
        &head("GET /chat HTTP/1.1\r\nHost: example.com\r\n\r\n"),
        &allow_none,
    )
    .unwrap();
    assert!(parsed
        .hixie_extra_headers
        .contains("Sec-WebSocket-Origin: http://example.com\r\n"));
    assert!(parsed
        .hixie_extra_headers
        .contains("Sec-WebSocket-Location: ws://example.com/chat\r\n"));
    assert_eq!(parsed.host.as_deref(), Some("example.com"));
}

#[test]
fn test_parse_hixie_origin_echoed_when_cross_origin_allowed() {
    let parsed = parse_head(
        &head("GET /chat HTTP/1.1\r\nOrigin: http://other.test\r\nHost: example.com\r\n\r\n"),
        &allow_all,
    )
    .unwrap();
    assert!(parsed
        .hixie_extra_headers
        .contains("Sec-WebSocket-Origin: http://other.test\r\n"));
    // The http://<host> origin is only synthesised for same-origin setups.
    assert!(!parsed
        .hixie_extra_headers
        .contains("Sec-WebSocket-Origin: http://example.com"));
}

#[test]
fn test_find_head_end() {
    assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nrest"), Some(14));
    assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
}
