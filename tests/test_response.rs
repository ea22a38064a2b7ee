use streamix::http::response::{Response, ResponseBuilder, StatusCode};
use streamix::http::writer::serialize_response;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(
        StatusCode::MethodNotAllowed.reason_phrase(),
        "Method Not Allowed"
    );
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"Hello, World!".to_vec());
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    let content_length = response.headers.get("Content-Length").unwrap();
    assert_eq!(content_length, &body.len().to_string());
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    // Should keep the custom value
    assert_eq!(response.headers.get("Content-Length").unwrap(), "999");
}

#[test]
fn test_empty_body_gets_no_content_length() {
    // A headers-only response advertises its length explicitly or not at
    // all; nothing is derived from the empty inline body.
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert!(response.body.is_empty());
    assert!(!response.headers.contains_key("Content-Length"));
}

#[test]
fn test_every_response_closes_the_connection() {
    let responses = [
        Response::ok_stream(10),
        Response::method_not_allowed(),
        Response::internal_error(),
        ResponseBuilder::new(StatusCode::Ok)
            .header("Connection", "keep-alive")
            .build(),
    ];

    for response in responses {
        assert_eq!(
            response.headers.get("Connection").map(String::as_str),
            Some("close")
        );
    }
}

#[test]
fn test_ok_stream_announces_length_with_empty_body() {
    let response = Response::ok_stream(1_048_576);

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
    assert_eq!(
        response.headers.get("Content-Length").unwrap(),
        "1048576"
    );
    assert_eq!(
        response.headers.get("Content-Type").unwrap(),
        "application/octet-stream"
    );
}

#[test]
fn test_method_not_allowed_lists_allowed_methods() {
    let response = Response::method_not_allowed();

    assert_eq!(response.status, StatusCode::MethodNotAllowed);
    assert_eq!(response.headers.get("Allow").unwrap(), "GET, HEAD");
    assert_eq!(response.body, b"405 Method Not Allowed".to_vec());
    // The short text body carries its own length
    assert_eq!(
        response.headers.get("Content-Length").unwrap(),
        &response.body.len().to_string()
    );
}

#[test]
fn test_internal_error_helper() {
    let response = Response::internal_error();

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.body, b"500 Internal Server Error".to_vec());
}

#[test]
fn test_serialized_response_shape() {
    let bytes = serialize_response(&Response::method_not_allowed());
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(text.contains("Allow: GET, HEAD\r\n"));
    assert!(text.contains("Connection: close\r\n"));
    // Blank line between headers and body
    assert!(text.contains("\r\n\r\n405 Method Not Allowed"));
    assert!(text.ends_with("405 Method Not Allowed"));
}

#[test]
fn test_serialized_headers_only_response_ends_with_blank_line() {
    let bytes = serialize_response(&Response::ok_stream(42));
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Length: 42\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}
