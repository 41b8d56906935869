use hearth::http::headers::Headers;
use hearth::http::response::{self, StatusCode};
use hearth::http::writer::{ResponseWriter, WriteError};
use hearth::server::write_response;

fn framing_headers() -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", "5");
    headers
}

#[tokio::test]
async fn test_status_line_wire_format() {
    for (status, expected) in [
        (StatusCode::Ok, "HTTP/1.1 200 OK\r\n"),
        (StatusCode::BadRequest, "HTTP/1.1 400 Bad Request\r\n"),
        (
            StatusCode::InternalServerError,
            "HTTP/1.1 500 Internal Server Error\r\n",
        ),
    ] {
        let mut w = ResponseWriter::new(Vec::new());
        w.write_status_line(status).await.unwrap();
        assert_eq!(w.into_inner(), expected.as_bytes());
    }
}

#[tokio::test]
async fn test_full_plain_response_wire_format() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    w.write_body(b"hello").await.unwrap();

    let out = w.into_inner();
    assert_eq!(
        out,
        b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello"
    );
}

#[tokio::test]
async fn test_headers_before_status_line_is_rejected() {
    let mut w = ResponseWriter::new(Vec::new());
    let err = w.write_headers(&framing_headers()).await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

#[tokio::test]
async fn test_body_before_headers_is_rejected() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    let err = w.write_body(b"hello").await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

#[tokio::test]
async fn test_empty_headers_are_rejected() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    let err = w.write_headers(&Headers::new()).await.unwrap_err();
    assert!(matches!(err, WriteError::NoHeaders));
}

#[tokio::test]
async fn test_double_body_write_is_rejected() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    w.write_body(b"hello").await.unwrap();

    let err = w.write_body(b"again").await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

#[tokio::test]
async fn test_zero_length_body_still_satisfies_sequence() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    assert_eq!(w.write_body(b"").await.unwrap(), 0);

    // the sequence advanced, so a second body write is out of order
    let err = w.write_body(b"late").await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

#[tokio::test]
async fn test_chunked_body_wire_format() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    w.write_chunked_body(b"hello world, this is 26b..").await.unwrap();
    w.write_chunked_body(b"ok").await.unwrap();
    w.write_chunked_body_done().await.unwrap();

    let out = String::from_utf8(w.into_inner()).unwrap();
    let body = out.split_once("\r\n\r\n").unwrap().1;
    assert_eq!(
        body,
        "1A\r\nhello world, this is 26b..\r\n2\r\nok\r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn test_zero_length_chunk_is_a_noop() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    assert_eq!(w.write_chunked_body(b"").await.unwrap(), 0);

    // state did not advance, so terminating the chunk stream is illegal
    let err = w.write_chunked_body_done().await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

#[tokio::test]
async fn test_chunked_done_with_trailers_wire_format() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    w.write_chunked_body(b"data").await.unwrap();
    w.write_chunked_body_done_with_trailers().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "4");
    w.write_trailers(&trailers).await.unwrap();

    let out = String::from_utf8(w.into_inner()).unwrap();
    let body = out.split_once("\r\n\r\n").unwrap().1;
    assert_eq!(body, "4\r\ndata\r\n0\r\nx-content-length: 4\r\n\r\n");
}

#[tokio::test]
async fn test_trailers_without_done_with_trailers_is_rejected() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    w.write_chunked_body(b"data").await.unwrap();
    w.write_chunked_body_done().await.unwrap();

    let err = w.write_trailers(&framing_headers()).await.unwrap_err();
    assert!(matches!(err, WriteError::InvalidWriteSequence(_)));
}

/// Minimal conforming chunked decoder for the round-trip test.
fn decode_chunked(mut data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let line_end = data.windows(2).position(|w| w == b"\r\n").unwrap();
        let size_line = std::str::from_utf8(&data[..line_end]).unwrap();
        let size = usize::from_str_radix(size_line, 16).unwrap();
        data = &data[line_end + 2..];
        if size == 0 {
            break;
        }
        out.extend_from_slice(&data[..size]);
        assert_eq!(&data[size..size + 2], b"\r\n");
        data = &data[size + 2..];
    }
    out
}

#[tokio::test]
async fn test_chunked_round_trip_reconstructs_original_bytes() {
    let pushes: [&[u8]; 4] = [b"first", b"second push", b"x", b"and the final stretch"];

    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&framing_headers()).await.unwrap();
    for push in pushes {
        w.write_chunked_body(push).await.unwrap();
    }
    w.write_chunked_body_done().await.unwrap();

    let out = w.into_inner();
    let split = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    assert_eq!(decode_chunked(&out[split..]), pushes.concat());
}

#[tokio::test]
async fn test_write_response_drives_the_full_sequence() {
    let mut w = ResponseWriter::new(Vec::new());
    let headers = response::default_headers(2);
    write_response(&mut w, StatusCode::Ok, &headers, b"ok")
        .await
        .unwrap();

    let out = String::from_utf8(w.into_inner()).unwrap();
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.contains("content-length: 2\r\n"));
    assert!(out.contains("connection: close\r\n"));
    assert!(out.contains("content-type: text/plain\r\n"));
    assert!(out.ends_with("\r\n\r\nok"));
}

#[test]
fn test_default_headers_baseline() {
    let headers = response::default_headers(42);
    assert_eq!(headers.get("content-length").unwrap(), Some("42"));
    assert_eq!(headers.get("connection").unwrap(), Some("close"));
    assert_eq!(headers.get("content-type").unwrap(), Some("text/plain"));
}

#[test]
fn test_status_code_from_u16() {
    assert_eq!(StatusCode::from_u16(200).unwrap(), StatusCode::Ok);
    assert_eq!(StatusCode::from_u16(400).unwrap(), StatusCode::BadRequest);
    assert_eq!(
        StatusCode::from_u16(500).unwrap(),
        StatusCode::InternalServerError
    );
    assert!(StatusCode::from_u16(404).is_err());
    assert!(StatusCode::from_u16(418).is_err());
}
