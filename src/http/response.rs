use thiserror::Error;

use crate::http::headers::Headers;

/// HTTP status codes this server knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unsupported status code: {0}")]
pub struct InvalidStatus(pub u16);

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Maps a numeric code onto a supported status.
    pub fn from_u16(code: u16) -> Result<Self, InvalidStatus> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(InvalidStatus(other)),
        }
    }
}

pub const OK_BODY: &str = r#"<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was served as written.</p>
  </body>
</html>"#;

pub const BAD_REQUEST_BODY: &str = r#"<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request could not be understood.</p>
  </body>
</html>"#;

pub const INTERNAL_ERROR_BODY: &str = r#"<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Something broke on our side.</p>
  </body>
</html>"#;

/// Baseline headers for a plain response of `content_len` bytes.
///
/// Handlers are expected to override `Content-Type` (via
/// [`Headers::replace`]) before writing.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", &content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}
