//! Interchangeable [`Handler`] implementations.
//!
//! All three drive the response writer through a legal write sequence and
//! log (rather than propagate) their own failures; by the time a handler
//! runs, the only party left to tell is the log.

use std::path::PathBuf;

use anyhow::Context;
use bytes::{Buf, BytesMut};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{error, warn};
use url::Url;

use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{self, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::{Handler, write_response};

const UPSTREAM_READ_SIZE: usize = 8192;
const MAX_UPSTREAM_HEADER_BYTES: usize = 64 * 1024;

/// Fixed HTML responses: `/yourproblem` → 400, `/myproblem` → 500,
/// anything else → 200.
pub struct DefaultHandler;

impl Handler for DefaultHandler {
    async fn handle<W: AsyncWrite + Unpin + Send>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) {
        let (status, body) = match req.request_line.request_target.as_str() {
            "/yourproblem" => (StatusCode::BadRequest, response::BAD_REQUEST_BODY),
            "/myproblem" => (StatusCode::InternalServerError, response::INTERNAL_ERROR_BODY),
            _ => (StatusCode::Ok, response::OK_BODY),
        };
        respond_html(w, status, body).await;
    }
}

/// Relays `/httpbin/<rest>` from a configured upstream as a chunked
/// response with content-hash and content-length trailers.
pub struct ProxyHandler {
    base: Url,
}

impl ProxyHandler {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).context("invalid proxy base URL")?;
        Ok(Self { base })
    }

    async fn fetch_and_relay<W: AsyncWrite + Unpin + Send>(
        &self,
        w: &mut ResponseWriter<W>,
        rest: &str,
    ) -> anyhow::Result<()> {
        let url = self.base.join(rest).context("invalid proxy target")?;
        let host = url.host_str().context("upstream URL missing host")?;
        let port = url.port().unwrap_or(80);

        let mut stream = TcpStream::connect((host, port))
            .await
            .context("failed to connect to upstream")?;

        let host_value = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path = format!("{path}?{query}");
        }
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: {host_value}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;

        // read the upstream status line and headers; whatever follows the
        // blank line is body and stays buffered
        let mut buf = BytesMut::with_capacity(UPSTREAM_READ_SIZE);
        let body_start = loop {
            let n = stream.read_buf(&mut buf).await?;
            if n == 0 {
                anyhow::bail!("upstream closed before sending complete headers");
            }
            if let Some(idx) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break idx + 4;
            }
            if buf.len() > MAX_UPSTREAM_HEADER_BYTES {
                anyhow::bail!("upstream response headers too large");
            }
        };
        // the upstream framing is replaced with our own chunked framing
        buf.advance(body_start);

        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("Transfer-Encoding", "chunked");
        headers.set("Connection", "close");
        headers.set("Trailer", "X-Content-SHA256");
        headers.set("Trailer", "X-Content-Length");

        w.write_status_line(StatusCode::Ok).await?;
        w.write_headers(&headers).await?;

        // relay each upstream read as one chunk, hashing as we go
        let mut hasher = Sha256::new();
        let mut total = 0usize;
        loop {
            if !buf.is_empty() {
                hasher.update(&buf);
                total += buf.len();
                w.write_chunked_body(&buf).await?;
                buf.clear();
            }
            let n = stream.read_buf(&mut buf).await?;
            if n == 0 {
                break;
            }
        }
        w.write_chunked_body_done_with_trailers().await?;

        let digest = hasher.finalize();
        let digest_hex: String = digest.iter().map(|b| format!("{b:02X}")).collect();

        let mut trailers = Headers::new();
        trailers.set("X-Content-SHA256", &digest_hex);
        trailers.set("X-Content-Length", &total.to_string());
        w.write_trailers(&trailers).await?;

        Ok(())
    }
}

impl Handler for ProxyHandler {
    async fn handle<W: AsyncWrite + Unpin + Send>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) {
        let target = &req.request_line.request_target;
        let Some(rest) = target.strip_prefix("/httpbin/") else {
            respond_html(w, StatusCode::Ok, response::OK_BODY).await;
            return;
        };

        if let Err(e) = self.fetch_and_relay(w, rest).await {
            error!(error = %e, %target, "proxy relay failed");
        }
    }
}

/// Serves one file from disk at `/video` with a fixed content type.
pub struct StaticFileHandler {
    path: PathBuf,
}

impl StaticFileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Handler for StaticFileHandler {
    async fn handle<W: AsyncWrite + Unpin + Send>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) {
        if req.request_line.request_target != "/video" {
            respond_html(w, StatusCode::Ok, response::OK_BODY).await;
            return;
        }

        let payload = match tokio::fs::read(&self.path).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read file");
                respond_html(w, StatusCode::InternalServerError, response::INTERNAL_ERROR_BODY)
                    .await;
                return;
            }
        };

        let mut headers = response::default_headers(payload.len());
        if let Err(e) = headers.replace("Content-Type", "video/mp4") {
            error!(error = %e, "failed to set content type");
            return;
        }
        if let Err(e) = write_response(w, StatusCode::Ok, &headers, &payload).await {
            error!(error = %e, "failed to write file response");
        }
    }
}

/// Writes a complete `text/html` response, logging any failure.
async fn respond_html<W: AsyncWrite + Unpin>(
    w: &mut ResponseWriter<W>,
    status: StatusCode,
    body: &str,
) {
    let mut headers = response::default_headers(body.len());
    if let Err(e) = headers.replace("Content-Type", "text/html") {
        error!(error = %e, "failed to set content type");
        return;
    }
    if let Err(e) = write_response(w, status, &headers, body.as_bytes()).await {
        error!(error = %e, "failed to write response");
    }
}
