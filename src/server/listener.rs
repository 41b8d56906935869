use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::io::AsyncWrite;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{self, StatusCode};
use crate::http::writer::{ResponseWriter, WriteError};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    #[error("trying to close a server that is already closed")]
    AlreadyClosed,
}

/// A request handler.
///
/// The server only invokes `handle` with a syntactically valid, fully
/// parsed request; the handler is responsible for driving the writer
/// through a legal write sequence before returning.
pub trait Handler: Send + Sync + 'static {
    fn handle<W: AsyncWrite + Unpin + Send>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) -> impl Future<Output = ()> + Send;
}

/// Handle to a running server.
///
/// `running` distinguishes an intentional shutdown from an unexpected
/// accept failure; it is the only shared state mutated after startup.
pub struct Server {
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    local_addr: SocketAddr,
}

impl Server {
    /// The address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections.
    ///
    /// Connections already in flight run to completion. A second call
    /// reports `AlreadyClosed`.
    pub fn close(&self) -> Result<(), ServerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(ServerError::AlreadyClosed);
        }
        info!("closing server");
        self.shutdown.notify_one();
        Ok(())
    }
}

/// Binds a TCP listener on `port` and starts the accept loop in the
/// background, returning the server handle immediately.
pub async fn serve<H: Handler>(handler: H, port: u16) -> anyhow::Result<Server> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "listening");

    let running = Arc::new(AtomicBool::new(true));
    let shutdown = Arc::new(Notify::new());

    tokio::spawn(listen(
        listener,
        Arc::new(handler),
        Arc::clone(&running),
        Arc::clone(&shutdown),
    ));

    Ok(Server {
        running,
        shutdown,
        local_addr,
    })
}

/// The accept loop. Exactly one runs per server for its lifetime.
async fn listen<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("listener closed, not accepting any more connections");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    info!(%peer, "accepted connection");
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        handle_connection(socket, peer, handler).await;
                    });
                }
                Err(e) => {
                    if !running.load(Ordering::SeqCst) {
                        // shutdown-induced accept error, exit silently
                        return;
                    }
                    // a single bad accept must not kill the whole server
                    error!(error = %e, "error accepting connection");
                }
            }
        }
    }
}

/// Serves exactly one request/response cycle, then closes the connection.
async fn handle_connection<H: Handler>(stream: TcpStream, peer: SocketAddr, handler: Arc<H>) {
    let (mut read_half, write_half) = stream.into_split();
    let mut writer = ResponseWriter::new(write_half);

    let req = match Request::from_reader(&mut read_half).await {
        Ok(req) => req,
        Err(e) => {
            // the configured handler is never invoked for a malformed
            // request; answer with the fixed 400 page instead
            warn!(%peer, error = %e, "failed to parse request");

            let body = response::BAD_REQUEST_BODY.as_bytes();
            let mut headers = response::default_headers(body.len());
            if let Err(e) = headers.replace("Content-Type", "text/html") {
                error!(%peer, error = %e, "failed to build 400 headers");
                return;
            }
            if let Err(e) =
                write_response(&mut writer, StatusCode::BadRequest, &headers, body).await
            {
                error!(%peer, error = %e, "failed to write 400 response");
            }
            return;
        }
    };

    handler.handle(&mut writer, &req).await;
    // connection closes when the halves drop; no keep-alive
}

/// Drives a full legal write sequence for a plain (non-chunked) response.
pub async fn write_response<W: AsyncWrite + Unpin>(
    w: &mut ResponseWriter<W>,
    status: StatusCode,
    headers: &Headers,
    body: &[u8],
) -> Result<(), WriteError> {
    w.write_status_line(status).await?;
    w.write_headers(headers).await?;
    w.write_body(body).await?;
    Ok(())
}
