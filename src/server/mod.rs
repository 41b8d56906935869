//! Connection server: TCP accept loop, per-connection tasks, graceful
//! shutdown, and the handler seam between the two.
//!
//! One task is spawned per accepted connection; each task owns its
//! connection end-to-end (parse, then handle, then close) so no ordering
//! can interleave within a connection. `Server::close` stops the accept
//! loop but never cancels connections already in flight.

pub mod listener;

pub use listener::{Handler, Server, ServerError, serve, write_response};
