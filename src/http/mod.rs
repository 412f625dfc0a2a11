//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.1 server core on top of a raw byte
//! stream: one request and one response per connection.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and accessors
//! - **`headers`**: Case-insensitive, ordered header storage
//! - **`cookie`**: `Cookie` / `Set-Cookie` codec
//! - **`router`**: Route matching and handler-chain execution
//! - **`response`**: HTTP response with a single-shot send state
//! - **`encoding`**: `Accept-Encoding` negotiation (gzip)
//! - **`writer`**: Serializes and writes HTTP messages
//! - **`connection`**: The per-connection request/response state machine
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received (malformed → 400)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route and run the handler chain
//!        └──────┬───────────┘
//!               │ Response sent (no route → 404)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response bytes to client
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! Serving one socket with a single route:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use courier::http::connection::Connection;
//! use courier::http::request::Method;
//! use courier::http::response::Response;
//! use courier::http::router::{Next, RequestContext, Router, boxed, from_fn};
//!
//! # async fn serve(socket: tokio::net::TcpStream) -> anyhow::Result<()> {
//! let mut router = Router::new();
//! router.route(
//!     Method::GET,
//!     "/hello/:name",
//!     vec![boxed(from_fn(|req: &RequestContext<'_>, res: &mut Response| {
//!         res.text(format!("hello {}", req.param("name").unwrap_or_default()))?;
//!         Ok(Next::Halt)
//!     }))],
//! );
//!
//! let mut conn = Connection::new(socket, Arc::new(router));
//! conn.run().await
//! # }
//! ```

pub mod connection;
pub mod cookie;
pub mod encoding;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
