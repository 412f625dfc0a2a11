//! Courier - a small HTTP/1.1 server
//!
//! Core library: wire parsing and serialization, routing, content
//! negotiation, plus the file and echo endpoints served by the binary.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
