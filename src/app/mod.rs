//! The endpoints served by the `courier` binary.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use crate::config::Config;
use crate::http::request::Method;
use crate::http::router::{Router, boxed, from_fn};

use handlers::{Echo, ReadFile, Root, UserAgent, WriteFile, log_request};
use store::{DiskStore, FileStore};

/// Builds the route table, with files kept in the configured directory.
pub fn router(cfg: &Config) -> Router {
    router_with_store(Arc::new(DiskStore::new(cfg.files.directory.clone())))
}

pub fn router_with_store(store: Arc<dyn FileStore>) -> Router {
    let mut router = Router::new();

    router
        .route(Method::GET, "/", vec![boxed(from_fn(log_request)), boxed(Root)])
        .route(
            Method::GET,
            "/echo/:message",
            vec![boxed(from_fn(log_request)), boxed(Echo)],
        )
        .route(
            Method::GET,
            "/user-agent",
            vec![boxed(from_fn(log_request)), boxed(UserAgent)],
        )
        .route(
            Method::GET,
            "/file/:name",
            vec![boxed(from_fn(log_request)), boxed(ReadFile::new(Arc::clone(&store)))],
        )
        .route(
            Method::POST,
            "/file/:name",
            vec![boxed(from_fn(log_request)), boxed(WriteFile::new(store))],
        );

    router
}
