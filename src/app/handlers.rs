//! Endpoint handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::store::FileStore;
use crate::http::response::{Response, ResponseError, StatusCode};
use crate::http::router::{Handler, Next, RequestContext};

/// First link of every chain: records the request, then hands off.
pub fn log_request(req: &RequestContext<'_>, _res: &mut Response) -> Result<Next, ResponseError> {
    info!(
        method = %req.method,
        path = %req.path,
        body = req.body.len(),
        "Handling request"
    );
    Ok(Next::Continue)
}

/// `GET /`
pub struct Root;

#[async_trait]
impl Handler for Root {
    async fn call(&self, _req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        res.send_status(StatusCode::Ok)?;
        Ok(Next::Halt)
    }
}

/// `GET /echo/:message` - answers with the message as plain text.
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        let message = req.param("message").unwrap_or_default();
        res.text(message)?;
        Ok(Next::Halt)
    }
}

/// `GET /user-agent` - answers with the client's `User-Agent`.
pub struct UserAgent;

#[async_trait]
impl Handler for UserAgent {
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        res.text(req.user_agent().unwrap_or_default())?;
        Ok(Next::Halt)
    }
}

/// `GET /file/:name` - serves a stored file, or 404.
pub struct ReadFile {
    store: Arc<dyn FileStore>,
}

impl ReadFile {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for ReadFile {
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        let name = req.param("name").unwrap_or_default();

        match self.store.read(name).await {
            Ok(Some(contents)) => res.bytes(contents)?,
            Ok(None) => res.send_status(StatusCode::NotFound)?,
            Err(e) => {
                warn!(file = name, error = %e, "Failed to read file");
                res.send_status(StatusCode::NotFound)?;
            }
        }

        Ok(Next::Halt)
    }
}

/// `POST /file/:name` - stores the request body under `name`.
pub struct WriteFile {
    store: Arc<dyn FileStore>,
}

impl WriteFile {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for WriteFile {
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        let name = req.param("name").unwrap_or_default();

        match self.store.write(name, &req.body).await {
            Ok(()) => {
                info!(file = name, bytes = req.body.len(), "Stored file");
                res.send_status(StatusCode::Created)?;
            }
            Err(e) => {
                warn!(file = name, error = %e, "Failed to write file");
                res.send_status(StatusCode::InternalServerError)?;
            }
        }

        Ok(Next::Halt)
    }
}
