use std::{convert::Infallible, sync::Arc};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use signage_collab::{EventRegistry, Signage};

#[derive(Clone)]
pub struct ServerContext {
    pub signage: Arc<Signage>,
}

impl ServerContext {
    pub fn new(signage: Signage) -> Self {
        Self {
            signage: Arc::new(signage),
        }
    }

    pub fn events(&self) -> &Arc<EventRegistry> {
        &self.signage.events
    }
}

/// Lets handlers take the context directly as an argument
#[async_trait]
impl FromRequestParts<ServerContext> for ServerContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
