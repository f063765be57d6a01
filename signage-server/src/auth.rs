use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use std::convert::Infallible;

use crate::context::ServerContext;

/// Header naming who is making a change. It is trusted as is.
pub const CREATOR_HEADER: &str = "x-creator-id";

/// The creator stamped onto new records, taken from [CREATOR_HEADER]
/// and falling back to the configured default
pub struct Creator(pub String);

#[async_trait]
impl FromRequestParts<ServerContext> for Creator {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let creator = parts
            .headers
            .get(CREATOR_HEADER)
            .and_then(|x| x.to_str().ok())
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| state.signage.config.default_creator.clone());

        Ok(Self(creator))
    }
}

impl Creator {
    pub fn id(&self) -> &str {
        &self.0
    }
}
