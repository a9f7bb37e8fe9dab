//! Custom Axum extractors.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::utils::error::AppError;

/// JSON body extractor that reports every decoding failure as
/// [`AppError::InvalidJson`], so malformed bodies get the standard error
/// envelope. The `Content-Type` header is not inspected.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidJson(format!("Failed to read request body: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map(ApiJson)
            .map_err(|e| AppError::InvalidJson(e.to_string()))
    }
}
