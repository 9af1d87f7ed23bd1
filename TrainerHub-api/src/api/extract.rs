//! JSON body extractors that answer malformed bodies in the caller's error format

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use trainer_hub_domain::errors::ServiceError;

use crate::entities::functions::FunctionErrorBody;

/// JSON body for the REST surface; a bad body becomes an `INVALID_INPUT` envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(ServiceError::InvalidInput(rejection.body_text()))
            }
        }
    }
}

/// JSON body for the function surface; a bad body becomes `{ "error": ... }`
#[derive(Debug, Clone)]
pub struct FunctionBody<T>(pub T);

/// Rejection of [`FunctionBody`]
#[derive(Debug)]
pub struct FunctionBodyRejection(JsonRejection);

impl IntoResponse for FunctionBodyRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(FunctionErrorBody {
                error: format!("Invalid request body: {}", self.0.body_text()),
            }),
        )
            .into_response()
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for FunctionBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = FunctionBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(FunctionBodyRejection)
    }
}
