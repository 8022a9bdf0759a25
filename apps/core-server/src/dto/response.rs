use std::collections::BTreeMap;

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::openapi::RefOr;
use utoipa::openapi::response::Response as OpenApiResponse;
use utoipa::{IntoResponses, ToSchema};
use verification_core::service::error::ServiceError;

use super::error::ErrorResponseRestDTO;

#[derive(IntoResponses)]
pub enum ErrorResponse {
    #[response(status = 400, description = "Request cannot be processed")]
    BadRequest(#[to_schema] ErrorResponseRestDTO),

    #[response(status = 500, description = "Internal server error")]
    ServerError(#[to_schema] ErrorResponseRestDTO),
}

impl ErrorResponse {
    pub fn for_panic(message: String) -> Self {
        Self::ServerError(ErrorResponseRestDTO { message })
    }

    fn from_service_error(error: ServiceError) -> Self {
        let message = error.to_string();
        match &error {
            ServiceError::Validation(_)
            | ServiceError::BusinessLogic(_)
            | ServiceError::EntityNotFound(_)
            | ServiceError::CapabilityToken(_)
            | ServiceError::Transmit(_) => Self::BadRequest(ErrorResponseRestDTO { message }),
            _ => Self::ServerError(ErrorResponseRestDTO { message }),
        }
    }

    #[track_caller]
    pub fn from_service_error_with_trace(error: ServiceError, action_description: &str) -> Self {
        let location = std::panic::Location::caller();
        tracing::error!(%error, %location, "Error while {action_description}");
        Self::from_service_error(error)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(error) => (StatusCode::BAD_REQUEST, Json(error)),
            Self::ServerError(error) => (StatusCode::INTERNAL_SERVER_ERROR, Json(error)),
        }
        .into_response()
    }
}

fn with_error_responses<SuccessResponse: IntoResponses>()
-> BTreeMap<String, RefOr<OpenApiResponse>> {
    let mut responses = SuccessResponse::responses();
    responses.append(&mut ErrorResponse::responses());
    responses
}

pub enum OkOrErrorResponse<T> {
    Ok(T),
    Error(ErrorResponse),
}

impl<T> OkOrErrorResponse<T> {
    pub fn ok(value: impl Into<T>) -> Self {
        Self::Ok(value.into())
    }

    #[track_caller]
    pub fn from_result(
        result: Result<impl Into<T>, ServiceError>,
        action_description: &str,
    ) -> Self {
        match result {
            Ok(value) => Self::Ok(value.into()),
            Err(error) => Self::Error(ErrorResponse::from_service_error_with_trace(
                error,
                action_description,
            )),
        }
    }
}

impl<T> From<ErrorResponse> for OkOrErrorResponse<T> {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl<T: Serialize> IntoResponse for OkOrErrorResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Error(error) => error.into_response(),
        }
    }
}

impl<T: ToSchema> IntoResponses for OkOrErrorResponse<T> {
    fn responses() -> BTreeMap<String, RefOr<OpenApiResponse>> {
        #[derive(IntoResponses)]
        #[response(status = 200, description = "OK")]
        struct SuccessResponse<T: ToSchema>(#[to_schema] T);

        with_error_responses::<SuccessResponse<T>>()
    }
}

pub enum EmptyOrErrorResponse {
    Ok,
    Error(ErrorResponse),
}

impl EmptyOrErrorResponse {
    #[track_caller]
    pub fn from_result(result: Result<(), ServiceError>, action_description: &str) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(error) => Self::Error(ErrorResponse::from_service_error_with_trace(
                error,
                action_description,
            )),
        }
    }
}

impl From<ErrorResponse> for EmptyOrErrorResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl IntoResponse for EmptyOrErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok => StatusCode::OK.into_response(),
            Self::Error(error) => error.into_response(),
        }
    }
}

impl IntoResponses for EmptyOrErrorResponse {
    fn responses() -> BTreeMap<String, RefOr<OpenApiResponse>> {
        #[derive(IntoResponses)]
        #[response(status = 200, description = "OK")]
        struct SuccessResponse;

        with_error_responses::<SuccessResponse>()
    }
}

/// Raw signed request object, served with the `application/jwt` content type.
pub enum JwtOrErrorResponse {
    Ok(Vec<u8>),
    Error(ErrorResponse),
}

impl JwtOrErrorResponse {
    #[track_caller]
    pub fn from_result(result: Result<Vec<u8>, ServiceError>, action_description: &str) -> Self {
        match result {
            Ok(token) => Self::Ok(token),
            Err(error) => Self::Error(ErrorResponse::from_service_error_with_trace(
                error,
                action_description,
            )),
        }
    }
}

impl From<ErrorResponse> for JwtOrErrorResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl IntoResponse for JwtOrErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(token) => {
                ([(header::CONTENT_TYPE, "application/jwt")], token).into_response()
            }
            Self::Error(error) => error.into_response(),
        }
    }
}

impl IntoResponses for JwtOrErrorResponse {
    fn responses() -> BTreeMap<String, RefOr<OpenApiResponse>> {
        #[derive(IntoResponses)]
        #[response(
            status = 200,
            description = "Signed request object",
            content_type = "application/jwt"
        )]
        struct SuccessResponse(#[to_schema] String);

        with_error_responses::<SuccessResponse>()
    }
}

/// Redirect of the presenter to the wallet authorization endpoint.
pub enum RedirectOrErrorResponse {
    Found(String),
    Error(ErrorResponse),
}

impl RedirectOrErrorResponse {
    #[track_caller]
    pub fn from_result(result: Result<String, ServiceError>, action_description: &str) -> Self {
        match result {
            Ok(location) => Self::Found(location),
            Err(error) => Self::Error(ErrorResponse::from_service_error_with_trace(
                error,
                action_description,
            )),
        }
    }
}

impl From<ErrorResponse> for RedirectOrErrorResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl IntoResponse for RedirectOrErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Found(location) => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            Self::Error(error) => error.into_response(),
        }
    }
}

impl IntoResponses for RedirectOrErrorResponse {
    fn responses() -> BTreeMap<String, RefOr<OpenApiResponse>> {
        #[derive(IntoResponses)]
        #[response(status = 302, description = "Redirect to the wallet authorization endpoint")]
        struct SuccessResponse;

        with_error_responses::<SuccessResponse>()
    }
}
