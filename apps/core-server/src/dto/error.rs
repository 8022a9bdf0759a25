use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body of every failed call, a bare human readable message.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ErrorResponseRestDTO {
    pub message: String,
}

impl ErrorResponseRestDTO {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorResponseRestDTO {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

macro_rules! gen_from_rejection {
    ($from:ty, $rejection:ty) => {
        impl From<$from> for $rejection {
            fn from(value: $from) -> Self {
                Self {
                    message: value.body_text(),
                }
            }
        }
    };
}

gen_from_rejection!(FormRejection, ErrorResponseRestDTO);
gen_from_rejection!(JsonRejection, ErrorResponseRestDTO);
gen_from_rejection!(PathRejection, ErrorResponseRestDTO);
gen_from_rejection!(QueryRejection, ErrorResponseRestDTO);
