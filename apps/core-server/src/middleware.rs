use axum::body::Body;
use axum::extract::{RawPathParams, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use secrecy::ExposeSecret;
use verification_crypto::verify_id;

use crate::router::AppState;

pub struct HttpRequestContext<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub request_id: Option<&'a str>,
}

/// Gate for routes whose `id` path segment must be a capability token signed
/// for the `tenantId` path segment. Rejections carry no body, callers only
/// learn that the capability was not accepted.
pub async fn capability_check(
    State(state): State<AppState>,
    params: RawPathParams,
    request: Request<Body>,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    let mut tenant_id = None;
    let mut id = None;
    for (name, value) in &params {
        match name {
            "tenantId" => tenant_id = Some(value),
            "id" => id = Some(value),
            _ => {}
        }
    }

    let (Some(tenant_id), Some(id)) = (tenant_id, id) else {
        tracing::warn!("Capability check on a route without tenantId and id segments.");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match verify_id(
        tenant_id,
        id,
        state.core.config.signing_key.expose_secret(),
    ) {
        Ok(true) => Ok(next.run(request).await),
        Ok(false) => {
            tracing::warn!("Rejected capability token of tenant {tenant_id}.");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(error) => {
            tracing::warn!(%error, "Malformed capability token of tenant {tenant_id}.");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub fn get_http_request_context<T>(request: &Request<T>) -> HttpRequestContext {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|header| header.to_str().ok())
        .filter(|value| !value.is_empty());

    HttpRequestContext {
        path: request.uri().path(),
        method: request.method().as_str(),
        request_id,
    }
}
