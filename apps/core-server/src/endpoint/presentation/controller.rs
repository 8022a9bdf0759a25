use axum::Form;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderMap, header};
use axum_extra::extract::{Host, WithRejection};
use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
use secrecy::ExposeSecret;
use verification_core::model::presentation::PresentationRequestOptions;
use verification_core::model::request_object::PresentationDefinition;
use verification_core::provider::http_client::Headers;
use verification_core::service::presentation_request::dto::RequestObjectContext;
use verification_crypto::sign_id;

use super::dto::{
    AuthorizeQueryRestDTO, PresentationRequestQueryRestDTO, ProofSubmissionFormRestDTO,
};
use crate::dto::error::ErrorResponseRestDTO;
use crate::dto::response::{
    EmptyOrErrorResponse, ErrorResponse, JwtOrErrorResponse, RedirectOrErrorResponse,
};
use crate::router::AppState;

#[utoipa::path(
    get,
    path = "/{tenantId}/presentation/proof/{id}/request-object/request.jwt",
    responses(JwtOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Signed presentation id"),
        ("x-did" = Option<String>, Header, description = "Verification method the signer stamps into the request object"),
        ("x-key" = Option<String>, Header, description = "Key hint forwarded to the signer"),
    ),
    tag = "presentation",
    summary = "Serve the signed request object",
    description = "Mints and signs the request object for a stored row and \
        advances the row to `request-object-fetched`.",
)]
pub(crate) async fn get_request_object(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
    OriginalUri(uri): OriginalUri,
    Host(host): Host,
    headers: HeaderMap,
) -> JwtOrErrorResponse {
    let suffix = format!("/{id}/request-object/request.jwt");
    let context = RequestObjectContext {
        scheme: state
            .core
            .config
            .external_presentation
            .client_url_scheme
            .clone(),
        host,
        path: uri.path().strip_suffix(&suffix).unwrap_or_default().to_owned(),
        did: header_value(&headers, "x-did"),
        key: header_value(&headers, "x-key"),
    };

    let result = state
        .core
        .presentation_request_service
        .get_request_object(&tenant_id, &id, &context)
        .await;
    JwtOrErrorResponse::from_result(result, "minting the request object")
}

#[utoipa::path(
    post,
    path = "/{tenantId}/presentation/proof/{id}",
    request_body(
        content = ProofSubmissionFormRestDTO,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(EmptyOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Signed presentation id"),
    ),
    tag = "presentation",
    summary = "Receive a verifiable presentation",
    description = "Direct post target the wallet submits the presentation to. \
        Submissions failing validation park the row in `presentation-rejected`.",
)]
pub(crate) async fn direct_post(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
    WithRejection(Form(request), _): WithRejection<
        Form<ProofSubmissionFormRestDTO>,
        ErrorResponseRestDTO,
    >,
) -> EmptyOrErrorResponse {
    let result = state
        .core
        .proof_submission_service
        .submit_proof(
            &tenant_id,
            &id,
            &request.vp_token,
            &request.presentation_submission,
        )
        .await;
    EmptyOrErrorResponse::from_result(result, "receiving the presentation")
}

#[utoipa::path(
    get,
    path = "/{tenantId}/presentation/authorize",
    responses(RedirectOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        AuthorizeQueryRestDTO,
    ),
    tag = "presentation",
    summary = "Accept a wallet initiated authorization request",
    description = "Fetches the referenced request object, mints a row for it \
        and redirects the presenter to the wallet authorization endpoint.",
)]
pub(crate) async fn authorize(
    state: State<AppState>,
    WithRejection(Path(tenant_id), _): WithRejection<Path<String>, ErrorResponseRestDTO>,
    WithRejection(Query(query), _): WithRejection<
        Query<AuthorizeQueryRestDTO>,
        ErrorResponseRestDTO,
    >,
    headers: HeaderMap,
) -> RedirectOrErrorResponse {
    let (Some(client_id), Some(request_uri)) = (query.client_id, query.request_uri) else {
        return ErrorResponse::BadRequest(ErrorResponseRestDTO::new("URI parameter missing."))
            .into();
    };

    let auth_url = match state
        .core
        .authorization_service
        .resolve_authorization_url(query.auth_url.as_deref())
    {
        Ok(url) => url,
        Err(error) => {
            return ErrorResponse::from_service_error_with_trace(
                error,
                "resolving the authorize endpoint",
            )
            .into();
        }
    };

    let result = state
        .core
        .authorization_service
        .handle_request_object(
            &tenant_id,
            &client_id,
            &request_uri,
            forward_headers(&headers),
            auth_url,
        )
        .await;
    RedirectOrErrorResponse::from_result(result, "handling the authorization request")
}

#[utoipa::path(
    get,
    path = "/{tenantId}/presentation/request",
    responses(JwtOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        PresentationRequestQueryRestDTO,
        ("x-tenantId" = String, Header, description = "Tenant the fresh row is minted for"),
        ("x-groupId" = Option<String>, Header, description = "Group the row is assigned to"),
        ("x-ttl" = Option<u64>, Header, description = "Row lifetime in seconds"),
        ("x-did" = Option<String>, Header, description = "Verification method the signer stamps into the request object"),
        ("x-key" = Option<String>, Header, description = "Key hint forwarded to the signer"),
    ),
    tag = "presentation",
    summary = "Mint a presentation request",
    description = "Signs a fresh row id, stores the supplied presentation \
        definition under it and responds with the signed request object.",
)]
pub(crate) async fn request_presentation(
    state: State<AppState>,
    WithRejection(Query(query), _): WithRejection<
        Query<PresentationRequestQueryRestDTO>,
        ErrorResponseRestDTO,
    >,
    Host(host): Host,
    headers: HeaderMap,
) -> JwtOrErrorResponse {
    // the tenant owning the fresh row comes from the header, as the
    // existing consumers send it; the path tenant only routes
    let tenant_id = header_value(&headers, "x-tenantId");

    let id = match sign_id(&tenant_id, state.core.config.signing_key.expose_secret()) {
        Ok(id) => id,
        Err(error) => {
            return ErrorResponse::from_service_error_with_trace(
                error.into(),
                "signing the presentation id",
            )
            .into();
        }
    };

    let definition = match decode_definition(&query.presentation_definition) {
        Ok(definition) => definition,
        Err(error) => return error.into(),
    };

    let ttl = headers
        .get("x-ttl")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(state.core.config.default_request_ttl);

    let options = PresentationRequestOptions {
        id: id.clone(),
        request_id: query.request_id,
        group_id: header_value(&headers, "x-groupId"),
        ttl,
    };

    if let Err(error) = state
        .core
        .presentation_request_service
        .create_request(&tenant_id, &options, &definition)
        .await
    {
        return ErrorResponse::from_service_error_with_trace(
            error,
            "creating the presentation request",
        )
        .into();
    }

    let context = RequestObjectContext {
        scheme: state
            .core
            .config
            .external_presentation
            .client_url_scheme
            .clone(),
        host,
        path: state.core.config.public_base_path.clone(),
        did: header_value(&headers, "x-did"),
        key: header_value(&headers, "x-key"),
    };

    let result = state
        .core
        .presentation_request_service
        .get_request_object(&tenant_id, &id, &context)
        .await;
    JwtOrErrorResponse::from_result(result, "minting the request object")
}

fn decode_definition(encoded: &str) -> Result<PresentationDefinition, ErrorResponse> {
    // callers send padded base64url
    let decoded = Base64UrlSafeNoPadding::decode_to_vec(encoded.trim_end_matches('='), None)
        .map_err(|_| {
            ErrorResponse::BadRequest(ErrorResponseRestDTO::new(
                "Error decoding presentation definition json",
            ))
        })?;
    serde_json::from_slice(&decoded).map_err(|_| {
        ErrorResponse::BadRequest(ErrorResponseRestDTO::new(
            "Error decoding presentation definition json",
        ))
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|header| header.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn forward_headers(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter(|(name, _)| *name != header::HOST)
        .filter_map(|(name, value)| {
            Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned()))
        })
        .collect()
}
