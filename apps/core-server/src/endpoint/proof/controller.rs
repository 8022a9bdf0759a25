use axum::Json;
use axum::extract::{Path, State};
use axum_extra::extract::WithRejection;
use verification_core::model::proof::ProofPayload;

use super::dto::{ProofRequestRestDTO, ProofResponseRestDTO};
use crate::dto::error::ErrorResponseRestDTO;
use crate::dto::response::{EmptyOrErrorResponse, ErrorResponse, OkOrErrorResponse};
use crate::router::AppState;

#[utoipa::path(
    get,
    path = "/{tenantId}/internal/proofs/proof/{id}",
    responses(OkOrErrorResponse<ProofResponseRestDTO>),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Signed presentation id"),
    ),
    tag = "proof_management",
    summary = "Retrieve a presentation row",
    description = "Returns the row stored under `id`, including the received \
        presentation once the holder responded.",
)]
pub(crate) async fn get_proof(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
) -> OkOrErrorResponse<ProofResponseRestDTO> {
    let result = state.core.proof_service.get_proof(&tenant_id, &id).await;
    OkOrErrorResponse::from_result(result, "getting proof")
}

#[utoipa::path(
    get,
    path = "/{tenantId}/internal/proofs/proof/request/{id}",
    responses(OkOrErrorResponse<ProofResponseRestDTO>),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Caller assigned request id"),
    ),
    tag = "proof_management",
    summary = "Retrieve a presentation row by request id",
    description = "Returns the row whose caller assigned request id matches.",
)]
pub(crate) async fn get_proof_by_request_id(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
) -> OkOrErrorResponse<ProofResponseRestDTO> {
    let result = state
        .core
        .proof_service
        .get_proof_by_request_id(&tenant_id, &id)
        .await;
    OkOrErrorResponse::from_result(result, "getting proof by request id")
}

#[utoipa::path(
    post,
    path = "/{tenantId}/internal/proofs/proof/{id}",
    request_body = ProofRequestRestDTO,
    responses(EmptyOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Signed presentation id"),
    ),
    tag = "proof_management",
    summary = "Transmit a received presentation",
    description = "Signs the filtered credential set and posts the result to \
        the redirect target stored on the row, advancing it to \
        `presentation-transmitted`.",
)]
pub(crate) async fn create_proof(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
    WithRejection(Json(request), _): WithRejection<Json<ProofRequestRestDTO>, ErrorResponseRestDTO>,
) -> EmptyOrErrorResponse {
    let payload: ProofPayload = request.into();
    let result = state
        .core
        .proof_service
        .create_proof(&tenant_id, &id, &payload)
        .await;
    EmptyOrErrorResponse::from_result(result, "creating proof")
}

#[utoipa::path(
    post,
    path = "/{tenantId}/internal/proofs/proof/request/{id}",
    request_body = ProofRequestRestDTO,
    responses(EmptyOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Caller assigned request id"),
    ),
    tag = "proof_management",
    summary = "Transmit a received presentation by request id",
    description = "Same as the transmission by row id, addressed through the \
        caller assigned request id.",
)]
pub(crate) async fn create_proof_by_request_id(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
    WithRejection(Json(request), _): WithRejection<Json<ProofRequestRestDTO>, ErrorResponseRestDTO>,
) -> EmptyOrErrorResponse {
    let payload: ProofPayload = request.into();
    let result = state
        .core
        .proof_service
        .create_proof_by_request_id(&tenant_id, &id, &payload)
        .await;
    EmptyOrErrorResponse::from_result(result, "creating proof by request id")
}

#[utoipa::path(
    put,
    path = "/{tenantId}/internal/proofs/proof/{id}/assign/{groupId}",
    responses(EmptyOrErrorResponse),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("id" = String, Path, description = "Signed presentation id"),
        ("groupId" = String, Path, description = "Group the row is assigned to"),
    ),
    tag = "proof_management",
    summary = "Assign a presentation row to a group",
)]
pub(crate) async fn assign_proof(
    state: State<AppState>,
    WithRejection(Path((tenant_id, id, group_id)), _): WithRejection<
        Path<(String, String, String)>,
        ErrorResponseRestDTO,
    >,
) -> EmptyOrErrorResponse {
    let result = state
        .core
        .proof_service
        .assign_group(&tenant_id, &id, &group_id)
        .await;
    EmptyOrErrorResponse::from_result(result, "assigning proof group")
}

#[utoipa::path(
    get,
    path = "/{tenantId}/internal/list/proofs/{groupId}",
    responses(OkOrErrorResponse<Vec<ProofResponseRestDTO>>),
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("groupId" = String, Path, description = "Group id"),
    ),
    tag = "proof_management",
    summary = "List the presentation rows of a group",
)]
pub(crate) async fn list_proofs(
    state: State<AppState>,
    WithRejection(Path((tenant_id, group_id)), _): WithRejection<
        Path<(String, String)>,
        ErrorResponseRestDTO,
    >,
) -> OkOrErrorResponse<Vec<ProofResponseRestDTO>> {
    match state
        .core
        .proof_service
        .list_proofs(&tenant_id, &group_id)
        .await
    {
        Ok(rows) => OkOrErrorResponse::ok(
            rows.into_iter()
                .map(ProofResponseRestDTO::from)
                .collect::<Vec<_>>(),
        ),
        Err(error) => ErrorResponse::from_service_error_with_trace(error, "listing proofs").into(),
    }
}
