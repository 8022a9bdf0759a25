use std::any::Any;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use mem_data_provider::DataLayer;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use verification_core::VerificationCore;
use verification_core::config::core_config::AppConfig;

use crate::ServerConfig;
use crate::dto::response::ErrorResponse;
use crate::endpoint::{self, misc, presentation, proof};
use crate::middleware::get_http_request_context;

pub(crate) struct InternalAppState {
    pub core: VerificationCore,
}

pub(crate) type AppState = Arc<InternalAppState>;

pub async fn start_server(
    listener: TcpListener,
    config: AppConfig<ServerConfig>,
    data_layer: DataLayer,
) {
    listener.set_nonblocking(true).unwrap();

    let core = VerificationCore::new(config.core, data_layer.get_presentation_repository())
        .expect("Failed to assemble verification core");

    let state: AppState = Arc::new(InternalAppState { core });

    let addr = listener.local_addr().expect("Invalid TCP listener");
    info!("Starting server at http://{addr}");

    state.core.handlers.start();

    let router = router(state.clone());

    axum::serve(
        tokio::net::TcpListener::from_std(listener)
            .expect("failed to convert to tokio TcpListener"),
        router.into_make_service(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start axum server");

    state.core.handlers.stop().await;
}

fn router(state: AppState) -> Router {
    let openapi_documentation = gen_openapi_documentation();

    let external = Router::new()
        .route(
            "/{tenantId}/presentation/proof/{id}/request-object/request.jwt",
            get(presentation::controller::get_request_object),
        )
        .route(
            "/{tenantId}/presentation/proof/{id}",
            post(presentation::controller::direct_post),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::capability_check,
        ));

    // wallet initiated flows are opt-in per deployment
    let external = if state.core.config.external_presentation.enabled {
        external
            .route(
                "/{tenantId}/presentation/authorize",
                get(presentation::controller::authorize),
            )
            .route(
                "/{tenantId}/presentation/request",
                get(presentation::controller::request_presentation),
            )
    } else {
        external
    };

    let internal = Router::new()
        .route(
            "/{tenantId}/internal/proofs/proof/{id}",
            get(proof::controller::get_proof).post(proof::controller::create_proof),
        )
        .route(
            "/{tenantId}/internal/proofs/proof/request/{id}",
            get(proof::controller::get_proof_by_request_id)
                .post(proof::controller::create_proof_by_request_id),
        )
        .route(
            "/{tenantId}/internal/proofs/proof/{id}/assign/{groupId}",
            put(proof::controller::assign_proof),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::capability_check,
        ))
        // the group listing carries no capability token in its path
        .route(
            "/{tenantId}/internal/list/proofs/{groupId}",
            get(proof::controller::list_proofs),
        );

    let technical_endpoints = Router::new()
        .route("/health", get(misc::health_check))
        .route("/health/ready", get(misc::health_ready));

    Router::new()
        .merge(external)
        .merge(internal)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let context = get_http_request_context(request);
                    info_span!(
                        "http_request",
                        method = context.method,
                        path = context.path,
                        service = "verification-service",
                        RequestId = context.request_id,
                    )
                })
                .on_request(|request: &Request<_>, _span: &Span| {
                    tracing::debug!(
                        "SERVICE CALL START {} {}",
                        request.method(),
                        request.uri().path()
                    )
                })
                .on_failure(|_, _, _: &_| {}) // override default on_failure handler
                .on_response(|response: &Response<_>, _: Duration, _span: &Span| {
                    tracing::debug!("SERVICE CALL END {}", response.status())
                }),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_documentation))
        .merge(technical_endpoints)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn gen_openapi_documentation() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        paths(
            endpoint::presentation::controller::get_request_object,
            endpoint::presentation::controller::direct_post,
            endpoint::presentation::controller::authorize,
            endpoint::presentation::controller::request_presentation,

            endpoint::proof::controller::get_proof,
            endpoint::proof::controller::get_proof_by_request_id,
            endpoint::proof::controller::create_proof,
            endpoint::proof::controller::create_proof_by_request_id,
            endpoint::proof::controller::assign_proof,
            endpoint::proof::controller::list_proofs,

            endpoint::misc::health_check,
            endpoint::misc::health_ready,
        ),
        components(
            schemas(
                crate::dto::error::ErrorResponseRestDTO,

                endpoint::presentation::dto::ProofSubmissionFormRestDTO,

                endpoint::proof::dto::ProofStateRestEnum,
                endpoint::proof::dto::ProofResponseRestDTO,
                endpoint::proof::dto::ProofRequestRestDTO,
                endpoint::proof::dto::FilterResultRestDTO,
                endpoint::proof::dto::DescriptorEntryRestDTO,
            )
        ),
        tags(
            (name = "presentation", description = "Presentation exchange"),
            (name = "proof_management", description = "Internal proof management"),
            (name = "other", description = "Health and plumbing"),
        ),
    )]
    struct ApiDoc;

    ApiDoc::openapi()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    tracing::error!("PANIC occurred in request: {message}");

    ErrorResponse::for_panic(message).into_response()
}
