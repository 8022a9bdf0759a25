use serde_json::json;
use time::{Duration, OffsetDateTime};
use verification_core::model::presentation::{PresentationRequestOptions, PresentationState};
use verification_core::model::request_object::{
    ConstraintField, Constraints, InputDescriptor, PresentationDefinition, RequestObject,
};
use verification_core::repository::error::DataLayerError;
use verification_core::repository::presentation_repository::PresentationRepository;

use crate::presentation::PresentationProvider;

const TENANT: &str = "tenant_1";

fn setup() -> PresentationProvider {
    PresentationProvider::new("eu-test", "XX")
}

fn definition() -> PresentationDefinition {
    PresentationDefinition {
        id: "definition-1".into(),
        input_descriptors: vec![InputDescriptor {
            id: "descriptor-1".into(),
            constraints: Constraints {
                fields: vec![ConstraintField {
                    path: vec!["$.credentialSubject.given_name".into()],
                    ..Default::default()
                }],
            },
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn options(id: &str, ttl: u64) -> PresentationRequestOptions {
    PresentationRequestOptions {
        id: id.to_owned(),
        request_id: format!("request-{id}"),
        group_id: String::new(),
        ttl,
    }
}

fn request_object() -> RequestObject {
    RequestObject {
        client_id: "did:web:wallet".into(),
        response_type: "vp_token".into(),
        response_mode: "direct_post".into(),
        response_uri: "https://wallet.example.com/response".into(),
        redirect_uri: "https://wallet.example.com/done".into(),
        nonce: "wallet-nonce".into(),
        presentation_definition: Some(definition()),
        ..Default::default()
    }
}

async fn backdate_expiry(provider: &PresentationProvider, id: &str) {
    let mut store = provider.store.write().await;
    let stored = store.get_mut(TENANT).unwrap().get_mut(id).unwrap();
    stored.expires_at = Some(OffsetDateTime::now_utc() - Duration::hours(1));
}

#[tokio::test]
async fn test_created_rows_read_back_by_either_identifier() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("presentation-1", 3000), &definition())
        .await
        .unwrap();

    let by_id = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    let by_request_id = provider
        .get_by_request_id(TENANT, "request-presentation-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_id, by_request_id);
    assert_eq!(by_id.id, "presentation-1");
    assert_eq!(by_id.request_id, "request-presentation-1");
    assert_eq!(by_id.region, "eu-test");
    assert_eq!(by_id.country, "XX");
    assert_eq!(by_id.state, PresentationState::Requested);
    assert_eq!(by_id.presentation_definition, Some(definition()));
    assert_eq!(by_id.nonce.len(), 43);
    assert!(by_id.presentation.is_none());
    assert!(by_id.response_uri.is_empty());
    assert!(by_id.client_id.is_empty());
}

#[tokio::test]
async fn test_rows_expire_once_their_ttl_passes() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("short-lived", 3000), &definition())
        .await
        .unwrap();
    provider
        .create_request(TENANT, &options("kept", 0), &definition())
        .await
        .unwrap();

    backdate_expiry(&provider, "short-lived").await;

    assert!(provider.get_by_id(TENANT, "short-lived").await.unwrap().is_none());
    assert!(provider
        .get_by_request_id(TENANT, "request-short-lived")
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        provider
            .update_state(TENANT, "short-lived", PresentationState::Received)
            .await,
        Err(DataLayerError::RecordNotUpdated)
    ));

    // ttl zero keeps the row indefinitely
    assert!(provider.get_by_id(TENANT, "kept").await.unwrap().is_some());
}

#[tokio::test]
async fn test_state_updates_refresh_the_timestamp() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("presentation-1", 0), &definition())
        .await
        .unwrap();

    let yesterday = OffsetDateTime::now_utc() - Duration::days(1);
    {
        let mut store = provider.store.write().await;
        let stored = store.get_mut(TENANT).unwrap().get_mut("presentation-1").unwrap();
        stored.last_update = yesterday;
    }

    provider
        .update_state(TENANT, "presentation-1", PresentationState::Transmitted)
        .await
        .unwrap();

    let entry = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.state, PresentationState::Transmitted);
    assert!(entry.last_update > yesterday);
}

#[tokio::test]
async fn test_missing_rows_are_not_updated() {
    let provider = setup();

    assert!(matches!(
        provider
            .update_state(TENANT, "unknown", PresentationState::Received)
            .await,
        Err(DataLayerError::RecordNotUpdated)
    ));
    assert!(matches!(
        provider.assign_group(TENANT, "unknown", "group-1").await,
        Err(DataLayerError::RecordNotUpdated)
    ));
    assert!(matches!(
        provider.store_presentation(TENANT, "unknown", b"{}").await,
        Err(DataLayerError::RecordNotUpdated)
    ));
}

#[tokio::test]
async fn test_groups_are_assigned_and_listed() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("presentation-1", 0), &definition())
        .await
        .unwrap();
    provider
        .create_request(TENANT, &options("presentation-2", 0), &definition())
        .await
        .unwrap();

    provider
        .assign_group(TENANT, "presentation-1", "group-1")
        .await
        .unwrap();

    let listed = provider.list_by_group(TENANT, "group-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "presentation-1");
    assert_eq!(listed[0].group_id, "group-1");

    assert!(provider.list_by_group(TENANT, "group-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_objects_upsert_missing_rows() {
    let provider = setup();

    provider
        .store_request_object(TENANT, "request-1", "presentation-1", &request_object())
        .await
        .unwrap();

    let entry = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.state, PresentationState::Requested);
    assert_eq!(entry.request_id, "request-1");
    assert_eq!(entry.nonce, "wallet-nonce");
    assert_eq!(entry.response_uri, "https://wallet.example.com/response");
    assert_eq!(entry.response_mode, "direct_post");
    assert_eq!(entry.response_type, "vp_token");
    assert_eq!(entry.redirect_uri, "https://wallet.example.com/done");
    assert_eq!(entry.client_id, "did:web:wallet");
    assert_eq!(entry.presentation_definition, Some(definition()));
    assert!(entry.group_id.is_empty());

    // storing again must not detach the row from its group
    provider
        .assign_group(TENANT, "presentation-1", "group-1")
        .await
        .unwrap();
    provider
        .store_request_object(TENANT, "request-1", "presentation-1", &request_object())
        .await
        .unwrap();

    let entry = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.group_id, "group-1");
}

#[tokio::test]
async fn test_presentation_blobs_round_trip() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("presentation-1", 0), &definition())
        .await
        .unwrap();

    let single = json!({"holder": "did:web:holder"});
    provider
        .store_presentation(TENANT, "presentation-1", &serde_json::to_vec(&single).unwrap())
        .await
        .unwrap();

    let entry = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.state, PresentationState::Received);
    assert_eq!(entry.presentation, Some(vec![single]));

    let pair = json!([{"holder": "did:web:holder"}, {"holder": "did:web:other"}]);
    provider
        .store_presentation(TENANT, "presentation-1", &serde_json::to_vec(&pair).unwrap())
        .await
        .unwrap();

    let entry = provider
        .get_by_id(TENANT, "presentation-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.presentation.map(|elements| elements.len()), Some(2));
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let provider = setup();
    provider
        .create_request(TENANT, &options("presentation-1", 0), &definition())
        .await
        .unwrap();

    assert!(provider
        .get_by_id("tenant_2", "presentation-1")
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        provider
            .update_state("tenant_2", "presentation-1", PresentationState::Received)
            .await,
        Err(DataLayerError::RecordNotUpdated)
    ));
    assert!(provider
        .list_by_group("tenant_2", "group-1")
        .await
        .unwrap()
        .is_empty());
}
