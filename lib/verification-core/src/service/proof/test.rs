use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::ProofService;
use crate::model::presentation::PresentationState;
use crate::model::proof::{FilterResult, ProofPayload};
use crate::model::submission::DescriptorEntry;
use crate::provider::http_client::reqwest_client::ReqwestClient;
use crate::provider::signer::{MockSignerClient, SignerClientError};
use crate::repository::presentation_repository::MockPresentationRepository;
use crate::service::error::{EntityNotFoundError, ServiceError};
use crate::service::test_utilities::dummy_entry;

fn service(repository: MockPresentationRepository, signer: MockSignerClient) -> ProofService {
    ProofService::new(
        Arc::new(repository),
        Arc::new(signer),
        Arc::new(ReqwestClient::default()),
    )
}

fn proof_payload() -> ProofPayload {
    ProofPayload {
        payload: vec![FilterResult {
            id: "filter-1".into(),
            description: DescriptorEntry {
                id: "descriptor-1".into(),
                format: "ldp_vp".into(),
                path: "$".into(),
            },
            credentials: vec![json!({"credentialSubject": {"given_name": "Ada"}})],
        }],
        sign_namespace: "tenant_1".into(),
        sign_key: "key-1".into(),
        sign_group: "group-1".into(),
        holder_did: "did:web:holder".into(),
    }
}

#[tokio::test]
async fn rows_are_looked_up_by_either_identifier() {
    let mut repository = MockPresentationRepository::default();
    repository
        .expect_get_by_id()
        .times(1)
        .withf(|tenant_id, id| tenant_id == "tenant_1" && id == "presentation-1")
        .returning(|_, _| Ok(Some(dummy_entry())));
    repository
        .expect_get_by_request_id()
        .times(1)
        .withf(|tenant_id, request_id| tenant_id == "tenant_1" && request_id == "request-1")
        .returning(|_, _| Ok(Some(dummy_entry())));

    let service = service(repository, MockSignerClient::default());

    let by_id = service.get_proof("tenant_1", "presentation-1").await.unwrap();
    let by_request = service
        .get_proof_by_request_id("tenant_1", "request-1")
        .await
        .unwrap();

    assert_eq!(by_id, by_request);
    assert_eq!(by_id.id, "presentation-1");
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let mut repository = MockPresentationRepository::default();
    repository.expect_get_by_id().returning(|_, _| Ok(None));
    repository
        .expect_get_by_request_id()
        .returning(|_, _| Ok(None));

    let service = service(repository, MockSignerClient::default());

    let error = service.get_proof("tenant_1", "unknown").await.unwrap_err();
    assert!(matches!(
        error,
        ServiceError::EntityNotFound(EntityNotFoundError::Presentation(id)) if id == "unknown"
    ));

    let error = service
        .get_proof_by_request_id("tenant_1", "unknown")
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ServiceError::EntityNotFound(EntityNotFoundError::PresentationByRequestId(id))
            if id == "unknown"
    ));
}

#[tokio::test]
async fn groups_are_assigned_and_listed() {
    let mut repository = MockPresentationRepository::default();
    repository
        .expect_assign_group()
        .times(1)
        .withf(|tenant_id, id, group_id| {
            tenant_id == "tenant_1" && id == "presentation-1" && group_id == "group-2"
        })
        .returning(|_, _, _| Ok(()));
    repository
        .expect_list_by_group()
        .times(1)
        .withf(|tenant_id, group_id| tenant_id == "tenant_1" && group_id == "group-1")
        .returning(|_, _| Ok(vec![dummy_entry()]));

    let service = service(repository, MockSignerClient::default());

    service
        .assign_group("tenant_1", "presentation-1", "group-2")
        .await
        .unwrap();
    let listed = service.list_proofs("tenant_1", "group-1").await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].group_id, "group-1");
}

#[tokio::test]
async fn create_proof_signs_posts_and_completes_the_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/response"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("vp_token=signed-presentation"))
        .and(body_string_contains("presentation_submission="))
        .and(body_string_contains("definition-1"))
        .and(body_string_contains("descriptor-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut signer = MockSignerClient::default();
    signer
        .expect_sign_presentation()
        .times(1)
        .withf(|request| {
            let envelope = &request["presentation"];
            request["group"] == "group-1"
                && request["issuer"] == "did:web:holder"
                && request["key"] == "key-1"
                && request["namespace"] == "tenant_1"
                && envelope["id"] == "filter-1"
                && envelope["holder"] == "did:web:holder"
                && envelope["@context"][0] == "https://www.w3.org/2018/credentials/v1"
                && envelope["@context"][1] == "https://w3id.org/security/suites/jws-2020/v1"
                && envelope["type"][0] == "VerifiablePresentation"
                && envelope["verifiableCredential"][0]["credentialSubject"]["given_name"] == "Ada"
        })
        .returning(|_| Ok(b"signed-presentation".to_vec()));

    let response_uri = format!("{}/response", server.uri());
    let mut repository = MockPresentationRepository::default();
    repository.expect_get_by_id().times(1).returning(move |_, _| {
        let mut entry = dummy_entry();
        entry.response_uri = response_uri.clone();
        Ok(Some(entry))
    });
    repository
        .expect_update_state()
        .times(1)
        .withf(|tenant_id, id, state| {
            tenant_id == "tenant_1"
                && id == "presentation-1"
                && *state == PresentationState::Transmitted
        })
        .returning(|_, _, _| Ok(()));

    let service = service(repository, signer);

    service
        .create_proof("tenant_1", "presentation-1", &proof_payload())
        .await
        .unwrap();
}

#[tokio::test]
async fn signing_happens_before_the_row_lookup() {
    let mut signer = MockSignerClient::default();
    signer
        .expect_sign_presentation()
        .times(1)
        .returning(|_| Ok(b"signed-presentation".to_vec()));

    let mut repository = MockPresentationRepository::default();
    repository.expect_get_by_id().times(1).returning(|_, _| Ok(None));

    let service = service(repository, signer);
    let error = service
        .create_proof("tenant_1", "presentation-1", &proof_payload())
        .await
        .unwrap_err();

    assert!(matches!(error, ServiceError::EntityNotFound(_)));
}

#[tokio::test]
async fn failed_transmissions_leave_the_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("downstream broke"))
        .expect(1)
        .mount(&server)
        .await;

    let mut signer = MockSignerClient::default();
    signer
        .expect_sign_presentation()
        .times(1)
        .returning(|_| Ok(b"signed-presentation".to_vec()));

    let response_uri = format!("{}/response", server.uri());
    let mut repository = MockPresentationRepository::default();
    repository.expect_get_by_id().times(1).returning(move |_, _| {
        let mut entry = dummy_entry();
        entry.response_uri = response_uri.clone();
        Ok(Some(entry))
    });

    let service = service(repository, signer);
    let error = service
        .create_proof("tenant_1", "presentation-1", &proof_payload())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::Transmit(message) if message.contains("responded an error")
    ));
}

#[tokio::test]
async fn signer_failures_surface_before_anything_else() {
    let mut signer = MockSignerClient::default();
    signer
        .expect_sign_presentation()
        .times(1)
        .returning(|_| Err(SignerClientError::Rejected("no key".into())));

    let service = service(MockPresentationRepository::default(), signer);
    let error = service
        .create_proof("tenant_1", "presentation-1", &proof_payload())
        .await
        .unwrap_err();

    assert!(matches!(error, ServiceError::Signer(_)));
}
