use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use url::Url;
use uuid::Uuid;
use verification_crypto::verify_id;

use super::AuthorizationService;
use super::listener::AuthorizationListener;
use crate::config::core_config::CoreConfig;
use crate::proto::events::EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE;
use crate::proto::messaging_client::{Event, MockMessagingClient};
use crate::provider::http_client::Headers;
use crate::provider::policy::MockPolicyEvaluator;
use crate::provider::request_object::{FetchError, MockRequestObjectFetcher};
use crate::repository::presentation_repository::MockPresentationRepository;
use crate::service::error::{BusinessLogicError, ServiceError};
use crate::service::test_utilities::{TEST_SIGNING_KEY, dummy_request_object, generic_config};

fn service(
    repository: MockPresentationRepository,
    policy: MockPolicyEvaluator,
    fetcher: MockRequestObjectFetcher,
    config: CoreConfig,
) -> AuthorizationService {
    AuthorizationService::new(
        Arc::new(repository),
        Arc::new(policy),
        Arc::new(fetcher),
        Arc::new(config),
    )
}

fn authorize_url() -> Url {
    Url::parse("https://wallet.example.com/authorize").unwrap()
}

#[tokio::test]
async fn request_object_flow_mints_a_row_and_builds_the_redirect() {
    let object = dummy_request_object();

    let mut fetcher = MockRequestObjectFetcher::default();
    let fetched = object.clone();
    fetcher
        .expect_fetch()
        .times(1)
        .returning(move |_, _| Ok(fetched.clone()));

    let stored_id = Arc::new(Mutex::new(String::new()));
    let captured = stored_id.clone();
    let mut repository = MockPresentationRepository::default();
    repository
        .expect_store_request_object()
        .times(1)
        .withf(move |tenant, request_id, id, object| {
            *captured.lock().unwrap() = id.to_owned();
            tenant == "tenant_1" && request_id == "state-1" && object.nonce == "nonce-1"
        })
        .returning(|_, _, _, _| Ok(()));

    let service = service(repository, MockPolicyEvaluator::default(), fetcher, generic_config());
    let redirect = service
        .handle_request_object(
            "tenant_1",
            "did:web:wallet",
            "https://wallet.example.com/request",
            Headers::new(),
            authorize_url(),
        )
        .await
        .unwrap();

    let redirect = Url::parse(&redirect).unwrap();
    let params: HashMap<String, String> = redirect.query_pairs().into_owned().collect();
    assert_eq!(params["nonce"], "nonce-1");
    assert_eq!(params["presentation"], *stored_id.lock().unwrap());
    assert!(verify_id("tenant_1", &params["presentation"], TEST_SIGNING_KEY).unwrap());
}

#[tokio::test]
async fn missing_state_falls_back_to_a_generated_correlation_id() {
    let mut object = dummy_request_object();
    object.state.clear();

    let mut fetcher = MockRequestObjectFetcher::default();
    fetcher
        .expect_fetch()
        .returning(move |_, _| Ok(object.clone()));

    let mut repository = MockPresentationRepository::default();
    repository
        .expect_store_request_object()
        .times(1)
        .withf(|_, request_id, _, _| Uuid::parse_str(request_id).is_ok())
        .returning(|_, _, _, _| Ok(()));

    let service = service(repository, MockPolicyEvaluator::default(), fetcher, generic_config());
    service
        .handle_request_object(
            "tenant_1",
            "did:web:wallet",
            "https://wallet.example.com/request",
            Headers::new(),
            authorize_url(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn client_id_gate_blocks_before_anything_is_fetched() {
    let mut config = generic_config();
    config.external_presentation.client_id_policy = "https://policy.example.com/client".into();

    let mut policy = MockPolicyEvaluator::default();
    policy
        .expect_evaluate()
        .times(1)
        .withf(|url, input| {
            url == "https://policy.example.com/client" && input["clientId"] == "did:web:wallet"
        })
        .returning(|_, _| Ok(HashMap::from([("allow".to_owned(), json!(true))])));

    // a bare boolean decision denies, only the string "true" allows
    let service = service(
        MockPresentationRepository::default(),
        policy,
        MockRequestObjectFetcher::default(),
        config,
    );
    let error = service
        .handle_request_object(
            "tenant_1",
            "did:web:wallet",
            "https://wallet.example.com/request",
            Headers::new(),
            authorize_url(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::BusinessLogic(BusinessLogicError::PolicyDenied)
    ));
}

#[tokio::test]
async fn request_object_gate_sees_the_fetched_claims() {
    let mut config = generic_config();
    config.external_presentation.request_object_policy = "https://policy.example.com/object".into();

    let mut fetcher = MockRequestObjectFetcher::default();
    fetcher
        .expect_fetch()
        .returning(|_, _| Ok(dummy_request_object()));

    let mut policy = MockPolicyEvaluator::default();
    policy
        .expect_evaluate()
        .times(1)
        .withf(|url, input| {
            url == "https://policy.example.com/object"
                && input["response_mode"] == "direct_post"
                && input["state"] == "state-1"
        })
        .returning(|_, _| Ok(HashMap::from([("allow".to_owned(), json!("false"))])));

    let service = service(MockPresentationRepository::default(), policy, fetcher, config);
    let error = service
        .handle_request_object(
            "tenant_1",
            "did:web:wallet",
            "https://wallet.example.com/request",
            Headers::new(),
            authorize_url(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::BusinessLogic(BusinessLogicError::PolicyDenied)
    ));
}

#[tokio::test]
async fn other_response_modes_are_rejected() {
    let mut object = dummy_request_object();
    object.response_mode = "fragment".into();

    let mut fetcher = MockRequestObjectFetcher::default();
    fetcher
        .expect_fetch()
        .returning(move |_, _| Ok(object.clone()));

    let service = service(
        MockPresentationRepository::default(),
        MockPolicyEvaluator::default(),
        fetcher,
        generic_config(),
    );
    let error = service
        .handle_request_object(
            "tenant_1",
            "did:web:wallet",
            "https://wallet.example.com/request",
            Headers::new(),
            authorize_url(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::BusinessLogic(BusinessLogicError::UnsupportedResponseMode(mode)) if mode == "fragment"
    ));
}

#[test]
fn authorize_url_override_wins_when_it_parses() {
    let service = service(
        MockPresentationRepository::default(),
        MockPolicyEvaluator::default(),
        MockRequestObjectFetcher::default(),
        generic_config(),
    );

    let url = service
        .resolve_authorization_url(Some("https%3A%2F%2Fother.example.com%2Fauth"))
        .unwrap();

    assert_eq!(url.as_str(), "https://other.example.com/auth");
}

#[test]
fn broken_override_falls_back_to_the_configured_endpoint() {
    let service = service(
        MockPresentationRepository::default(),
        MockPolicyEvaluator::default(),
        MockRequestObjectFetcher::default(),
        generic_config(),
    );

    let url = service.resolve_authorization_url(Some("not a url")).unwrap();

    assert_eq!(url.as_str(), "https://wallet.example.com/authorize");
}

#[test]
fn unusable_configured_endpoint_is_an_error() {
    let mut config = generic_config();
    config.external_presentation.authorize_endpoint = "not a url".into();

    let service = service(
        MockPresentationRepository::default(),
        MockPolicyEvaluator::default(),
        MockRequestObjectFetcher::default(),
        config,
    );

    assert!(matches!(
        service.resolve_authorization_url(None),
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn remote_requests_are_confirmed_on_the_reply_topic() {
    let mut fetcher = MockRequestObjectFetcher::default();
    fetcher
        .expect_fetch()
        .times(1)
        .withf(|_, headers| {
            headers.get("X-NAMESPACE").map(String::as_str) == Some("tenant_1")
                && headers.get("X-DID").map(String::as_str) == Some("did:web:holder")
                && headers.get("X-GROUP").map(String::as_str) == Some("group-1")
        })
        .returning(|_, _| Ok(dummy_request_object()));

    let mut repository = MockPresentationRepository::default();
    repository
        .expect_store_request_object()
        .returning(|_, _, _, _| Ok(()));

    let mut messaging = MockMessagingClient::default();
    messaging
        .expect_publish()
        .times(1)
        .withf(|topic, event| {
            topic == "verifier.authorization.reply"
                && event.event_type == EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE
                && event.data["tenantId"] == "tenant_1"
                && event.data["requestId"] == "request-7"
        })
        .returning(|_, _| Ok(()));

    let listener = AuthorizationListener::new(
        Arc::new(service(
            repository,
            MockPolicyEvaluator::default(),
            fetcher,
            generic_config(),
        )),
        Arc::new(messaging),
        "verifier.authorization",
        "verifier.authorization.reply",
    );

    listener
        .handle(Event::new(
            EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE,
            json!({
                "tenantId": "tenant_1",
                "requestId": "request-7",
                "groupId": "group-1",
                "clientId": "did:web:wallet",
                "request_uri": "https://wallet.example.com/request",
                "did": "did:web:holder",
                "key": "key-1",
            }),
        ))
        .await;
}

#[tokio::test]
async fn failed_remote_requests_stay_unanswered() {
    let mut fetcher = MockRequestObjectFetcher::default();
    fetcher
        .expect_fetch()
        .returning(|_, _| Err(FetchError::TooManyRedirects));

    // no publish expectation: answering a failed request would panic the mock
    let listener = AuthorizationListener::new(
        Arc::new(service(
            MockPresentationRepository::default(),
            MockPolicyEvaluator::default(),
            fetcher,
            generic_config(),
        )),
        Arc::new(MockMessagingClient::default()),
        "verifier.authorization",
        "verifier.authorization.reply",
    );

    listener
        .handle(Event::new(
            EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE,
            json!({
                "tenantId": "tenant_1",
                "requestId": "request-7",
                "clientId": "did:web:wallet",
                "request_uri": "https://wallet.example.com/request",
            }),
        ))
        .await;
}

#[tokio::test]
async fn foreign_event_types_are_ignored() {
    let listener = AuthorizationListener::new(
        Arc::new(service(
            MockPresentationRepository::default(),
            MockPolicyEvaluator::default(),
            MockRequestObjectFetcher::default(),
            generic_config(),
        )),
        Arc::new(MockMessagingClient::default()),
        "verifier.authorization",
        "verifier.authorization.reply",
    );

    listener
        .handle(Event::new("verifier.something.else", json!({})))
        .await;
}
