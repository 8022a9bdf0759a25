use secrecy::ExposeSecret;
use serde_json::json;
use url::form_urlencoded;
use uuid::Uuid;
use verification_crypto::sign_id;

use super::PresentationRequestService;
use super::dto::RequestObjectContext;
use crate::model::presentation::{PresentationRequestOptions, PresentationState};
use crate::model::request_object::{PresentationDefinition, RESPONSE_MODE_DIRECT_POST};
use crate::proto::events::{
    CreateTokenRequest, EVENT_TYPE_PRESENTATION_AUTHORIZATION,
    EVENT_TYPE_PRESENTATION_AUTHORIZATION_ERROR, EVENT_TYPE_PROOF_NOTIFY,
    PresentationAuthorizationReply, PresentationAuthorizationRequest, ProofNotifyEvent, ReplyBase,
    ReplyError, RequestBase,
};
use crate::proto::messaging_client::Event;
use crate::service::error::{EntityNotFoundError, ServiceError};

impl PresentationRequestService {
    /// Validate and persist a fresh presentation request row.
    pub async fn create_request(
        &self,
        tenant_id: &str,
        options: &PresentationRequestOptions,
        definition: &PresentationDefinition,
    ) -> Result<(), ServiceError> {
        definition.validate()?;
        self.presentation_repository
            .create_request(tenant_id, options, definition)
            .await?;
        Ok(())
    }

    /// Mint the signed request object token for a wallet and mark the row as
    /// fetched.
    pub async fn get_request_object(
        &self,
        tenant_id: &str,
        id: &str,
        context: &RequestObjectContext,
    ) -> Result<Vec<u8>, ServiceError> {
        let row = self.presentation_repository.get_by_id(tenant_id, id).await?;
        let Some(row) = row else {
            return Err(EntityNotFoundError::Presentation(id.to_owned()).into());
        };

        let response_uri = format!("{}://{}{}/{id}", context.scheme, context.host, context.path);
        let claims = json!({
            "client_id": context.did,
            "response_uri": response_uri,
            "response_type": "vp_token",
            "nonce": row.nonce,
            "state": id,
            "response_mode": RESPONSE_MODE_DIRECT_POST,
            "presentation_definition": row.presentation_definition,
            "client_id_scheme": "did",
        });

        let token = self
            .signer_client
            .create_request_token(CreateTokenRequest {
                base: RequestBase {
                    tenant_id: tenant_id.to_owned(),
                    request_id: Uuid::new_v4().to_string(),
                    group_id: String::new(),
                },
                namespace: tenant_id.to_owned(),
                key: context.key.clone(),
                payload: serde_json::to_vec(&claims)
                    .map_err(|error| ServiceError::MappingError(error.to_string()))?,
            })
            .await?;

        self.presentation_repository
            .update_state(tenant_id, id, PresentationState::RequestObjectFetched)
            .await?;

        Ok(token)
    }

    /// Process one creation request from the messaging side and produce the
    /// reply event, successful or not.
    pub async fn handle_creation_event(&self, event: &Event) -> Event {
        let mut reply = PresentationAuthorizationReply::default();

        if event.event_type != EVENT_TYPE_PRESENTATION_AUTHORIZATION {
            return error_reply(reply, format!("unsupported event type: {}", event.event_type));
        }

        let request: PresentationAuthorizationRequest = match event.data_as() {
            Ok(request) => request,
            Err(error) => {
                return error_reply(reply, format!("error during request decoding: {error}"));
            }
        };
        reply.base_reply.tenant_id = request.base.tenant_id.clone();
        reply.base_reply.request_id = request.base.request_id.clone();

        if let Err(error) = request.presentation_definition.validate() {
            return error_reply(reply, format!("error during check presentation: {error}"));
        }

        let id = match sign_id(&request.base.tenant_id, self.config.signing_key.expose_secret()) {
            Ok(id) => id,
            Err(error) => {
                return error_reply(reply, format!("error during id creation: {error}"));
            }
        };

        reply.presentation_id = id.clone();
        reply.request_uri = self.authorization_uri(&request, &id);

        let options = PresentationRequestOptions {
            id,
            request_id: request.base.request_id.clone(),
            group_id: request.base.group_id.clone(),
            ttl: request.ttl,
        };
        let created = self
            .create_request(&request.base.tenant_id, &options, &request.presentation_definition)
            .await;
        if let Err(error) = created {
            return error_reply(reply, format!("error during db adding: {error}"));
        }

        reply_event(EVENT_TYPE_PRESENTATION_AUTHORIZATION, &reply)
    }

    /// Tell downstream listeners that a row advanced. Failures are logged and
    /// swallowed, the triggering flow must not depend on them.
    pub async fn publish_status(
        &self,
        tenant_id: &str,
        request_id: &str,
        presentation_id: &str,
        status: PresentationState,
    ) {
        let notification = ProofNotifyEvent {
            base: ReplyBase {
                tenant_id: tenant_id.to_owned(),
                request_id: request_id.to_owned(),
                error: None,
            },
            presentation_id: presentation_id.to_owned(),
            status,
        };
        let data = match serde_json::to_value(&notification) {
            Ok(data) => data,
            Err(error) => {
                tracing::error!(%error, "status notification could not be encoded");
                return;
            }
        };
        let event = Event::new(EVENT_TYPE_PROOF_NOTIFY, data);
        if let Err(error) = self.messaging.publish(&self.config.topics.proof_notify, event).await {
            tracing::error!(%error, %status, "status notification could not be published");
        }
    }

    /// `authorize` deep link pointing the wallet at the request object.
    fn authorization_uri(&self, request: &PresentationAuthorizationRequest, id: &str) -> String {
        let scheme = &self.config.external_presentation.client_url_scheme;
        let request_object_url = format!(
            "{scheme}://{}/{id}/request-object/request.jwt",
            request.request_object_uri
        );
        let client_url = format!("{scheme}://{}/presentation/proof/{id}", request.tenant_uri);
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &client_url)
            .append_pair("request_uri", &request_object_url)
            .finish();
        format!("{scheme}://{}/authorize?{query}", request.target_uri)
    }
}

fn error_reply(mut reply: PresentationAuthorizationReply, message: String) -> Event {
    reply.base_reply.error = Some(ReplyError {
        status: 500,
        msg: message,
    });
    reply_event(EVENT_TYPE_PRESENTATION_AUTHORIZATION_ERROR, &reply)
}

fn reply_event(event_type: &str, reply: &PresentationAuthorizationReply) -> Event {
    let data = serde_json::to_value(reply).unwrap_or_else(|error| {
        json!({"BaseReply": {"error": {"status": 500, "msg": format!("error in json marshalling: {error}")}}})
    });
    Event::new(event_type, data)
}
