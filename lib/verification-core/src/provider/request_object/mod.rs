use std::sync::Arc;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
use url::Url;

use super::http_client::{Headers, HttpClient, Response};
use crate::model::request_object::RequestObject;

/// Upstream hosts may bounce the fetch through intermediate hosts, but not
/// endlessly.
pub const MAX_EMBEDDED_REDIRECTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request uri is not a valid url: {0}")]
    InvalidUri(String),
    #[error("request failed: {0}")]
    Transport(#[from] super::http_client::Error),
    #[error("request url {url} returned status {status} with data {body}")]
    UpstreamStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("cannot support more than 10 embedded redirects")]
    TooManyRedirects,
    #[error("redirect response carries no location header")]
    MissingLocation,
    #[error("unsupported response Content-Type `{0}`, expected `application/jwt`")]
    UnsupportedContentType(String),
    #[error("request object token is malformed: {0}")]
    MalformedToken(String),
}

/// Resolves the request object a wallet host published for an authorization
/// request.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait RequestObjectFetcher: Send + Sync {
    async fn fetch(&self, request_uri: &str, headers: Headers) -> Result<RequestObject, FetchError>;
}

/// Request uris arrive percent encoded inside query parameters.
/// `force_scheme` overwrites whatever scheme the decoded url carries.
pub fn parse_percent_encoded_url(raw: &str, force_scheme: Option<&str>) -> Result<Url, FetchError> {
    let decoded = urlencoding::decode(raw).map_err(|error| FetchError::InvalidUri(error.to_string()))?;
    let mut url = Url::parse(&decoded).map_err(|error| FetchError::InvalidUri(error.to_string()))?;
    if let Some(scheme) = force_scheme {
        url.set_scheme(scheme)
            .map_err(|_| FetchError::InvalidUri(format!("cannot apply scheme `{scheme}`")))?;
    }
    Ok(url)
}

/// Claims are read straight from the payload segment. Signature verification
/// happens in the trust infrastructure in front of this service, not here.
pub fn decode_token_claims(token: &str) -> Result<RequestObject, FetchError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(FetchError::MalformedToken("expected three segments".to_owned()));
    }
    let claims = Base64UrlSafeNoPadding::decode_to_vec(segments[1], None)
        .map_err(|_| FetchError::MalformedToken("payload segment is not base64url".to_owned()))?;
    serde_json::from_slice(&claims).map_err(|error| FetchError::MalformedToken(error.to_string()))
}

pub struct HttpRequestObjectFetcher {
    client: Arc<dyn HttpClient>,
    forced_scheme: String,
}

impl HttpRequestObjectFetcher {
    pub fn new(client: Arc<dyn HttpClient>, forced_scheme: impl Into<String>) -> Self {
        Self {
            client,
            forced_scheme: forced_scheme.into(),
        }
    }

    fn decode_response(&self, response: &Response) -> Result<RequestObject, FetchError> {
        let content_type = response.header_get("content-type").unwrap_or_default();
        if content_type != "application/jwt" {
            return Err(FetchError::UnsupportedContentType(content_type.to_owned()));
        }
        // hosts returning the token as a JSON string are tolerated
        let token = String::from_utf8_lossy(&response.body).replace('"', "");
        decode_token_claims(&token)
    }
}

#[async_trait::async_trait]
impl RequestObjectFetcher for HttpRequestObjectFetcher {
    async fn fetch(&self, request_uri: &str, headers: Headers) -> Result<RequestObject, FetchError> {
        let mut url = parse_percent_encoded_url(request_uri, Some(&self.forced_scheme))?;

        let mut redirects = 0;
        loop {
            let response = self
                .client
                .get(url.as_str())
                .headers(headers.clone())
                .send()
                .await?;

            if response.status.is_client_error() || response.status.is_server_error() {
                return Err(FetchError::UpstreamStatus {
                    url: url.to_string(),
                    status: response.status.0,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                });
            }

            if response.status.is_redirection() {
                if redirects >= MAX_EMBEDDED_REDIRECTS {
                    return Err(FetchError::TooManyRedirects);
                }
                redirects += 1;
                let location = response
                    .header_get("location")
                    .ok_or(FetchError::MissingLocation)?;
                url = url
                    .join(location)
                    .map_err(|error| FetchError::InvalidUri(error.to_string()))?;
                continue;
            }

            return self.decode_response(&response);
        }
    }
}
