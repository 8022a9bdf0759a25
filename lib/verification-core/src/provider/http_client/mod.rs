use std::collections::HashMap;
use std::fmt::Debug;
use std::panic::Location;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod reqwest_client;

pub type Headers = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Url encode error: {0}")]
    UrlEncode(#[from] serde_urlencoded::ser::Error),
    #[error("status code error: {0}")]
    StatusCodeIsError(StatusCode),
}

impl Error {
    fn log_error(self, location: &Location, request: &Request) -> Self {
        tracing::debug!(
            %location,
            error = %self,
            method = %request.method,
            url = %request.url,
            "HTTP request failed",
        );
        self
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> RequestBuilder;
    fn post(&self, url: &str) -> RequestBuilder;

    async fn send(
        &self,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Headers,
        method: Method,
    ) -> Result<Response, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Method {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.0)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub body: Option<Vec<u8>>,
    pub headers: Headers,
    pub method: Method,
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct Response {
    pub body: Vec<u8>,
    pub headers: Headers,
    pub status: StatusCode,
    pub request: Request,
}

impl Response {
    #[track_caller]
    pub fn error_for_status(&self) -> Result<&Self, Error> {
        if !self.status.is_success() {
            let location = Location::caller();
            return Err(
                Error::StatusCodeIsError(self.status).log_error(location, &self.request)
            );
        }
        Ok(self)
    }

    /// Header lookup by case insensitive name.
    pub fn header_get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[track_caller]
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let location = Location::caller();
        serde_json::from_slice(&self.body)
            .map_err(|error| Error::from(error).log_error(location, &self.request))
    }

    fn log_success(&self) {
        tracing::debug!(
            method = %self.request.method,
            url = %self.request.url,
            status = %self.status,
            "HTTP request finished",
        );
    }
}

pub struct RequestBuilder {
    client: Arc<dyn HttpClient>,
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
    headers: Headers,
}

impl RequestBuilder {
    pub fn new(client: Arc<dyn HttpClient>, method: Method, url: &str) -> Self {
        Self {
            client,
            method,
            url: url.to_owned(),
            body: None,
            headers: Headers::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Result<Self, Error> {
        self.body = Some(serde_urlencoded::to_string(form)?.into_bytes());
        self.headers.insert(
            "Content-Type".to_owned(),
            "application/x-www-form-urlencoded".to_owned(),
        );
        Ok(self)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(json)?);
        self.headers
            .insert("Content-Type".to_owned(), "application/json".to_owned());
        Ok(self)
    }

    pub async fn send(self) -> Result<Response, Error> {
        let result = self
            .client
            .send(&self.url, self.body, self.headers, self.method)
            .await;
        match &result {
            Ok(response) => response.log_success(),
            Err(error) => {
                tracing::debug!(%error, method = %self.method, url = %self.url, "HTTP request failed")
            }
        }
        result
    }
}
