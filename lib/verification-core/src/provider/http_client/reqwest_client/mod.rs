use std::sync::Arc;

use super::{Error, Headers, HttpClient, Method, Request, RequestBuilder, Response, StatusCode};

#[derive(Clone, Debug, Default)]
pub struct ReqwestClient {
    pub client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(Arc::new(self.clone()), Method::Get, url)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(Arc::new(self.clone()), Method::Post, url)
    }

    async fn send(
        &self,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Headers,
        method: Method,
    ) -> Result<Response, Error> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        let request = request.headers(to_header_map(&headers)?);
        let request = match body.clone() {
            Some(body) => request.body(body),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|error| Error::HttpError(error.to_string()))?;

        let status = StatusCode(response.status().as_u16());
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| Some((key.to_string(), value.to_str().ok()?.to_owned())))
            .collect();
        let response_body = response
            .bytes()
            .await
            .map_err(|error| Error::HttpError(error.to_string()))?;

        Ok(Response {
            body: response_body.to_vec(),
            headers: response_headers,
            status,
            request: Request {
                body,
                headers,
                method,
                url: url.to_owned(),
            },
        })
    }
}

fn to_header_map(headers: &Headers) -> Result<reqwest::header::HeaderMap, Error> {
    headers
        .iter()
        .map(|(name, value)| {
            Ok((
                reqwest::header::HeaderName::from_bytes(name.as_bytes())
                    .map_err(|error| Error::HttpError(error.to_string()))?,
                reqwest::header::HeaderValue::from_str(value)
                    .map_err(|error| Error::HttpError(error.to_string()))?,
            ))
        })
        .collect()
}
