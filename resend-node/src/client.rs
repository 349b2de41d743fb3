//! HTTP dispatch against the Resend API.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use crate::config::Config;
use crate::error::{ResendError, Result};
use crate::transform::ApiRequest;

/// Envelope of every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    name: Option<String>,
    message: String,
}

/// Bearer-authenticated client for one API base URL.
#[derive(Debug, Clone)]
pub struct ResendClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ResendClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ResendError::missing("RESEND_API_KEY is required"))?;
        Self::new(api_key, &config.api_url, config.request_timeout())
    }

    /// Full URL for a request; segments are percent-encoded individually.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }

    /// Send the request and return the decoded JSON body (`Null` when empty).
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url_for(request)?;
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .bearer_auth(&self.api_key);
        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(
                method = %request.method,
                path = %request.path(),
                is_timeout = e.is_timeout(),
                error = %e,
                "resend_request_failed"
            );
            e
        })?;

        let status = response.status();
        let text = response.text().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => match body.name {
                    Some(name) => format!("{} ({})", body.message, name),
                    None => body.message,
                },
                Err(_) if text.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => text,
            };
            error!(
                method = %request.method,
                path = %request.path(),
                status_code = status.as_u16(),
                duration_ms,
                message = %message,
                "resend_api_error"
            );
            return Err(ResendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        info!(
            method = %request.method,
            path = %request.path(),
            status_code = status.as_u16(),
            duration_ms,
            "resend_request_complete"
        );

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Execute a list request and decode the `{object, data, has_more}` envelope.
    pub async fn list<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<ListResponse<T>> {
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{prepare_pagination, PaginationFields};
    use reqwest::Method;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ResendClient {
        ResendClient::new("re_test_key", &server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_encodes_segments() {
        let client =
            ResendClient::new("k", "https://api.resend.com", Duration::from_secs(1)).unwrap();
        let request = ApiRequest::new(Method::GET, &["contacts", "ada lovelace@example.com"]);

        assert_eq!(
            client.url_for(&request).unwrap().as_str(),
            "https://api.resend.com/contacts/ada%20lovelace@example.com"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client =
            ResendClient::new("k", "http://localhost:9000/v1/", Duration::from_secs(1)).unwrap();
        let request = ApiRequest::new(Method::POST, &["broadcasts", "b_1", "send"]);

        assert_eq!(
            client.url_for(&request).unwrap().as_str(),
            "http://localhost:9000/v1/broadcasts/b_1/send"
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config {
            api_key: None,
            api_url: "https://api.resend.com".to_string(),
            request_timeout_ms: 1000,
            port: 8080,
            webhook_signing_secret: None,
            webhook_events: vec![],
            cloudamqp_url: String::new(),
        };
        let err = ResendClient::from_config(&config).unwrap_err();
        assert!(matches!(err, ResendError::MissingRequiredField(_)));
    }

    #[tokio::test]
    async fn test_execute_posts_json_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test_key"))
            .and(body_json(json!({"from": "a@x.com", "to": ["b@y.com"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "e_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::new(Method::POST, &["emails"])
            .with_body(&json!({"from": "a@x.com", "to": ["b@y.com"]}))
            .unwrap();
        let response = client(&server).execute(&request).await.unwrap();

        assert_eq!(response, json!({"id": "e_1"}));
    }

    #[tokio::test]
    async fn test_list_sends_pagination_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts"))
            .and(query_param("limit", "10"))
            .and(query_param("after", "cursor123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "c_1"}, {"id": "c_2"}],
                "has_more": true
            })))
            .mount(&server)
            .await;

        let query = prepare_pagination(&PaginationFields {
            limit: Some(10),
            after: "cursor123".to_string(),
            before: String::new(),
        });
        let request = ApiRequest::new(Method::GET, &["contacts"]).with_query(query);
        let page: ListResponse<Value> = client(&server).list(&request).await.unwrap();

        assert_eq!(page.object, "list");
        assert_eq!(page.data.len(), 2);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/topics/t_404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "statusCode": 404,
                "name": "not_found",
                "message": "Topic not found"
            })))
            .mount(&server)
            .await;

        let request = ApiRequest::new(Method::DELETE, &["topics", "t_404"]);
        let err = client(&server).execute(&request).await.unwrap_err();

        match err {
            ResendError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Topic not found (not_found)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_response_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/contacts/c_1/segments/s_1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let request = ApiRequest::new(Method::DELETE, &["contacts", "c_1", "segments", "s_1"]);
        let response = client(&server).execute(&request).await.unwrap();

        assert_eq!(response, Value::Null);
    }
}
