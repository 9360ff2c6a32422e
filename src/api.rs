use crate::{
    config::Config,
    errors::{ClientError, ClientResult},
    logging::log_api_call,
    models::{ApiCallLog, HttpReply},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Network side of the flows: POST a JSON body to a route and hand back the
/// raw status and body.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn post_json(&self, endpoint: &str, body: &Value) -> ClientResult<HttpReply>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn post_json(&self, endpoint: &str, body: &Value) -> ClientResult<HttpReply> {
        (**self).post_json(endpoint, body).await
    }
}

/// reqwest-backed `Backend` talking to the chat web app. Keeps a cookie store,
/// so the session set by a successful login rides along on later calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    logout_endpoint: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            logout_endpoint: crate::constants::LOGOUT_ENDPOINT.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let mut api = Self::new(
            config.base_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )?;
        api.logout_endpoint = config.endpoints.logout.clone();
        Ok(api)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Ends the server session. The server answers with a redirect whose target
    /// may not accept GET, so any status counts as done.
    pub async fn logout(&self) -> ClientResult<u16> {
        let reply = self.get(&self.logout_endpoint, "GET logout").await?;
        Ok(reply.status)
    }

    /// Whether the server serves `route` to this session. The landing page is
    /// login-protected and redirects elsewhere otherwise.
    pub async fn landing_page(&self, route: &str) -> ClientResult<bool> {
        let url = self.url(route);
        let start_time = Instant::now();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport_error(format!("Request failed: {}", e)))?;
        let status = response.status();
        // A redirect to the login page also ends in 2xx, so compare with the
        // path that was requested, base path included.
        let requested_path = reqwest::Url::parse(&url)
            .map_err(|e| ClientError::config_error(format!("Invalid URL '{}': {}", url, e)))?
            .path()
            .to_string();
        let served = status.is_success() && response.url().path() == requested_path;
        self.record(&url, format!("GET {}", route), status.as_u16(), start_time);
        Ok(served)
    }

    async fn get(&self, endpoint: &str, summary: &str) -> ClientResult<HttpReply> {
        let url = self.url(endpoint);
        let start_time = Instant::now();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport_error(format!("Request failed: {}", e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport_error(format!("Failed to read body: {}", e)))?;
        self.record(&url, summary.to_string(), status, start_time);
        Ok(HttpReply::new(status, body))
    }

    fn record(&self, url: &str, request_summary: String, status: u16, start_time: Instant) {
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: url.to_string(),
            request_summary,
            response_status: status,
            response_time_ms: start_time.elapsed().as_millis(),
        });
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn post_json(&self, endpoint: &str, body: &Value) -> ClientResult<HttpReply> {
        let url = self.url(endpoint);
        let start_time = Instant::now();

        // `.json` sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::transport_error(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::transport_error(format!("Failed to read body: {}", e)))?;

        self.record(&url, format!("POST {}", endpoint), status, start_time);
        Ok(HttpReply::new(status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_post_json_sends_json_and_returns_raw_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "hello" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(mock_server.uri(), None).unwrap();
        let reply = api.post_json("/chat", &json!({ "message": "hi" })).await.unwrap();

        assert!(reply.is_success());
        assert_eq!(reply.json().unwrap().text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad creds" })),
            )
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(mock_server.uri(), None).unwrap();
        let reply = api.post_json("/login", &json!({})).await.unwrap();
        assert_eq!(reply.status, 401);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:1", Some(Duration::from_secs(5))).unwrap();
        let result = api.post_json("/chat", &json!({ "message": "hi" })).await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn test_session_cookie_is_replayed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc; Path=/")
                    .set_body_json(json!({ "message": "Login successful" })),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index"))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(mock_server.uri(), None).unwrap();
        api.post_json("/login", &json!({ "username": "a", "password": "b" }))
            .await
            .unwrap();
        assert!(api.landing_page("/index").await.unwrap());
    }

    #[tokio::test]
    async fn test_landing_page_without_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/index"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(mock_server.uri(), None).unwrap();
        assert!(!api.landing_page("/index").await.unwrap());
    }

    #[tokio::test]
    async fn test_landing_page_under_base_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/app/index"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(format!("{}/app", mock_server.uri()), None).unwrap();
        assert!(api.landing_page("/index").await.unwrap());
    }

    #[tokio::test]
    async fn test_landing_page_redirected_elsewhere() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/index"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<form id=\"loginForm\"></form>"))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(mock_server.uri(), None).unwrap();
        assert!(!api.landing_page("/index").await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_accepts_any_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(format!("{}/", mock_server.uri()), None).unwrap();
        assert_eq!(api.logout().await.unwrap(), 405);
    }
}
