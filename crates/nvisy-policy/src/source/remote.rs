//! Remote policy source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use url::Url;

use super::{PolicySource, TRACING_TARGET};
use crate::{PolicyConfig, PolicyError, PolicyResult};

/// Route serving application policies.
pub const APP_POLICY_ROUTE: &str = "/v1/app/policy";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize)]
struct PolicyRequest<'a> {
    app_name: &'a str,
}

/// Fetches policies from the remote policy endpoint.
///
/// Every request carries the configured timeout; only HTTP 200 counts as
/// success.
#[derive(Debug, Clone)]
pub struct RemotePolicySource {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemotePolicySource {
    /// Creates a source targeting the service at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> PolicyResult<Self> {
        let endpoint = Url::parse(&format!(
            "{}{APP_POLICY_ROUTE}",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| PolicyError::invalid_config(format!("invalid policy url {base_url}: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("nvisy-policy/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PolicyError::invalid_config(e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            has_api_key = api_key.is_some(),
            "Created remote policy source"
        );

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.filter(|key| !key.is_empty()),
            timeout,
        })
    }

    /// Returns the policy endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> PolicyError {
        if err.is_timeout() {
            PolicyError::Timeout(self.timeout)
        } else if err.is_connect() {
            PolicyError::network(format!("unable to reach {}", self.endpoint))
        } else if err.is_decode() {
            PolicyError::parse(err.to_string())
        } else {
            PolicyError::network(err.to_string())
        }
    }
}

#[async_trait]
impl PolicySource for RemotePolicySource {
    fn name(&self) -> &'static str {
        "cloud"
    }

    async fn try_fetch(&self, app_name: &str) -> PolicyResult<PolicyConfig> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(&PolicyRequest { app_name });

        match &self.api_key {
            Some(api_key) => request = request.header(API_KEY_HEADER, api_key),
            None => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    "API key is missing for policy request"
                );
            }
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if status != StatusCode::OK {
            if status.is_server_error() {
                tracing::warn!(target: TRACING_TARGET, status = status.as_u16(), "Policy server error");
            } else if status.is_client_error() {
                tracing::warn!(target: TRACING_TARGET, status = status.as_u16(), "Policy server rejected the request");
            } else {
                tracing::warn!(target: TRACING_TARGET, status = status.as_u16(), "Unexpected policy response code");
            }
            return Err(PolicyError::Http {
                status: status.as_u16(),
            });
        }

        let policy = response
            .json::<PolicyConfig>()
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!(
            target: TRACING_TARGET,
            app_name = %app_name,
            "Fetched policy from remote endpoint"
        );

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn source(server: &MockServer, api_key: Option<&str>) -> RemotePolicySource {
        RemotePolicySource::new(
            &server.uri(),
            api_key.map(str::to_owned),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_route() {
        let source =
            RemotePolicySource::new("https://policy.example.com/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.endpoint().as_str(),
            "https://policy.example.com/v1/app/policy"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = RemotePolicySource::new("not a url", None, Duration::from_secs(1)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_fetches_policy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(APP_POLICY_ROUTE))
            .and(header(API_KEY_HEADER, "secret"))
            .and(body_json(serde_json::json!({"app_name": "acme"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "semantics": {"deny": ["politics"], "deny_groups": ["finance-advice"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let policy = source(&server, Some("secret")).fetch("acme").await.unwrap();
        let semantics = policy.semantics.unwrap();
        assert_eq!(semantics.deny, ["politics"]);
        assert_eq!(semantics.deny_groups, ["finance-advice"]);
    }

    #[tokio::test]
    async fn test_non_ok_status_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = source(&server, None);
        assert!(matches!(
            source.try_fetch("acme").await,
            Err(PolicyError::Http { status: 403 })
        ));
        assert!(source.fetch("acme").await.is_none());
    }

    #[tokio::test]
    async fn test_created_status_is_not_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        assert!(source(&server, None).fetch("acme").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(source(&server, None).fetch("acme").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let source =
            RemotePolicySource::new(&server.uri(), None, Duration::from_millis(50)).unwrap();
        assert!(matches!(
            source.try_fetch("acme").await,
            Err(PolicyError::Timeout(_))
        ));
    }
}
