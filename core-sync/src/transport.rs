//! Authenticated single-attempt request layer over the platform HTTP client.

use crate::error::{Result, SyncError};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::HttpResponse;
use core_auth::TokenProvider;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Client for the service's JSON API.
///
/// Every request acquires a bearer token first; a token failure short-circuits
/// without touching the network. Requests are submitted exactly once —
/// mutation batches are not idempotent, so retrying is left to the caller.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
}

impl ApiClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            base_url: base_url.into(),
        }
    }

    /// GET an endpoint with query parameters, returning the raw response on
    /// any 2xx status.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Get, self.build_url(endpoint, params));
        self.send(request).await
    }

    /// POST a JSON body to an endpoint with query parameters.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post_json<B: Serialize>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        body: &B,
    ) -> Result<HttpResponse> {
        let request =
            HttpRequest::new(HttpMethod::Post, self.build_url(endpoint, params)).json(body)?;
        self.send(request).await
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = self.tokens.access_token().await?;

        let request = request
            .bearer_token(token.secret)
            .header("Accept", "application/json");

        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::none())
            .await?;

        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(status = response.status, "api request rejected");
            return Err(SyncError::Api {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }

    fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use core_auth::{AccessToken, AuthError};
    use mockall::mock;
    use mockall::predicate::function;
    use std::collections::HashMap;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::Result<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> bridge_traits::Result<HttpResponse>;
        }
    }

    struct StaticTokens(&'static str);

    #[async_trait]
    impl TokenProvider for StaticTokens {
        async fn access_token(&self) -> core_auth::Result<AccessToken> {
            Ok(AccessToken::permanent(self.0.to_string()))
        }
    }

    struct FailingTokens;

    #[async_trait]
    impl TokenProvider for FailingTokens {
        async fn access_token(&self) -> core_auth::Result<AccessToken> {
            Err(AuthError::NotAuthenticated)
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_builds_url_and_auth_header() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .with(
                function(|request: &HttpRequest| {
                    request.method == HttpMethod::Get
                        && request.url == "https://api.test/v2/playlists?dv=0&hl=en-US"
                        && request.headers.get("Authorization")
                            == Some(&"Bearer tok-1".to_string())
                }),
                function(|policy: &RetryPolicy| policy.max_attempts == 1),
            )
            .times(1)
            .returning(|_, _| Ok(response(200, "{}")));

        let client = ApiClient::new(
            Arc::new(http),
            Arc::new(StaticTokens("tok-1")),
            "https://api.test/v2/",
        );

        let result = client
            .get("playlists", &params(&[("dv", "0"), ("hl", "en-US")]))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_query_values_are_percent_encoded() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .withf(|request, _| request.url.ends_with("?updated-min=162%20000"))
            .times(1)
            .returning(|_, _| Ok(response(200, "{}")));

        let client = ApiClient::new(
            Arc::new(http),
            Arc::new(StaticTokens("tok-1")),
            "https://api.test/",
        );

        client
            .get("feed", &params(&[("updated-min", "162 000")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_post_sends_json_body_once() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .withf(|request, policy| {
                request.method == HttpMethod::Post
                    && request.headers.get("Content-Type")
                        == Some(&"application/json".to_string())
                    && request.body.as_deref() == Some(br#"{"mutations":[]}"#.as_slice())
                    && policy.max_attempts == 1
            })
            .times(1)
            .returning(|_, _| Ok(response(200, r#"{"mutate_response":[]}"#)));

        let client = ApiClient::new(
            Arc::new(http),
            Arc::new(StaticTokens("tok-1")),
            "https://api.test/",
        );

        client
            .post_json(
                "playlistbatch",
                &[],
                &serde_json::json!({"mutations": []}),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_api_error() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(response(403, "forbidden")));

        let client = ApiClient::new(
            Arc::new(http),
            Arc::new(StaticTokens("tok-1")),
            "https://api.test/",
        );

        let result = client.get("playlists", &[]).await;
        assert!(matches!(
            result,
            Err(SyncError::Api { status: 403, ref message }) if message == "forbidden"
        ));
    }

    #[tokio::test]
    async fn test_token_failure_skips_network() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry().times(0);

        let client = ApiClient::new(Arc::new(http), Arc::new(FailingTokens), "https://api.test/");

        let result = client.get("playlists", &[]).await;
        assert!(matches!(result, Err(SyncError::Auth(_))));
    }
}
