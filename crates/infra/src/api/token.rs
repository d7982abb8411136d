//! Refresh-token exchange against the regional OAuth endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};
use wakelink_core::{IssuedToken, TokenExchange};
use wakelink_domain::{Region, RemoteError, VehicleConfig, VehicleError};

use super::types::TokenResponseDto;
use crate::errors::{map_status_error, remote_from_reqwest};
use crate::http::HttpClient;

const CLIENT_ID: &str = "ownerapi";
const SCOPE: &str = "openid email offline_access";
/// Lifetime assumed when the issuer omits `expires_in`
const DEFAULT_LIFETIME: Duration = Duration::from_secs(8 * 60 * 60);

/// OAuth client performing the `refresh_token` grant
#[derive(Debug, Clone)]
pub struct OAuthTokenClient {
    http: HttpClient,
    token_url: Option<String>,
}

impl OAuthTokenClient {
    /// Client that resolves the token URL from the region on every exchange
    pub fn new() -> Result<Self, VehicleError> {
        Ok(Self::with_http(HttpClient::new()?))
    }

    pub fn with_http(http: HttpClient) -> Self {
        Self { http, token_url: None }
    }

    /// Pin the token endpoint regardless of region
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Client honoring endpoint overrides in `config`
    pub fn from_config(config: &VehicleConfig) -> Result<Self, VehicleError> {
        let client = Self::new()?;
        Ok(match &config.endpoints {
            Some(endpoints) => client.with_token_url(endpoints.token_url.clone()),
            None => client,
        })
    }

    fn token_url(&self, region: Region) -> String {
        self.token_url.clone().unwrap_or_else(|| region.endpoints().token_url)
    }
}

#[async_trait]
impl TokenExchange for OAuthTokenClient {
    #[instrument(skip(self, refresh_token), fields(%region))]
    async fn exchange(&self, refresh_token: &str, region: Region) -> Result<IssuedToken, RemoteError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", CLIENT_ID),
            ("refresh_token", refresh_token),
            ("scope", SCOPE),
        ];
        let request = self.http.request(Method::POST, self.token_url(region)).form(&params);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let token: TokenResponseDto = response.json().await.map_err(|err| remote_from_reqwest(&err))?;
        if token.access_token.is_empty() {
            return Err(RemoteError::decode("token response carried an empty access_token"));
        }
        let expires_in = token.expires_in.map(Duration::from_secs).unwrap_or(DEFAULT_LIFETIME);
        debug!(expires_in_secs = expires_in.as_secs(), "access token issued");

        Ok(IssuedToken { access_token: token.access_token, expires_in })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wakelink_domain::RemoteErrorKind;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> OAuthTokenClient {
        let http = HttpClient::builder().max_attempts(1).build().unwrap();
        OAuthTokenClient::with_http(http).with_token_url(format!("{}/oauth2/v3/token", server.uri()))
    }

    #[tokio::test]
    async fn exchanges_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/v3/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt-123"))
            .and(body_string_contains("client_id=ownerapi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "refresh_token": "rt-124",
                "expires_in": 28800,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server).exchange("rt-123", Region::Global).await.unwrap();
        assert_eq!(token.access_token, "access-1");
        assert_eq!(token.expires_in, Duration::from_secs(28800));
    }

    #[tokio::test]
    async fn missing_lifetime_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "a"})))
            .mount(&server)
            .await;

        let token = client(&server).exchange("rt", Region::China).await.unwrap();
        assert_eq!(token.expires_in, DEFAULT_LIFETIME);
    }

    #[tokio::test]
    async fn invalid_grant_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "refresh token revoked"
            })))
            .mount(&server)
            .await;

        let err = client(&server).exchange("rt", Region::Global).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Http { status: 401 });
        assert!(err.message.contains("refresh token revoked"));
    }

    #[test]
    fn region_selects_token_url() {
        let client = OAuthTokenClient::with_http(HttpClient::new().unwrap());
        assert_eq!(client.token_url(Region::China), "https://auth.tesla.cn/oauth2/v3/token");
        assert_eq!(
            client.with_token_url("http://localhost/token").token_url(Region::China),
            "http://localhost/token"
        );
    }
}
