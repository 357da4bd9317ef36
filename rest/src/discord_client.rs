use api_types::{
    routes, ChannelObject, GuildObject, MessageObject, TokenExchangeRequest, TokenExchangeResponse,
    UserObject,
};
use reqwest::StatusCode;
use url::Url;

use crate::{AuthScheme, RequestManager, RequestManagerOptions, RestError};

/// Static OAuth2 configuration this client was built with.
#[derive(Clone, Debug)]
pub struct DiscordClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub bot_token: String,
}

/// Typed HTTP client over Discord's REST API. Every call funnels
/// through [`RequestManager::request`], so every call is rate-limited and
/// header-aware.
pub struct DiscordClient {
    manager: RequestManager,
    config: DiscordClientConfig,
}

impl DiscordClient {
    pub fn new(config: DiscordClientConfig) -> Self {
        Self {
            manager: RequestManager::new(RequestManagerOptions::default()),
            config,
        }
    }

    /// Points the client at an alternate API base URL instead of
    /// `https://discord.com/api/v10`, for tests that stand up a local
    /// mock server.
    pub fn with_base_url(config: DiscordClientConfig, base_url: String) -> Self {
        Self {
            manager: RequestManager::new(RequestManagerOptions { base_url }),
            config,
        }
    }

    /// Formats Discord's authorize URL for the browser redirect leg of the
    /// authorization-code flow.
    pub fn get_auth_url(&self, state: &str) -> String {
        let mut url = Url::parse("https://discord.com/api/oauth2/authorize")
            .expect("static authorize URL is valid");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);
        url.into()
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, RestError> {
        self.token_request(TokenExchangeRequest::AuthorizationCode {
            code,
            redirect_uri: &self.config.redirect_uri,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
        })
        .await
    }

    pub async fn refresh_token(&self, refresh: &str) -> Result<TokenExchangeResponse, RestError> {
        self.token_request(TokenExchangeRequest::RefreshToken {
            refresh_token: refresh,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
        })
        .await
    }

    async fn token_request(
        &self,
        body: TokenExchangeRequest<'_>,
    ) -> Result<TokenExchangeResponse, RestError> {
        use crate::request_manager::RequestOptions;

        let options = RequestOptions::post_form(
            "POST /oauth2/token",
            routes::oauth2_token(),
            AuthScheme::None,
            body,
        );

        let response = self.manager.request(options).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::UpstreamAuthError { status, body });
        }

        Ok(response.json().await?)
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<UserObject, RestError> {
        self.get_bearer(
            "GET /users/@me",
            routes::users_me(),
            access_token,
        )
        .await
    }

    pub async fn get_user_guilds(&self, access_token: &str) -> Result<Vec<GuildObject>, RestError> {
        self.get_bearer(
            "GET /users/@me/guilds",
            routes::users_me_guilds(),
            access_token,
        )
        .await
    }

    /// `guilds.channels` listing is not granted to user OAuth tokens, so this
    /// call authenticates with the configured bot token instead.
    pub async fn get_guild_channels(
        &self,
        guild_id: &str,
    ) -> Result<Vec<ChannelObject>, RestError> {
        use crate::request_manager::RequestOptions;

        let options = RequestOptions::<crate::request_manager::Dummy>::get(
            "GET /guilds/:id/channels",
            routes::guild_channels(guild_id),
            AuthScheme::Bot(self.config.bot_token.clone()),
        );

        self.get_checked(options).await
    }

    pub async fn get_channel_messages(
        &self,
        access_token: &str,
        channel_id: &str,
        limit: Option<u32>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<MessageObject>, RestError> {
        use crate::request_manager::RequestOptions;

        let limit = limit.unwrap_or(50).clamp(1, 100);
        let mut path = format!(
            "{}?limit={limit}",
            routes::channel_messages(channel_id)
        );
        if let Some(before) = before.filter(|b| !b.is_empty()) {
            path.push_str(&format!("&before={before}"));
        }
        if let Some(after) = after.filter(|a| !a.is_empty()) {
            path.push_str(&format!("&after={after}"));
        }

        let options = RequestOptions::<crate::request_manager::Dummy>::get(
            "GET /channels/:id/messages",
            path,
            AuthScheme::Bearer(access_token.to_owned()),
        );

        self.get_checked(options).await
    }

    async fn get_bearer<T: serde::de::DeserializeOwned>(
        &self,
        route_key: &str,
        path: String,
        access_token: &str,
    ) -> Result<T, RestError> {
        use crate::request_manager::RequestOptions;

        let options = RequestOptions::<crate::request_manager::Dummy>::get(
            route_key,
            path,
            AuthScheme::Bearer(access_token.to_owned()),
        );
        self.get_checked(options).await
    }

    async fn get_checked<T: serde::de::DeserializeOwned>(
        &self,
        options: crate::request_manager::RequestOptions<crate::request_manager::Dummy>,
    ) -> Result<T, RestError> {
        let response = self.manager.request(options).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            unreachable!("RequestManager::request already maps 429 to RateLimited");
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::UpstreamHttpError { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DiscordClientConfig {
        DiscordClientConfig {
            client_id: "client123".into(),
            client_secret: "secret".into(),
            redirect_uri: "https://example.com/auth/callback".into(),
            scopes: vec!["identify".into(), "guilds".into()],
            bot_token: "bot-token".into(),
        }
    }

    #[test]
    fn auth_url_carries_state_and_scopes() {
        let client = DiscordClient::new(test_config());
        let url = client.get_auth_url("xyz");

        assert!(url.contains("client_id=client123"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("response_type=code"));
    }

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client(server: &MockServer) -> DiscordClient {
        DiscordClient::with_base_url(test_config(), server.uri())
    }

    #[tokio::test]
    async fn exchange_code_parses_successful_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "mock_access_token_123",
                "token_type": "Bearer",
                "expires_in": 604800,
                "refresh_token": "mock_refresh_token_456",
                "scope": "identify guilds",
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let tokens = client.exchange_code("valid_code").await.unwrap();

        assert_eq!(tokens.access_token, "mock_access_token_123");
        assert_eq!(tokens.refresh_token, "mock_refresh_token_456");
        assert_eq!(tokens.expires_in, 604800);
    }

    #[tokio::test]
    async fn exchange_code_maps_non_2xx_to_upstream_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.exchange_code("stale_code").await.unwrap_err();

        assert!(matches!(err, RestError::UpstreamAuthError { status: 400, .. }));
    }

    #[tokio::test]
    async fn get_user_info_sends_bearer_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .and(header("authorization", "Bearer user-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "123456789012345678",
                "username": "TestUser",
                "discriminator": "1234",
                "avatar": "avatar_hash_123",
                "email": "testuser@example.com",
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let user = client.get_user_info("user-access-token").await.unwrap();

        assert_eq!(user.id, "123456789012345678");
        assert_eq!(user.username, "TestUser");
    }

    #[tokio::test]
    async fn get_guild_channels_authenticates_with_bot_scheme_not_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/guilds/999/channels"))
            .and(header("authorization", "Bot bot-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let channels = client.get_guild_channels("999").await.unwrap();
        assert!(channels.is_empty());
    }

    #[tokio::test]
    async fn get_channel_messages_forwards_pagination_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let messages = client
            .get_channel_messages("token", "42", Some(50), Some("msg20"), None)
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn rate_limited_response_surfaces_retry_after_as_rate_limited_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "2")
                    .set_body_json(serde_json::json!({"message": "You are being rate limited."})),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.get_user_info("token").await.unwrap_err();

        match err {
            RestError::RateLimited { retry_after_secs } => {
                assert!((retry_after_secs - 2.0).abs() < 1e-9);
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
