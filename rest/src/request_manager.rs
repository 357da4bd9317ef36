use std::collections::HashMap;

use api_types::{routes, GatewayBotObject, GatewayObject};
use reqwest::{header::AUTHORIZATION, Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::{RateLimiter, RestError};

/// How a given request authenticates itself against the Discord API.
#[derive(Clone, Debug)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`: a user's OAuth access token.
    Bearer(String),
    /// `Authorization: Bot <token>`: the application's own bot token,
    /// required for routes (like `/guilds/{id}/channels`) not granted to
    /// user OAuth scopes.
    Bot(String),
    None,
}

#[derive(Serialize)]
pub struct Dummy;

pub struct RequestManagerOptions {
    pub base_url: String,
}

impl Default for RequestManagerOptions {
    fn default() -> Self {
        Self {
            base_url: "https://discord.com/api/v10".to_owned(),
        }
    }
}

pub struct RequestOptions<T: Serialize = Dummy> {
    pub route_key: String,
    pub path: String,
    pub method: Method,
    pub auth: AuthScheme,
    pub json_body: Option<T>,
    pub form_body: Option<T>,
    pub extra_headers: HashMap<String, String>,
}

impl<T: Serialize> RequestOptions<T> {
    pub fn get(route_key: impl Into<String>, path: impl Into<String>, auth: AuthScheme) -> Self {
        Self {
            route_key: route_key.into(),
            path: path.into(),
            method: Method::GET,
            auth,
            json_body: None,
            form_body: None,
            extra_headers: HashMap::new(),
        }
    }

    pub fn post_form(
        route_key: impl Into<String>,
        path: impl Into<String>,
        auth: AuthScheme,
        body: T,
    ) -> Self {
        Self {
            route_key: route_key.into(),
            path: path.into(),
            method: Method::POST,
            auth,
            json_body: None,
            form_body: Some(body),
            extra_headers: HashMap::new(),
        }
    }
}

/// Thin HTTP client wired to a single [`RateLimiter`]. Every REST call in
/// this crate's `DiscordClient` routes through [`RequestManager::request`],
/// the single helper that waits on the limiter, executes the request,
/// updates bucket state from response headers, and translates 429s.
pub struct RequestManager {
    options: RequestManagerOptions,
    client: Client,
    rate_limiter: RateLimiter,
}

impl Default for RequestManager {
    fn default() -> Self {
        Self::new(RequestManagerOptions::default())
    }
}

impl RequestManager {
    pub fn new(options: RequestManagerOptions) -> Self {
        Self {
            options,
            client: Client::new(),
            rate_limiter: RateLimiter::new(),
        }
    }

    #[inline]
    fn api(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url, path)
    }

    /// Executes one REST call under rate-limit discipline: waits for a
    /// bucket slot, performs the request, updates the bucket from response
    /// headers, and on 429 records the reset and surfaces `RateLimited`
    /// rather than retrying silently.
    pub async fn request<T: Serialize>(
        &self,
        options: RequestOptions<T>,
    ) -> Result<Response, RestError> {
        self.rate_limiter.wait(&options.route_key).await;

        let mut builder = self.client.request(options.method, self.api(&options.path));

        builder = match &options.auth {
            AuthScheme::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            AuthScheme::Bot(token) => builder.header(AUTHORIZATION, format!("Bot {token}")),
            AuthScheme::None => builder,
        };

        for (k, v) in &options.extra_headers {
            builder = builder.header(k, v);
        }

        if let Some(body) = &options.json_body {
            builder = builder.json(body);
        }
        if let Some(body) = &options.form_body {
            builder = builder.form(body);
        }

        let response = builder.send().await?;

        self.rate_limiter
            .update_from_headers(&options.route_key, response.headers());

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let wait = self
                .rate_limiter
                .handle_rate_limited(&options.route_key, response.headers());
            warn!(route = %options.route_key, wait, "rate limited by discord");
            return Err(RestError::RateLimited {
                retry_after_secs: wait,
            });
        }

        Ok(response)
    }

    pub async fn get_gateway(&self) -> Result<GatewayObject, RestError> {
        let options = RequestOptions::<Dummy>::get(
            "GET /gateway",
            routes::gateway(),
            AuthScheme::None,
        );
        Ok(self.request(options).await?.json().await?)
    }

    pub async fn get_gateway_bot(&self, bot_token: &str) -> Result<GatewayBotObject, RestError> {
        let options = RequestOptions::<Dummy>::get(
            "GET /gateway/bot",
            routes::gateway_bot(),
            AuthScheme::Bot(bot_token.to_owned()),
        );
        Ok(self.request(options).await?.json().await?)
    }
}
