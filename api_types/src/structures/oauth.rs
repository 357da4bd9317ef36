use serde::{Deserialize, Serialize};

/// Response shape shared by `/oauth2/token`'s authorization-code exchange
/// and its `refresh_token` grant.
/// [Discord documentation](https://discord.com/developers/docs/topics/oauth2#authorization-code-grant-access-token-exchange-example).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,

    pub token_type: String,

    pub expires_in: i64,

    pub refresh_token: String,

    pub scope: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum TokenExchangeRequest<'a> {
    AuthorizationCode {
        code: &'a str,
        redirect_uri: &'a str,
        client_id: &'a str,
        client_secret: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
        client_id: &'a str,
        client_secret: &'a str,
    },
}
