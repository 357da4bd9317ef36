use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use gateway::{GatewayAuth, GatewayError};
use rest::DiscordClient;

use crate::crypto::Crypto;
use crate::error::{CoreError, Result};
use crate::store::Store;

/// How close to expiry a token must be before `refresh_if_needed` calls
/// upstream.
const REFRESH_WINDOW: ChronoDuration = ChronoDuration::minutes(5);

/// Decrypts a user's stored access token, transparently refreshing it (and
/// re-persisting both ciphertexts) when it's within the refresh window of
/// expiry. Shared by the RPC facade's read path and
/// [`GatewayAuth::access_token_for_user`] so both call sites refresh with
/// the same policy.
pub struct TokenService {
    store: Store,
    discord: Arc<DiscordClient>,
    crypto: Arc<Crypto>,
}

impl TokenService {
    pub fn new(store: Store, discord: Arc<DiscordClient>, crypto: Arc<Crypto>) -> Self {
        Self { store, discord, crypto }
    }

    /// Returns the plaintext access token for `user_id` and whether it was
    /// refreshed upstream during this call.
    pub async fn access_token_for_user(&self, user_id: i64) -> Result<(String, bool)> {
        let token = self
            .store
            .get_oauth_token(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("oauth token for user {user_id}")))?;

        if token.expiry - Utc::now() > REFRESH_WINDOW {
            let access = self.crypto.decrypt_str(&token.access_token_ciphertext)?;
            return Ok((access, false));
        }

        let refresh_plaintext = self.crypto.decrypt_str(&token.refresh_token_ciphertext)?;
        let refreshed = self
            .discord
            .refresh_token(&refresh_plaintext)
            .await
            .map_err(|err| CoreError::UpstreamAuthError(err.to_string()))?;

        let access_ciphertext = self.crypto.encrypt_str(&refreshed.access_token)?;
        let refresh_ciphertext = self.crypto.encrypt_str(&refreshed.refresh_token)?;
        let expiry = Utc::now() + ChronoDuration::seconds(refreshed.expires_in);

        self.store
            .store_oauth_token(
                user_id,
                &access_ciphertext,
                &refresh_ciphertext,
                &refreshed.token_type,
                expiry,
                &refreshed.scope,
            )
            .await?;

        Ok((refreshed.access_token, true))
    }
}

/// Lets `gateway::GatewayManager::ensure_connection` obtain a usable token
/// without depending on `core`'s concrete types.
#[async_trait]
impl GatewayAuth for TokenService {
    async fn access_token_for_user(&self, user_id: i64) -> gateway::Result<String> {
        TokenService::access_token_for_user(self, user_id)
            .await
            .map(|(token, _)| token)
            .map_err(|err| GatewayError::Auth(err.to_string()))
    }
}
