use std::sync::Arc;

use chrono::Utc;
use rest::DiscordClient;
use tracing::warn;

use crate::crypto::Crypto;
use crate::error::{CoreError, Result};
use crate::models::AuthSessionStatus;
use crate::state_manager::StateManager;
use crate::store::Store;

/// Drives the callback leg of the authorization-code flow: state
/// validation, code exchange, user fetch, upsert, token encryption,
/// session status update. Each stage advances the session toward a
/// terminal status; a failure after state validation always leaves the
/// session `failed` with a one-line reason, even though the error
/// returned to the caller carries the full detail.
pub struct OAuthOrchestrator {
    store: Store,
    discord: Arc<DiscordClient>,
    crypto: Arc<Crypto>,
    state_manager: Arc<StateManager>,
}

impl OAuthOrchestrator {
    pub fn new(
        store: Store,
        discord: Arc<DiscordClient>,
        crypto: Arc<Crypto>,
        state_manager: Arc<StateManager>,
    ) -> Self {
        Self {
            store,
            discord,
            crypto,
            state_manager,
        }
    }

    /// Runs the full callback stage sequence. Returns the internal user id
    /// on success. Stages 1-6 mark the session `failed` with a one-line
    /// reason on error; the final status write does not, since the
    /// tokens are already durably stored by that point.
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<i64> {
        let session_id = self.state_manager.validate_state(state).await?;

        let user_id = match self.exchange_and_persist(code).await {
            Ok(user_id) => user_id,
            Err(err) => {
                self.fail_session(&session_id, &err.to_string()).await;
                return Err(err);
            }
        };

        if let Err(err) = self
            .store
            .update_auth_session_status(&session_id, AuthSessionStatus::Authenticated, Some(user_id), None)
            .await
        {
            warn!(session_id, %err, "failed to record authenticated status; tokens already stored");
            return Err(err);
        }

        Ok(user_id)
    }

    /// Stages 2-6: exchange the code, fetch the profile, upsert the user,
    /// encrypt and store the tokens. Stage 1 (state validation) already
    /// happened in the caller.
    async fn exchange_and_persist(&self, code: &str) -> Result<i64> {
        let tokens = self
            .discord
            .exchange_code(code)
            .await
            .map_err(|_| CoreError::UpstreamAuthError("failed to exchange authorization code".into()))?;

        let profile = self
            .discord
            .get_user_info(&tokens.access_token)
            .await
            .map_err(|_| CoreError::UpstreamHttpError("failed to fetch user information".into()))?;

        let user = self
            .store
            .create_or_update_user(
                &profile.id,
                &profile.username,
                profile.discriminator.as_deref(),
                profile.avatar.as_deref(),
                profile.email.as_deref(),
            )
            .await
            .map_err(|_| CoreError::StoreError("failed to save user data".into()))?;

        let access_ciphertext = self
            .crypto
            .encrypt_str(&tokens.access_token)
            .map_err(|_| CoreError::Internal("failed to secure tokens".into()))?;
        let refresh_ciphertext = self
            .crypto
            .encrypt_str(&tokens.refresh_token)
            .map_err(|_| CoreError::Internal("failed to secure tokens".into()))?;

        let expiry = Utc::now() + chrono::Duration::seconds(tokens.expires_in);

        self.store
            .store_oauth_token(
                user.id,
                &access_ciphertext,
                &refresh_ciphertext,
                &tokens.token_type,
                expiry,
                &tokens.scope,
            )
            .await
            .map_err(|_| CoreError::StoreError("failed to store authentication data".into()))?;

        Ok(user.id)
    }

    async fn fail_session(&self, session_id: &str, reason: &str) {
        if let Err(err) = self
            .store
            .update_auth_session_status(session_id, AuthSessionStatus::Failed, None, Some(reason))
            .await
        {
            warn!(session_id, %err, "failed to mark auth session failed");
        }
    }
}
