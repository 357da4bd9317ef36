use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration as ChronoDuration, Utc};
use rand::RngCore;

use crate::error::{CoreError, Result};
use crate::store::Store;

/// Issues and validates one-shot CSRF state tokens bound to an auth
/// session. Atomicity of `validate_state` comes entirely from
/// [`Store::validate_and_delete_oauth_state`]'s single delete-returning
/// statement; this type carries no in-process lock.
pub struct StateManager {
    store: Store,
    state_expiry: ChronoDuration,
}

impl StateManager {
    pub fn new(store: Store, state_expiry_minutes: i64) -> Self {
        Self {
            store,
            state_expiry: ChronoDuration::minutes(state_expiry_minutes),
        }
    }

    /// 32 random bytes from the OS RNG, URL-safe base64 (no padding)
    /// encoded.
    pub fn generate_state() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub async fn store_state(&self, state: &str, session_id: &str) -> Result<()> {
        let expires_at = Utc::now() + self.state_expiry;
        self.store.store_oauth_state(state, session_id, expires_at).await
    }

    /// Single-use across concurrent callers: exactly one concurrent
    /// validator of the same token succeeds.
    pub async fn validate_state(&self, state: &str) -> Result<String> {
        match self.store.validate_and_delete_oauth_state(state).await {
            Ok(session_id) => Ok(session_id),
            Err(CoreError::ExpiredState) => Err(CoreError::InvalidState),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_state_is_stable_length_and_url_safe() {
        let state = StateManager::generate_state();
        assert!(!state.contains('+') && !state.contains('/') && !state.contains('='));
        assert!(state.len() >= 40);
    }

    #[test]
    fn generate_state_is_not_constant() {
        assert_ne!(StateManager::generate_state(), StateManager::generate_state());
    }
}
