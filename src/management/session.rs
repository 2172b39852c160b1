use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Url;
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::Config,
    info,
    management::{MemoryStore, SessionStore},
    spotify::TokenEndpoint,
    types::{AuthState, AuthorizationRequest, ClientCredentials, Tenant, Token, UserSession},
    utils, warning,
};

/// Seconds shaved off every token lifetime so a token is refreshed before
/// Spotify starts rejecting it.
pub const EXPIRY_MARGIN_SECS: i64 = 240;

/// Upper bound on the lifetime granted to any token, whatever `expires_in` says.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub tenants: Vec<Tenant>,
    pub redirect_uri: String,
    pub auth_url: String,
    pub scope: String,
    pub state_ttl: Duration,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tenants: config.tenants.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            scope: config.scope.clone(),
            state_ttl: config.auth_state_ttl,
        }
    }
}

/// Owns the pending-authorization map and the authenticated-user map.
///
/// All provider calls obtain their access token through [`ensure_valid`],
/// which refreshes an expired session at most once per user even when several
/// requests race for it.
///
/// [`ensure_valid`]: SessionManager::ensure_valid
pub struct SessionManager {
    settings: AuthSettings,
    tokens: Arc<dyn TokenEndpoint>,
    pending: Arc<dyn SessionStore<AuthState>>,
    sessions: Arc<dyn SessionStore<UserSession>>,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionManager {
    pub fn new(
        settings: AuthSettings,
        tokens: Arc<dyn TokenEndpoint>,
        pending: Arc<dyn SessionStore<AuthState>>,
        sessions: Arc<dyn SessionStore<UserSession>>,
    ) -> Self {
        Self {
            settings,
            tokens,
            pending,
            sessions,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory(settings: AuthSettings, tokens: Arc<dyn TokenEndpoint>) -> Self {
        Self::new(
            settings,
            tokens,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Starts the authorization-code flow for `tenant`.
    ///
    /// Returns the Spotify authorize URL together with the state token it
    /// embeds. The state is stored as pending until the callback consumes it
    /// or it outlives the configured TTL.
    pub async fn begin_authorization(&self, tenant: &str) -> Res<AuthorizationRequest> {
        let tenant = self.tenant(tenant)?;
        let credentials = tenant
            .credentials
            .as_ref()
            .ok_or_else(|| Error::MissingCredentials(tenant.name.clone()))?;

        self.evict_expired_states().await;

        let state = utils::generate_state_token();
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);

        let auth_url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("state", state.as_str()),
                ("scope", self.settings.scope.as_str()),
                ("code_challenge", code_challenge.as_str()),
                ("code_challenge_method", "S256"),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorize url: {}", e)))?;

        self.pending
            .put(
                state.clone(),
                AuthState {
                    tenant: tenant.name.clone(),
                    client_id: credentials.client_id.clone(),
                    redirect_uri: self.settings.redirect_uri.clone(),
                    code_verifier,
                    created_at: Utc::now(),
                },
            )
            .await;

        Ok(AuthorizationRequest {
            auth_url: auth_url.to_string(),
            state,
        })
    }

    /// Finishes the flow started by [`begin_authorization`] and returns the
    /// new user id.
    ///
    /// The pending state is deleted before the code is exchanged, so a state
    /// token is accepted at most once even if the exchange fails. Other expired
    /// states are swept on the way.
    ///
    /// [`begin_authorization`]: SessionManager::begin_authorization
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Res<String> {
        let pending = self.pending.take(state).await;
        self.evict_expired_states().await;
        let pending = pending.ok_or(Error::InvalidOrExpiredState)?;
        if self.is_state_expired(&pending, Utc::now()) {
            return Err(Error::InvalidOrExpiredState);
        }

        let credentials = self.credentials(&pending.tenant)?;
        let token = self
            .tokens
            .exchange_code(
                &credentials,
                code,
                &pending.redirect_uri,
                &pending.code_verifier,
            )
            .await
            .map_err(|e| Error::classify(e, Error::TokenExchangeFailed))?;

        let Some(refresh_token) = token.refresh_token.clone() else {
            return Err(Error::TokenExchangeFailed(
                "token response carried no refresh token".into(),
            ));
        };

        let user_id = utils::generate_user_id();
        self.sessions
            .put(
                user_id.clone(),
                UserSession {
                    access_token: token.access_token.clone(),
                    refresh_token,
                    expires_at: expiry_from(&token, Utc::now()),
                    tenant: pending.tenant.clone(),
                },
            )
            .await;

        info!("Tenant {} authenticated a new session", pending.tenant);
        Ok(user_id)
    }

    /// Returns a usable access token for `user_id`, refreshing it first when
    /// it has expired.
    pub async fn ensure_valid(&self, user_id: &str) -> Res<String> {
        let session = self
            .sessions
            .get(user_id)
            .await
            .ok_or(Error::NotAuthenticated)?;
        if Utc::now() < session.expires_at {
            return Ok(session.access_token);
        }

        let lock = self.refresh_lock(user_id).await;
        let _guard = lock.lock().await;

        // another request may have refreshed while we waited
        let current = self
            .sessions
            .get(user_id)
            .await
            .ok_or(Error::NotAuthenticated)?;
        if Utc::now() < current.expires_at {
            return Ok(current.access_token);
        }

        let credentials = self
            .credentials(&current.tenant)
            .map_err(|_| Error::NotAuthenticated)?;
        let token = match self.tokens.refresh(&credentials, &current.refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                warning!("Token refresh for tenant {} failed: {}", current.tenant, e);
                return Err(Error::NotAuthenticated);
            }
        };

        let refreshed = UserSession {
            expires_at: expiry_from(&token, Utc::now()),
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
            access_token: token.access_token,
            tenant: current.tenant.clone(),
        };

        if self
            .sessions
            .compare_and_swap(user_id, &current, refreshed.clone())
            .await
        {
            Ok(refreshed.access_token)
        } else {
            self.sessions
                .get(user_id)
                .await
                .map(|s| s.access_token)
                .ok_or(Error::NotAuthenticated)
        }
    }

    /// Drops pending states older than the TTL; returns how many were removed.
    pub async fn evict_expired_states(&self) -> usize {
        let now = Utc::now();
        let ttl = self.state_ttl();
        self.pending
            .retain(&move |state: &AuthState| now.signed_duration_since(state.created_at) < ttl)
            .await
    }

    pub fn pending_state_ttl(&self) -> Duration {
        self.settings.state_ttl
    }

    fn state_ttl(&self) -> TimeDelta {
        TimeDelta::from_std(self.settings.state_ttl).unwrap_or(TimeDelta::MAX)
    }

    fn is_state_expired(&self, state: &AuthState, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(state.created_at) >= self.state_ttl()
    }

    fn tenant(&self, identity: &str) -> Res<&Tenant> {
        let identity = identity.trim().to_lowercase();
        self.settings
            .tenants
            .iter()
            .find(|t| t.name == identity)
            .ok_or(Error::UnknownTenant(identity))
    }

    fn credentials(&self, tenant: &str) -> Res<ClientCredentials> {
        self.tenant(tenant)?
            .credentials
            .clone()
            .ok_or_else(|| Error::MissingCredentials(tenant.to_string()))
    }

    async fn refresh_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }
}

/// Absolute expiry for a freshly obtained token, with the safety margin.
pub fn expiry_from(token: &Token, obtained_at: DateTime<Utc>) -> DateTime<Utc> {
    let lifetime = i64::try_from(token.expires_in)
        .unwrap_or(i64::MAX)
        .min(MAX_TOKEN_LIFETIME_SECS)
        .saturating_sub(EXPIRY_MARGIN_SECS)
        .max(0);
    TimeDelta::try_seconds(lifetime)
        .and_then(|delta| obtained_at.checked_add_signed(delta))
        .unwrap_or(obtained_at)
}
