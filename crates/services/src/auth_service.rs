use std::sync::Arc;

use quest_core::model::{
    Account, Credentials, LoginDraft, RegistrationDraft, ServerUser, User, UserDefaults,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::session_client::SessionClient;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const PROFILE_PATH: &str = "/api/auth/me";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: Option<ServerUser>,
}

/// Login, registration, and profile loading on top of a `SessionClient`.
#[derive(Clone, Debug)]
pub struct AuthService {
    session: Arc<SessionClient>,
    defaults: UserDefaults,
}

impl AuthService {
    #[must_use]
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self {
            session,
            defaults: UserDefaults::default(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionClient> {
        &self.session
    }

    /// Sign in and load the profile.
    ///
    /// Once the request has been issued, any failure clears the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credentials` for invalid input, `AuthError::MissingToken`
    /// if the response has no token, or `AuthError::Api` for request failures.
    pub async fn login(&self, draft: LoginDraft) -> Result<Account, AuthError> {
        let credentials = draft.validate()?;
        debug!(email = credentials.email(), "logging in");

        match self.open_session(&credentials).await {
            Ok(account) => {
                info!(user_id = %account.user().id, "login succeeded");
                Ok(account)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.session.clear_session().await;
                Err(err)
            }
        }
    }

    async fn open_session(&self, credentials: &Credentials) -> Result<Account, AuthError> {
        let response: Envelope<TokenData> =
            self.session.post_json(LOGIN_PATH, credentials).await?;
        let token = extract_token(response).ok_or(AuthError::MissingToken)?;
        self.session.store_session(token).await;
        let user = self.fetch_profile().await?;
        Ok(Account::authenticated(user))
    }

    /// Create an account.
    ///
    /// When the API returns a token the session is stored and the profile loaded;
    /// otherwise a demo account carrying the submitted name and email is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credentials` for invalid input or `AuthError::Api` for
    /// request failures.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<Account, AuthError> {
        let registration = draft.validate()?;
        debug!(email = registration.email(), "registering");

        let response: Envelope<TokenData> =
            self.session.post_json(REGISTER_PATH, &registration).await?;

        match extract_token(response) {
            Some(token) => {
                self.session.store_session(token).await;
                let user = self.fetch_profile().await?;
                info!(user_id = %user.id, "registration succeeded");
                Ok(Account::authenticated(user))
            }
            None => {
                info!("registration returned no token; continuing in demo mode");
                let mut user = User::anonymous();
                user.name = registration.name().to_owned();
                user.email = registration.email().to_owned();
                Ok(Account::demo_with(user))
            }
        }
    }

    /// Load the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the request fails.
    pub async fn fetch_profile(&self) -> Result<User, AuthError> {
        let response: Envelope<ProfileData> = self.session.get_json(PROFILE_PATH).await?;
        let server = response
            .data
            .and_then(|data| data.user)
            .unwrap_or_default();
        Ok(User::from_server(&server, &self.defaults))
    }

    /// Forget the session and fall back to demo data.
    pub async fn logout(&self) -> Account {
        self.session.clear_session().await;
        info!("logged out");
        Account::demo()
    }

    /// Restore a persisted session at startup.
    ///
    /// With a token, the profile is loaded; if that fails the app continues in
    /// demo mode and the token is kept. Without a token, demo mode.
    pub async fn resume(&self) -> Account {
        self.session.restore_session().await;
        if !self.session.has_session() {
            return Account::demo();
        }

        match self.fetch_profile().await {
            Ok(user) => Account::authenticated(user),
            Err(AuthError::Api(err)) if err.is_unauthorized() => {
                warn!("stored session was rejected; using demo data");
                Account::demo()
            }
            Err(err) => {
                warn!(error = %err, "could not load profile; using demo data");
                Account::demo()
            }
        }
    }
}

fn extract_token(response: Envelope<TokenData>) -> Option<String> {
    response
        .data
        .and_then(|data| data.access_token)
        .filter(|token| !token.is_empty())
}
