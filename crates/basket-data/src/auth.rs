//! Login, registration and profile calls.

use basket_auth::{AuthError, AuthSession, Credentials, Registration, User};
use basket_commerce::ids::UserId;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::FetchError;

/// Reply to a successful registration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "id")]
    pub user_id: Option<UserId>,
}

impl ApiClient {
    /// Log in and persist the resulting session.
    ///
    /// A 401 here means wrong credentials rather than an expired session.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, FetchError> {
        credentials.validate()?;
        let url = self.endpoint(&["auth", "login"])?;
        let reply = self
            .send_value(self.request(Method::POST, url).json(credentials), "/auth/login")
            .await
            .map_err(|e| match e {
                FetchError::Unauthorized => FetchError::Auth(AuthError::InvalidCredentials),
                other => other,
            })?;

        let user: User =
            serde_json::from_value(reply.clone()).map_err(|e| FetchError::parse("/auth/login", e))?;
        let token = ["token", "accessToken"]
            .iter()
            .find_map(|k| reply.get(*k).and_then(Value::as_str))
            .map(str::to_string);

        let session = AuthSession::authenticated(user, token);
        if let Some(sessions) = self.sessions() {
            sessions.save(&session)?;
        }
        tracing::info!(user = %session.user.email, admin = session.user.is_admin(), "logged in");
        Ok(session)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<Registered, FetchError> {
        registration.validate()?;
        let url = self.endpoint(&["auth", "register"])?;
        let registered: Registered = self.write_json(Method::POST, url, registration).await?;
        tracing::info!(user = %registration.email, "registered");
        Ok(registered)
    }

    /// Fetch the profile of `email`.
    pub async fn profile(&self, email: &str) -> Result<User, FetchError> {
        let url = self.endpoint_with_query(&["auth", "profile"], "email", email)?;
        self.get_json(url).await
    }

    /// Drop the stored session. Returns whether one existed.
    pub fn logout(&self) -> Result<bool, FetchError> {
        match self.sessions() {
            Some(sessions) => Ok(sessions.logout()?),
            None => Ok(false),
        }
    }

    /// The stored session, if any.
    pub fn current_session(&self) -> Result<Option<AuthSession>, FetchError> {
        match self.sessions() {
            Some(sessions) => Ok(sessions.current()?),
            None => Ok(None),
        }
    }
}
