//! [`SessionProvider`] backed by the project's hosted auth service.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{
    AuthError, AuthEvent, AuthEvents, AuthSubscription, Session, SessionProvider, SessionStorage,
    SignUp,
};
use crate::client::SupabaseClient;
use crate::models::Identity;
use crate::validation::{validate_credentials, validate_sign_in};

const AUTH_PATH: &str = "auth/v1";
const DEFAULT_EXPIRES_IN: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or(now + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Sign up answers with a session when accounts are confirmed automatically,
/// and with the bare user when an email confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(Identity),
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    error_code: Option<String>,
    error: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

pub struct GoTrueAuth {
    client: Arc<SupabaseClient>,
    storage: SessionStorage,
    events: AuthEvents,
}

impl GoTrueAuth {
    pub fn new(client: Arc<SupabaseClient>, storage: SessionStorage) -> Self {
        Self {
            client,
            storage,
            events: AuthEvents::default(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.client.endpoint(&format!("{}/{}", AUTH_PATH, path))
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: Value) -> Result<T, AuthError> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        parse_response(response).await
    }

    /// Stores the session and makes it the one used for requests.
    fn adopt(&self, session: &Session) -> Result<(), AuthError> {
        self.storage.save(session)?;
        self.client
            .set_access_token(Some(session.access_token.clone()));
        Ok(())
    }

    fn forget(&self) -> Result<(), AuthError> {
        self.client.set_access_token(None);
        self.storage.clear()?;
        Ok(())
    }

    async fn refresh(&self, stale: &Session) -> Result<Option<Session>, AuthError> {
        let url = self.url("token?grant_type=refresh_token");
        let result: Result<TokenResponse, AuthError> = self
            .post(&url, json!({ "refresh_token": stale.refresh_token }))
            .await;

        match result {
            Ok(tokens) => {
                let session = tokens.into_session(Utc::now().timestamp());
                self.adopt(&session)?;
                tracing::info!("Session refreshed for {}", session.user.email);
                self.events
                    .emit(AuthEvent::TokenRefreshed(session.user.clone()));
                Ok(Some(session))
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("Session refresh failed, keeping stored session: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Stored session could not be refreshed: {}", e);
                self.forget()?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SessionProvider for GoTrueAuth {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        match self.storage.load()? {
            None => {
                self.client.set_access_token(None);
                Ok(None)
            }
            Some(session) if session.is_expired() => self.refresh(&session).await,
            Some(session) => {
                self.client
                    .set_access_token(Some(session.access_token.clone()));
                Ok(Some(session))
            }
        }
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.events.subscribe()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AuthError> {
        let email = validate_credentials(email, password)?;
        let url = self.url("signup");
        let response: SignUpResponse = self
            .post(&url, json!({ "email": email, "password": password }))
            .await?;

        match response {
            SignUpResponse::Session(tokens) => {
                let session = tokens.into_session(Utc::now().timestamp());
                self.adopt(&session)?;
                tracing::info!("Signed up and signed in as {}", session.user.email);
                self.events.emit(AuthEvent::SignedIn(session.user.clone()));
                Ok(SignUp::SignedIn(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!("Signed up {}, confirmation pending", user.email);
                Ok(SignUp::ConfirmationRequired(user))
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let email = validate_sign_in(email, password)?;
        let url = self.url("token?grant_type=password");
        let tokens: TokenResponse = self
            .post(&url, json!({ "email": email, "password": password }))
            .await?;

        let session = tokens.into_session(Utc::now().timestamp());
        self.adopt(&session)?;
        tracing::info!("Signed in as {}", session.user.email);
        self.events.emit(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.client.access_token().is_some() {
            let url = self.url("logout");
            let result = self
                .client
                .request(Method::POST, &url)
                .send()
                .await
                .map_err(|e| AuthError::Network(e.to_string()));
            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!("Remote sign out answered {}", response.status());
                }
                Err(e) => tracing::warn!("Remote sign out failed: {}", e),
                Ok(_) => {}
            }
        }

        // The local session goes away whatever the service said.
        self.forget()?;
        tracing::info!("Signed out");
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    if status.is_success() {
        serde_json::from_str(&text).map_err(|e| AuthError::Rejected {
            status: status.as_u16(),
            code: None,
            message: format!("Unexpected response from auth service: {}", e),
        })
    } else {
        Err(classify(status.as_u16(), &text))
    }
}

/// Maps an error answer of the auth service to a typed error, using the
/// machine-readable code fields.
fn classify(status: u16, text: &str) -> AuthError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let code = body.error_code.or(body.error);

    match code.as_deref() {
        Some("user_already_exists") | Some("email_exists") => AuthError::AlreadyRegistered,
        Some("invalid_credentials") | Some("invalid_grant") => AuthError::InvalidCredentials,
        _ => {
            let message = body
                .msg
                .or(body.message)
                .or(body.error_description)
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        format!("Auth service answered {}", status)
                    } else {
                        text.to_string()
                    }
                });
            AuthError::Rejected {
                status,
                code,
                message,
            }
        }
    }
}
