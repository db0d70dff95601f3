//! Sessions and the authentication service.
//!
//! A [`SessionProvider`] issues sessions (sign up / sign in), restores the
//! stored one, signs out, and announces every change on a broadcast channel.
//! Listeners hold an [`AuthSubscription`]; dropping it, or calling
//! [`AuthSubscription::unsubscribe`], detaches them.

mod error;
mod flow;
mod gotrue;
mod memory;
mod storage;

pub use error::AuthError;
pub use flow::{sign_in, sign_up_or_sign_in, AuthNotice, NoticeKind};
pub use gotrue::GoTrueAuth;
pub use memory::MemoryAuth;
pub use storage::{SessionStorage, StorageError};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Identity;

/// Seconds before expiry at which a session is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 10;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as a unix timestamp (seconds)
    pub expires_at: i64,
    pub user: Identity,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now + EXPIRY_MARGIN_SECS >= self.expires_at
    }
}

/// Outcome of a successful sign up.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUp {
    /// The account is active and a session was issued
    SignedIn(Session),
    /// The account exists but the email must be confirmed first
    ConfirmationRequired(Identity),
}

/// A change of the authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    TokenRefreshed(Identity),
    SignedOut,
}

impl AuthEvent {
    /// Identity after the change; `None` once signed out.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthEvent::SignedIn(id) | AuthEvent::TokenRefreshed(id) => Some(id),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Sending side of the auth state channel.
#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }
}

impl AuthEvents {
    pub fn emit(&self, event: AuthEvent) {
        tracing::debug!("auth event: {:?}", event);
        // no listeners is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: Some(self.sender.subscribe()),
        }
    }
}

/// Receiving side of the auth state channel.
pub struct AuthSubscription {
    receiver: Option<broadcast::Receiver<AuthEvent>>,
}

impl AuthSubscription {
    /// Next pending event, without waiting.
    ///
    /// Events dropped because the listener fell behind are skipped.
    pub fn try_next(&mut self) -> Option<AuthEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("auth listener skipped {} event(s)", n);
                }
                Err(_) => return None,
            }
        }
    }

    /// Waits for the next event. Returns `None` once unsubscribed or when
    /// the provider is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("auth listener skipped {} event(s)", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}

/// The authentication service.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, refreshed if it expired. `None` when nobody is
    /// signed in or the session can no longer be refreshed.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Subscribes to identity changes.
    fn on_auth_state_change(&self) -> AuthSubscription;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
