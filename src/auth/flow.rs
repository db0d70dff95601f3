//! Sign-up and sign-in as the user sees them: one attempt, one notice.

use serde::Serialize;
use std::fmt;

use super::{AuthError, SessionProvider};

pub const ACCOUNT_CREATED: &str =
    "Compte créé avec succès! Vous pouvez maintenant vous connecter.";
pub const SIGNED_IN: &str = "Connexion réussie!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Message shown after an authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl AuthNotice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

impl fmt::Display for AuthNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Registers the account; when the email is already registered, signs in
/// with the same credentials instead.
pub async fn sign_up_or_sign_in(
    provider: &dyn SessionProvider,
    email: &str,
    password: &str,
) -> AuthNotice {
    match provider.sign_up(email, password).await {
        Ok(_) => AuthNotice::success(ACCOUNT_CREATED),
        Err(AuthError::AlreadyRegistered) => {
            tracing::info!("{} already registered, signing in instead", email.trim());
            match provider.sign_in_with_password(email, password).await {
                Ok(_) => AuthNotice::success(SIGNED_IN),
                Err(e) => AuthNotice::failure(format!("Erreur: {}", e)),
            }
        }
        Err(e) => AuthNotice::failure(format!("Erreur: {}", e)),
    }
}

pub async fn sign_in(provider: &dyn SessionProvider, email: &str, password: &str) -> AuthNotice {
    match provider.sign_in_with_password(email, password).await {
        Ok(_) => AuthNotice::success(SIGNED_IN),
        Err(e) => AuthNotice::failure(e.to_string()),
    }
}
