//! In-process [`SessionProvider`] holding accounts in memory.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{AuthError, AuthEvent, AuthEvents, AuthSubscription, Session, SessionProvider, SignUp};
use crate::models::Identity;
use crate::validation::{validate_credentials, validate_sign_in};

struct Account {
    id: Uuid,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    offline: bool,
    require_confirmation: bool,
}

#[derive(Default)]
pub struct MemoryAuth {
    state: Mutex<State>,
    events: AuthEvents,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with one account already signed in.
    pub fn signed_in(email: &str, password: &str) -> (Self, Identity) {
        let auth = Self::new();
        let session = {
            let mut state = auth.lock();
            let id = Uuid::new_v4();
            state.accounts.insert(
                email.to_string(),
                Account {
                    id,
                    password: password.to_string(),
                },
            );
            let session = issue(Identity::new(id, email));
            state.session = Some(session.clone());
            session
        };
        (auth, session.user)
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// New accounts must confirm their email before signing in.
    pub fn require_confirmation(&self, required: bool) {
        self.lock().require_confirmation = required;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_online(state: &State) -> Result<(), AuthError> {
        if state.offline {
            return Err(AuthError::Network("offline".to_string()));
        }
        Ok(())
    }
}

fn issue(user: Identity) -> Session {
    Session {
        access_token: format!("access-{}", Uuid::new_v4()),
        refresh_token: format!("refresh-{}", Uuid::new_v4()),
        expires_at: Utc::now().timestamp() + 3600,
        user,
    }
}

#[async_trait]
impl SessionProvider for MemoryAuth {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.lock().session.clone())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.events.subscribe()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AuthError> {
        let email = validate_credentials(email, password)?;
        let outcome = {
            let mut state = self.lock();
            Self::check_online(&state)?;
            if state.accounts.contains_key(&email) {
                return Err(AuthError::AlreadyRegistered);
            }

            let id = Uuid::new_v4();
            state.accounts.insert(
                email.clone(),
                Account {
                    id,
                    password: password.to_string(),
                },
            );

            let user = Identity::new(id, email);
            if state.require_confirmation {
                SignUp::ConfirmationRequired(user)
            } else {
                let session = issue(user);
                state.session = Some(session.clone());
                SignUp::SignedIn(session)
            }
        };

        if let SignUp::SignedIn(session) = &outcome {
            self.events.emit(AuthEvent::SignedIn(session.user.clone()));
        }
        Ok(outcome)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let email = validate_sign_in(email, password)?;
        let session = {
            let mut state = self.lock();
            Self::check_online(&state)?;
            let id = match state.accounts.get(&email) {
                Some(account) if account.password == password => account.id,
                _ => return Err(AuthError::InvalidCredentials),
            };
            let session = issue(Identity::new(id, email));
            state.session = Some(session.clone());
            session
        };

        self.events.emit(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.lock().session = None;
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }
}
