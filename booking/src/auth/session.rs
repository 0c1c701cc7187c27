//! Session context: the app-wide handle on the signed-in user.

use super::guard::{self, Route, Section};
use super::reducer::{AuthAction, AuthEnvironment, AuthReducer, AuthState};
use crate::error::AuthError;
use crate::types::{Role, User};
use std::sync::Arc;
use tokio::sync::watch;
use turf_booking_core::environment::KeyValueStore;
use turf_booking_runtime::Store;

type AuthStore = Store<AuthState, AuthAction, AuthEnvironment, AuthReducer>;

/// Sign-up form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpForm {
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Password
    pub password: String,
    /// Password repeated
    pub confirm_password: String,
    /// Requested role
    pub role: Role,
}

/// Owns the auth store and publishes the current user to observers
#[derive(Clone)]
pub struct SessionContext {
    store: AuthStore,
    user_tx: Arc<watch::Sender<Option<User>>>,
}

impl SessionContext {
    /// Creates a session over `env`; call [`restore`](Self::restore) next
    #[must_use]
    pub fn new(env: AuthEnvironment) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            store: Store::new(AuthState::default(), AuthReducer::new(), env),
            user_tx: Arc::new(user_tx),
        }
    }

    /// Creates a session persisting to `storage` with the demo accounts
    #[must_use]
    pub fn with_storage(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(AuthEnvironment::new(storage))
    }

    /// Loads the persisted user, if any
    ///
    /// Unreadable sessions are treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the store is shutting down.
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        self.dispatch(AuthAction::Restore).await?;
        Ok(self.current_user().await)
    }

    /// Signs in with an email and password
    ///
    /// # Errors
    ///
    /// Returns the validation, credential or storage failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.dispatch(AuthAction::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
        self.signed_in_user().await
    }

    /// Creates an account and signs in
    ///
    /// # Errors
    ///
    /// Returns the validation or storage failure.
    pub async fn sign_up(&self, form: SignUpForm) -> Result<User, AuthError> {
        self.dispatch(AuthAction::SignUp {
            name: form.name,
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
            role: form.role,
        })
        .await?;
        self.signed_in_user().await
    }

    /// Signs out and forgets the persisted user
    ///
    /// # Errors
    ///
    /// Returns the storage failure; the user stays signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.dispatch(AuthAction::SignOut).await?;
        match self.current_user().await {
            None => Ok(()),
            Some(_) => Err(self
                .last_error()
                .await
                .unwrap_or_else(|| AuthError::Storage("sign-out did not complete".to_string()))),
        }
    }

    /// The signed-in user
    pub async fn current_user(&self) -> Option<User> {
        self.store.state(|state| state.user.clone()).await
    }

    /// Whether a restore or sign-in is still running
    pub async fn is_loading(&self) -> bool {
        self.store.state(|state| state.is_loading).await
    }

    /// The last failure shown on the auth forms
    pub async fn last_error(&self) -> Option<AuthError> {
        self.store.state(|state| state.last_error.clone()).await
    }

    /// Watches the signed-in user
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Redirect for a screen in `section` given the current session
    pub async fn route_for(&self, section: Section) -> Option<Route> {
        let user = self.current_user().await;
        guard::route_for(user.as_ref(), section)
    }

    /// Sends `action`, waits for its effects and publishes the resulting user
    async fn dispatch(&self, action: AuthAction) -> Result<(), AuthError> {
        let mut handle = self
            .store
            .send(action)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        handle.wait().await;

        let user = self.current_user().await;
        self.user_tx.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
        Ok(())
    }

    async fn signed_in_user(&self) -> Result<User, AuthError> {
        let state = self.store.state(AuthState::clone).await;
        match (state.last_error, state.user) {
            (Some(error), _) => Err(error),
            (None, Some(user)) => Ok(user),
            (None, None) => Err(AuthError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use super::super::store::USER_KEY;
    use turf_booking_testing::InMemoryKeyValueStore;

    #[tokio::test]
    async fn sign_in_persists_and_publishes() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let session = SessionContext::with_storage(storage.clone());
        let mut users = session.subscribe();

        let user = session.sign_in("player@example.com", "password").await.unwrap();

        assert_eq!(user.name, "John Player");
        assert!(storage.peek(USER_KEY).is_some());
        assert!(users.has_changed().unwrap());
        assert_eq!(users.borrow_and_update().as_ref(), Some(&user));
    }

    #[tokio::test]
    async fn restore_ignores_corrupt_record() {
        let storage = Arc::new(InMemoryKeyValueStore::with_entry(USER_KEY, "{not json"));
        let session = SessionContext::with_storage(storage);

        assert!(session.is_loading().await);
        assert_eq!(session.restore().await.unwrap(), None);
        assert!(!session.is_loading().await);
    }
}
