//! Reducer logic for the signed-in session.
//!
//! The reducer is the only writer of the persisted `"user"` record.
//! Credential and form checks happen synchronously; storage runs as an
//! `Effect::Future` whose outcome comes back as an event.

use super::store::USER_KEY;
use crate::error::AuthError;
use crate::types::{Role, User, UserId};
use std::sync::Arc;
use turf_booking_core::{
    effect::Effect, environment::KeyValueStore, reducer::Reducer, smallvec, SmallVec,
};

/// Demo accounts the sign-in form accepts
#[derive(Clone, Debug, Default)]
pub struct CredentialDirectory {
    accounts: Vec<(String, String, User)>,
}

impl CredentialDirectory {
    /// Directory with no accounts
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The player and admin demo accounts (password `password`)
    #[must_use]
    pub fn demo() -> Self {
        Self::empty()
            .with_account(
                "password",
                User {
                    id: UserId::from("1"),
                    name: "John Player".to_string(),
                    email: "player@example.com".to_string(),
                    role: Role::Player,
                    avatar: Some("https://i.pravatar.cc/150?u=player".to_string()),
                },
            )
            .with_account(
                "password",
                User {
                    id: UserId::from("2"),
                    name: "Admin User".to_string(),
                    email: "admin@example.com".to_string(),
                    role: Role::Admin,
                    avatar: Some("https://i.pravatar.cc/150?u=admin".to_string()),
                },
            )
    }

    /// Adds an account signing in with the user's email and `password`
    #[must_use]
    pub fn with_account(mut self, password: &str, user: User) -> Self {
        self.accounts
            .push((user.email.clone(), password.to_string(), user));
        self
    }

    /// The user for an exact email and password match
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for anything else.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.accounts
            .iter()
            .find(|(known_email, known_password, _)| known_email == email && known_password == password)
            .map(|(_, _, user)| user.clone())
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Environment dependencies for the auth reducer
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Where the session is persisted
    pub storage: Arc<dyn KeyValueStore>,
    /// Accounts accepted by sign-in
    pub directory: CredentialDirectory,
}

impl AuthEnvironment {
    /// Creates an environment over `storage` with the demo accounts
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            directory: CredentialDirectory::demo(),
        }
    }
}

/// Session state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    /// Signed-in user
    pub user: Option<User>,
    /// Whether a restore, sign-in or sign-up is in flight
    pub is_loading: bool,
    /// Last failure shown inline (if any)
    pub last_error: Option<AuthError>,
}

impl Default for AuthState {
    /// Loading until the persisted session has been restored
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            last_error: None,
        }
    }
}

/// Actions representing commands and events of the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    // ========== Commands ==========
    /// Command: Load the persisted session at startup
    Restore,

    /// Command: Sign in with a demo account
    SignIn {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// Command: Create an account and sign in
    SignUp {
        /// Display name
        name: String,
        /// Email
        email: String,
        /// Password
        password: String,
        /// Password repeated
        confirm_password: String,
        /// Requested role
        role: Role,
    },

    /// Command: Sign out
    SignOut,

    // ========== Events ==========
    /// Event: Persisted session loaded (`None` when signed out)
    SessionRestored {
        /// Restored user
        user: Option<User>,
    },

    /// Event: User signed in or signed up and was persisted
    SignedIn {
        /// The user
        user: User,
    },

    /// Event: Sign-in or sign-up failed
    SignInFailed {
        /// Why
        error: AuthError,
    },

    /// Event: Session removed
    SignedOut,

    /// Event: Session could not be removed
    SignOutFailed {
        /// Why
        error: AuthError,
    },

    /// Event: Form validation failed
    ValidationFailed {
        /// Why
        error: AuthError,
    },
}

/// Reducer for the session
#[derive(Clone, Debug, Default)]
pub struct AuthReducer;

impl AuthReducer {
    /// Creates a new `AuthReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `SignIn` command's form
    fn validate_sign_in(email: &str, password: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        Ok(())
    }

    /// Validates a `SignUp` command's form
    fn validate_sign_up(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if name.trim().is_empty()
            || email.trim().is_empty()
            || password.is_empty()
            || confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut AuthState, action: &AuthAction) {
        match action {
            AuthAction::SessionRestored { user } => {
                state.user.clone_from(user);
                state.is_loading = false;
            },
            AuthAction::SignedIn { user } => {
                state.user = Some(user.clone());
                state.is_loading = false;
                state.last_error = None;
            },
            AuthAction::SignInFailed { error } => {
                state.is_loading = false;
                state.last_error = Some(error.clone());
            },
            AuthAction::SignedOut => {
                state.user = None;
                state.last_error = None;
            },
            AuthAction::SignOutFailed { error } | AuthAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            // Commands are not applied to state
            AuthAction::Restore
            | AuthAction::SignIn { .. }
            | AuthAction::SignUp { .. }
            | AuthAction::SignOut => {},
        }
    }

    /// Persists `user`, then reports the outcome
    fn persist(user: User, env: &AuthEnvironment) -> Effect<AuthAction> {
        let storage = Arc::clone(&env.storage);
        Effect::Future(Box::pin(async move {
            let json = match serde_json::to_string(&user) {
                Ok(json) => json,
                Err(e) => {
                    return Some(AuthAction::SignInFailed {
                        error: AuthError::Storage(e.to_string()),
                    });
                },
            };

            match storage.set(USER_KEY, json).await {
                Ok(()) => Some(AuthAction::SignedIn { user }),
                Err(error) => {
                    tracing::error!(%error, "Failed to persist session");
                    Some(AuthAction::SignInFailed {
                        error: error.into(),
                    })
                },
            }
        }))
    }

    fn restore(env: &AuthEnvironment) -> Effect<AuthAction> {
        let storage = Arc::clone(&env.storage);
        Effect::Future(Box::pin(async move {
            let user = match storage.get(USER_KEY).await {
                Ok(Some(json)) => serde_json::from_str::<User>(&json)
                    .map_err(|error| {
                        tracing::warn!(%error, "Ignoring unreadable stored session");
                    })
                    .ok(),
                Ok(None) => None,
                Err(error) => {
                    tracing::warn!(%error, "Failed to load stored session");
                    None
                },
            };
            Some(AuthAction::SessionRestored { user })
        }))
    }

    fn sign_out(env: &AuthEnvironment) -> Effect<AuthAction> {
        let storage = Arc::clone(&env.storage);
        Effect::Future(Box::pin(async move {
            match storage.remove(USER_KEY).await {
                Ok(()) => Some(AuthAction::SignedOut),
                Err(error) => {
                    tracing::error!(%error, "Failed to sign out");
                    Some(AuthAction::SignOutFailed {
                        error: error.into(),
                    })
                },
            }
        }))
    }

    fn fail_validation(state: &mut AuthState, error: AuthError) -> SmallVec<[Effect<AuthAction>; 4]> {
        tracing::debug!(%error, "Auth form rejected");
        Self::apply_event(state, &AuthAction::ValidationFailed { error });
        SmallVec::new()
    }
}

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            AuthAction::Restore => {
                state.is_loading = true;
                smallvec![Self::restore(env)]
            },

            AuthAction::SignIn { email, password } => {
                if let Err(error) = Self::validate_sign_in(&email, &password) {
                    return Self::fail_validation(state, error);
                }

                match env.directory.authenticate(email.trim(), &password) {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, role = ?user.role, "Signing in");
                        state.is_loading = true;
                        state.last_error = None;
                        smallvec![Self::persist(user, env)]
                    },
                    Err(error) => {
                        tracing::warn!(%email, "Sign-in rejected");
                        Self::apply_event(state, &AuthAction::SignInFailed { error });
                        SmallVec::new()
                    },
                }
            },

            AuthAction::SignUp {
                name,
                email,
                password,
                confirm_password,
                role,
            } => {
                if let Err(error) =
                    Self::validate_sign_up(&name, &email, &password, &confirm_password)
                {
                    return Self::fail_validation(state, error);
                }

                let email = email.trim().to_string();
                let user = User {
                    id: UserId::generate(),
                    name: name.trim().to_string(),
                    avatar: Some(format!("https://i.pravatar.cc/150?u={email}")),
                    email,
                    role,
                };
                tracing::info!(user_id = %user.id, role = ?user.role, "Signing up");
                state.is_loading = true;
                state.last_error = None;
                smallvec![Self::persist(user, env)]
            },

            AuthAction::SignOut => smallvec![Self::sign_out(env)],

            // ========== Events ==========
            AuthAction::SessionRestored { .. }
            | AuthAction::SignedIn { .. }
            | AuthAction::SignInFailed { .. }
            | AuthAction::SignedOut
            | AuthAction::SignOutFailed { .. }
            | AuthAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}
