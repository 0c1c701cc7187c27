//! Authentication: demo sign-in, local sign-up, a persisted session and the
//! role-based route guard.

pub mod guard;
pub mod reducer;
pub mod session;
pub mod store;

pub use guard::{route_for, Route, Section};
pub use reducer::{AuthAction, AuthEnvironment, AuthReducer, AuthState, CredentialDirectory};
pub use session::{SessionContext, SignUpForm};
pub use store::{FileKeyValueStore, USER_KEY};
