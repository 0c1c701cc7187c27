//! Route guard: where a user may be, given the session.

use crate::types::User;

/// Top-level app section a screen belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// Sign-in and sign-up
    Auth,
    /// Player tabs (home, bookings, find players, profile)
    Tabs,
    /// Admin dashboard
    Admin,
    /// Anything else (venue and booking screens)
    Other,
}

/// Redirect target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Sign-in screen
    SignIn,
    /// Player tabs
    Tabs,
    /// Admin dashboard
    AdminDashboard,
}

/// Where to redirect, or `None` to stay in `section`
///
/// - Signed out outside the auth section: sign in.
/// - Signed in inside the auth section: the user's home.
/// - Non-admins in the admin section: the tabs.
/// - Admins anywhere outside admin: the dashboard.
#[must_use]
pub fn route_for(user: Option<&User>, section: Section) -> Option<Route> {
    match (user, section) {
        (None, Section::Auth) => None,
        (None, _) => Some(Route::SignIn),
        (Some(user), Section::Admin) if !user.is_admin() => Some(Route::Tabs),
        (Some(user), Section::Admin) if user.is_admin() => None,
        (Some(user), _) if user.is_admin() => Some(Route::AdminDashboard),
        (Some(_), Section::Auth) => Some(Route::Tabs),
        (Some(_), _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, UserId};

    fn user(role: Role) -> User {
        User {
            id: UserId::from("1"),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
            avatar: None,
        }
    }

    #[test]
    fn signed_out_users_are_sent_to_sign_in() {
        assert_eq!(route_for(None, Section::Tabs), Some(Route::SignIn));
        assert_eq!(route_for(None, Section::Other), Some(Route::SignIn));
        assert_eq!(route_for(None, Section::Auth), None);
    }

    #[test]
    fn players_stay_out_of_admin_and_auth() {
        let player = user(Role::Player);
        assert_eq!(route_for(Some(&player), Section::Admin), Some(Route::Tabs));
        assert_eq!(route_for(Some(&player), Section::Auth), Some(Route::Tabs));
        assert_eq!(route_for(Some(&player), Section::Tabs), None);
        assert_eq!(route_for(Some(&player), Section::Other), None);
    }

    #[test]
    fn admins_are_kept_on_the_dashboard() {
        let admin = user(Role::Admin);
        assert_eq!(route_for(Some(&admin), Section::Admin), None);
        assert_eq!(route_for(Some(&admin), Section::Tabs), Some(Route::AdminDashboard));
        assert_eq!(route_for(Some(&admin), Section::Auth), Some(Route::AdminDashboard));
    }
}
