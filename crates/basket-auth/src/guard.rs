//! Access checks.
//!
//! Admin access is decided by the role the backend reported at login and
//! nothing else.

use crate::session::AuthSession;
use crate::user::{Role, User};
use crate::AuthError;

/// The logged-in user, or [`AuthError::NotLoggedIn`].
pub fn require_login(session: Option<&AuthSession>) -> Result<&User, AuthError> {
    session.map(|s| &s.user).ok_or(AuthError::NotLoggedIn)
}

/// The logged-in user if they hold the admin role.
pub fn require_admin(session: Option<&AuthSession>) -> Result<&User, AuthError> {
    let user = require_login(session)?;
    if user.role == Role::Admin {
        Ok(user)
    } else {
        tracing::warn!(user = %user.email, role = %user.role, "admin access denied");
        Err(AuthError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_commerce::ids::UserId;

    fn session(role: Role) -> AuthSession {
        AuthSession::authenticated(
            User {
                id: UserId::new("7"),
                name: "Meera".to_string(),
                email: "meera@example.com".to_string(),
                phone: None,
                role,
            },
            Some("token".to_string()),
        )
    }

    #[test]
    fn test_require_login() {
        assert!(matches!(require_login(None), Err(AuthError::NotLoggedIn)));
        let s = session(Role::Customer);
        assert_eq!(require_login(Some(&s)).unwrap().name, "Meera");
    }

    #[test]
    fn test_admin_by_role_only() {
        let admin = session(Role::Admin);
        assert!(require_admin(Some(&admin)).is_ok());

        // A valid session with a token is not enough.
        let customer = session(Role::Customer);
        let err = require_admin(Some(&customer)).unwrap_err();
        assert!(err.is_permission_error());

        assert!(require_admin(None).unwrap_err().is_auth_failure());
    }
}
