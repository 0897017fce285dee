//! # User Operations
//!
//! Authentication and user-directory mutations with the roster guards:
//! the directory never empties, nobody deletes themself, and the
//! bootstrap admin keeps the Settings page.

use chrono::Utc;
use tracing::info;

use rasid_core::types::{Page, User, ADMIN_USER_ID};
use rasid_core::validation::{ensure_user_deletable, validate_password, validate_user};
use rasid_core::{CoreError, ValidationError};

use crate::error::AppResult;
use crate::notify::Notice;
use crate::session::Session;

impl Session {
    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Logs in with an exact name + password match.
    ///
    /// Passwords are compared in plaintext - a known weakness of the
    /// stored roster format, retained deliberately (see DESIGN.md).
    /// Inactive accounts are rejected distinctly from bad credentials.
    pub fn login(&self, name: &str, password: &str) -> AppResult<User> {
        let user = self
            .with_state(|s| {
                s.users
                    .iter()
                    .find(|u| u.name == name && u.password.as_deref().unwrap_or("") == password)
                    .cloned()
            })
            .ok_or(CoreError::InvalidCredentials)?;

        if !user.is_active() {
            return Err(CoreError::InactiveAccount {
                name: user.name.clone(),
            }
            .into());
        }

        info!(user = %user.name, "Login");
        self.set_current_user(Some(user.clone()));
        self.notifier
            .notify(Notice::success(format!("Welcome back, {}", user.name)));
        Ok(user)
    }

    pub fn logout(&self) {
        if let Some(user) = self.current_user() {
            info!(user = %user.name, "Logout");
        }
        self.set_current_user(None);
    }

    // -------------------------------------------------------------------------
    // User Directory
    // -------------------------------------------------------------------------

    /// Creates or updates a user account.
    ///
    /// ## Rules
    /// - an empty id means "create": a time-derived `u<millis>` id is
    ///   assigned, and a password is mandatory
    /// - a supplied new password must pass the length rule
    /// - the bootstrap admin's Settings permission is pinned true
    /// - updating the authenticated account refreshes the session user
    pub async fn save_user(&self, mut user: User, new_password: Option<&str>) -> AppResult<User> {
        validate_user(&user).map_err(CoreError::from)?;

        let is_new = user.id.is_empty();
        if is_new {
            match new_password {
                Some(password) => {
                    validate_password(password).map_err(CoreError::from)?;
                    user.password = Some(password.to_string());
                }
                None => {
                    return Err(CoreError::from(ValidationError::Required {
                        field: "password".to_string(),
                    })
                    .into())
                }
            }
            user.id = format!("u{}", Utc::now().timestamp_millis());
        } else if let Some(password) = new_password {
            validate_password(password).map_err(CoreError::from)?;
            user.password = Some(password.to_string());
        }

        if user.id == ADMIN_USER_ID {
            user.permissions.insert(Page::Settings, true);
        }

        let mut roster = self.users();
        if is_new {
            roster.push(user.clone());
        } else {
            let existing = roster
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| CoreError::UserNotFound(user.id.clone()))?;
            *existing = user.clone();
        }

        self.save_users(roster).await?;

        if self.current_user().is_some_and(|current| current.id == user.id) {
            self.set_current_user(Some(user.clone()));
        }

        self.notifier.notify(Notice::success(if is_new {
            format!("User \"{}\" added", user.name)
        } else {
            format!("User \"{}\" updated", user.name)
        }));

        Ok(user)
    }

    /// Removes a user account, guarded against emptying the roster and
    /// against self-deletion.
    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        let roster = self.users();
        let current_id = self.current_user().map(|u| u.id);

        ensure_user_deletable(&roster, current_id.as_deref(), user_id)?;

        let remaining = roster.into_iter().filter(|u| u.id != user_id).collect();
        self.save_users(remaining).await?;
        self.notifier.notify(Notice::success("User deleted"));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::test_session;
    use rasid_core::types::UserStatus;
    use std::collections::HashMap;

    fn new_user(name: &str) -> User {
        User {
            id: String::new(),
            name: name.to_string(),
            password: None,
            status: UserStatus::Active,
            permissions: HashMap::new(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_login_paths() {
        let (session, _) = test_session().await;

        // wrong password
        let err = session.login("admin", "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);

        // seeded credentials
        let user = session.login("admin", "admin").unwrap();
        assert_eq!(user.id, ADMIN_USER_ID);
        assert!(session.current_user().is_some());

        session.logout();
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_inactive_account_rejected_distinctly() {
        let (session, _) = test_session().await;

        let mut clerk = new_user("clerk");
        clerk.status = UserStatus::Inactive;
        session.save_user(clerk, Some("secret1")).await.unwrap();

        let err = session.login("clerk", "secret1").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);
        assert!(err.message.contains("inactive"));
    }

    #[tokio::test]
    async fn test_new_user_requires_valid_password() {
        let (session, _) = test_session().await;

        assert!(session.save_user(new_user("a"), None).await.is_err());
        assert!(session.save_user(new_user("b"), Some("abc")).await.is_err());

        let saved = session.save_user(new_user("c"), Some("abcd")).await.unwrap();
        assert!(saved.id.starts_with('u'));
        assert_eq!(session.users().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_settings_permission_is_pinned() {
        let (session, _) = test_session().await;

        let mut admin = session.users()[0].clone();
        admin.permissions.insert(Page::Settings, false);

        let saved = session.save_user(admin, None).await.unwrap();
        assert_eq!(saved.permissions.get(&Page::Settings), Some(&true));
    }

    #[tokio::test]
    async fn test_sole_user_cannot_be_deleted() {
        let (session, _) = test_session().await;
        let err = session.delete_user(ADMIN_USER_ID).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(session.users().len(), 1);
    }

    #[tokio::test]
    async fn test_self_deletion_rejected() {
        let (session, _) = test_session().await;
        session.save_user(new_user("clerk"), Some("secret1")).await.unwrap();

        session.login("admin", "admin").unwrap();
        let err = session.delete_user(ADMIN_USER_ID).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);

        // deleting the other account is fine
        let clerk_id = session
            .users()
            .iter()
            .find(|u| u.name == "clerk")
            .unwrap()
            .id
            .clone();
        session.delete_user(&clerk_id).await.unwrap();
        assert_eq!(session.users().len(), 1);
    }

    #[tokio::test]
    async fn test_self_update_refreshes_session_user() {
        let (session, _) = test_session().await;
        session.login("admin", "admin").unwrap();

        let mut admin = session.users()[0].clone();
        admin.name = "root".to_string();
        session.save_user(admin, None).await.unwrap();

        assert_eq!(session.current_user().unwrap().name, "root");
    }
}
