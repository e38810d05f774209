//! User accounts and the approval workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, UserId};

use crate::{MIN_PASSWORD_LEN, Role};

/// A user account.
///
/// # Invariants
/// - Email is unique across accounts.
/// - Accounts start inactive and cannot authenticate until an admin approves
///   them.
/// - The bootstrap admin account (identified by the configured email) cannot
///   be modified or deleted through the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated registration input. The password arrives in plaintext and is
/// hashed by the caller before the account is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(DomainError::validation(
                "name, email and password are required",
            ));
        }
        Ok(())
    }

    /// Build the pending (inactive) account from this registration.
    pub fn into_user(
        self,
        id: UserId,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<User, DomainError> {
        self.validate()?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            is_active: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Admin approval/update of an account: activation flag plus an optional
/// role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    pub is_active: bool,
    pub role: Option<Role>,
}

impl Approval {
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        user.is_active = self.is_active;
        if let Some(role) = self.role {
            user.role = role;
        }
        user.updated_at = now;
    }
}

/// Validate a newly chosen password (profile change-password flow).
pub fn validate_new_password(password: &str) -> Result<(), DomainError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "new password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password: "hunter22".to_string(),
            role: Role::Staff,
        }
    }

    #[test]
    fn registration_requires_all_fields() {
        let mut r = registration();
        r.email = String::new();
        assert!(r.validate().is_err());
    }

    #[test]
    fn new_accounts_start_inactive() {
        let user = registration()
            .into_user(UserId::new(), "hash".to_string(), Utc::now())
            .expect("valid registration");
        assert!(!user.is_active);
        assert_eq!(user.role, Role::Staff);
    }

    #[test]
    fn approval_sets_active_and_optionally_role() {
        let now = Utc::now();
        let mut user = registration()
            .into_user(UserId::new(), "hash".to_string(), now)
            .expect("valid registration");

        Approval {
            is_active: true,
            role: Some(Role::Admin),
        }
        .apply(&mut user, now);

        assert!(user.is_active);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password("longenough").is_ok());
    }
}
