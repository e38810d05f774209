use stockpile_auth::Role;
use stockpile_core::UserId;

/// Authenticated-user context for a request.
///
/// Populated by the auth middleware from the *store*, not the token, so role
/// changes and deactivation take effect on the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
    email: String,
    role: Role,
}

impl CurrentUser {
    pub fn new(user_id: UserId, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
