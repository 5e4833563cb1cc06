//! Session

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// User identifier, e.g. `user-2`. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingUser`] if `id` is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(ValidationError::MissingUser);
        }

        Ok(Self(id))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a signed-in user may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shops and reads their own orders
    #[default]
    Customer,

    /// Manages every order
    Admin,
}

/// The signed-in user, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    role: Role,
}

impl Session {
    /// Create a session.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// A customer session.
    pub fn customer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Customer)
    }

    /// An administrator session.
    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    /// Signed-in user
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Signed-in user's role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn blank_user_id_is_missing() {
        assert_eq!(UserId::new("  "), Err(ValidationError::MissingUser));
    }

    #[test]
    fn blank_user_id_does_not_deserialize() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");

        assert!(result.is_err(), "blank ids should be rejected");
    }

    #[test]
    fn roles_gate_admin() -> TestResult {
        let customer = Session::customer(UserId::new("user-2")?);
        let admin = Session::admin(UserId::new("user-1")?);

        assert!(!customer.is_admin());
        assert!(admin.is_admin());
        assert_eq!(serde_json::to_string(&admin.role())?, "\"admin\"");

        Ok(())
    }
}
