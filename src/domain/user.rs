use crate::error::{Result, ShopError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// A user as supplied by the identity service. The engine trusts this data
/// and never re-authenticates.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(id: u32, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The single authorization predicate for admin-gated mutations.
pub fn require_admin(user: &User) -> Result<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ShopError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = User::new(1, "admin@shop.test", "Admin", Role::Admin);
        let customer = User::new(2, "kim@shop.test", "Kim", Role::Customer);

        assert!(require_admin(&admin).is_ok());
        assert!(matches!(require_admin(&customer), Err(ShopError::Forbidden)));
    }
}
