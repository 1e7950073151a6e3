// Authenticated principal extracted from a validated JWT.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_check() {
        let mut user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "ops@acme.test".to_string(),
            role: "admin".to_string(),
        };
        assert!(user.is_admin());
        user.role = "operator".to_string();
        assert!(!user.is_admin());
    }
}
