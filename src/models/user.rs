// User model - each user belongs to exactly one company.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::users;

/// Role within a company
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Operator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Operator => "operator",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "operator" => Ok(UserRole::Operator),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub company_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl User {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::users::dsl::*;

        users.filter(id.eq(user_id)).first::<User>(conn).await
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        use diesel::PgTextExpressionMethods;

        users
            .filter(email.ilike(email_str))
            .first::<User>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NewUser,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(conn)
            .await
    }

    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::users::dsl::*;

        users
            .filter(company_id.eq(owner))
            .order(created_at.asc())
            .load::<User>(conn)
            .await
    }

    /// Set a user's role, scoped to the owning company. NotFound when the
    /// id belongs to another tenant.
    pub async fn update_role(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        owner: Uuid,
        new_role: UserRole,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)).filter(company_id.eq(owner)))
            .set((
                role.eq(new_role.as_str()),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<User>(conn)
            .await
    }

    pub async fn update_password(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        new_hash: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set((
                password_hash.eq(new_hash),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<User>(conn)
            .await
    }

    /// Parse the stored role, defaulting to operator for unknown values
    pub fn role_enum(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid role '{}' for user {}, defaulting to operator: {}",
                self.role,
                self.id,
                e
            );
            UserRole::Operator
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role_enum() == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::from_str("operator"), Ok(UserRole::Operator));
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn test_role_fallback() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "ops@acme.test".to_string(),
            password_hash: "hash".to_string(),
            role: "bogus".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.role_enum(), UserRole::Operator);
        assert!(!user.is_admin());
    }
}
