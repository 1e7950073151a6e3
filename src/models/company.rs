// Company model - the tenant boundary.
// Every domain entity hangs off a company (or is unscoped pre-assignment).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::companies;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub auto_reply_enabled: bool,
    pub ai_model: String,
    pub ai_prompt_template: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub name: String,
    pub api_key: String,
    pub auto_reply_enabled: bool,
    pub ai_model: String,
    pub ai_prompt_template: String,
}

impl NewCompany {
    pub fn with_defaults(name: &str) -> Self {
        Self {
            name: name.to_string(),
            api_key: generate_api_key(),
            auto_reply_enabled: true,
            ai_model: "gpt-4o-mini".to_string(),
            ai_prompt_template: "You are a helpful assistant drafting concise B2B responses."
                .to_string(),
        }
    }
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = companies)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub api_key: Option<String>,
    pub auto_reply_enabled: Option<bool>,
    pub ai_model: Option<String>,
    pub ai_prompt_template: Option<String>,
}

/// Generate a URL-safe API key for public endpoints
pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect()
}

impl Company {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::companies::dsl::*;

        companies.filter(id.eq(company_id)).first::<Company>(conn).await
    }

    pub async fn find_by_api_key(
        conn: &mut AsyncPgConnection,
        key: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::companies::dsl::*;

        companies.filter(api_key.eq(key)).first::<Company>(conn).await
    }

    pub async fn find_by_name(
        conn: &mut AsyncPgConnection,
        company_name: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::companies::dsl::*;

        companies
            .filter(name.eq(company_name))
            .first::<Company>(conn)
            .await
            .optional()
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_company: NewCompany,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(companies::table)
            .values(&new_company)
            .get_result::<Company>(conn)
            .await
    }

    /// Look up a company by name, creating it with defaults when absent.
    /// Used at registration so the first user of a company bootstraps the tenant.
    pub async fn find_or_create(
        conn: &mut AsyncPgConnection,
        company_name: &str,
    ) -> Result<Self, diesel::result::Error> {
        if let Some(existing) = Self::find_by_name(conn, company_name).await? {
            return Ok(existing);
        }
        Self::create(conn, NewCompany::with_defaults(company_name)).await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
        changes: CompanyUpdate,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::companies::dsl::*;

        diesel::update(companies.filter(id.eq(company_id)))
            .set(&changes)
            .get_result::<Company>(conn)
            .await
    }

    /// Rotate the API key, invalidating the previous one
    pub async fn rotate_api_key(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::companies::dsl::*;

        diesel::update(companies.filter(id.eq(company_id)))
            .set(api_key.eq(generate_api_key()))
            .get_result::<Company>(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_generation() {
        let key = generate_api_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two keys should virtually never collide
        assert_ne!(generate_api_key(), generate_api_key());
    }

    #[test]
    fn test_new_company_defaults() {
        let company = NewCompany::with_defaults("Acme");
        assert_eq!(company.name, "Acme");
        assert!(company.auto_reply_enabled);
        assert_eq!(company.ai_model, "gpt-4o-mini");
    }
}
