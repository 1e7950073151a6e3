// Auto-reply template, keyed per company by trigger type.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::auto_reply_templates;

/// Applicability context of a template: new lead capture or inbound email
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerType {
    Lead,
    Email,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Lead => "lead",
            TriggerType::Email => "email",
        }
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(TriggerType::Lead),
            "email" => Ok(TriggerType::Email),
            _ => Err(format!("Invalid trigger type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = auto_reply_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AutoReplyTemplate {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub trigger_type: String,
    pub subject_template: String,
    pub body_template: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = auto_reply_templates)]
pub struct NewAutoReplyTemplate {
    pub company_id: Option<Uuid>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub trigger_type: String,
    pub subject_template: String,
    pub body_template: String,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = auto_reply_templates)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub trigger_type: Option<String>,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
}

impl AutoReplyTemplate {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_template: NewAutoReplyTemplate,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(auto_reply_templates::table)
            .values(&new_template)
            .get_result::<AutoReplyTemplate>(conn)
            .await
    }

    pub async fn find_for_company(
        conn: &mut AsyncPgConnection,
        template_id: Uuid,
        owner: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::auto_reply_templates::dsl::*;

        auto_reply_templates
            .filter(id.eq(template_id))
            .filter(company_id.eq(owner))
            .first::<AutoReplyTemplate>(conn)
            .await
    }

    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::auto_reply_templates::dsl::*;

        auto_reply_templates
            .filter(company_id.eq(owner))
            .order(created_at.desc())
            .load::<AutoReplyTemplate>(conn)
            .await
    }

    /// Most-recently-created template for (company, trigger_type).
    /// Ties on created_at resolve by id so the pick is stable across calls.
    pub async fn latest_for_trigger(
        conn: &mut AsyncPgConnection,
        trigger: TriggerType,
        owner: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::auto_reply_templates::dsl::*;

        auto_reply_templates
            .filter(company_id.eq(owner))
            .filter(trigger_type.eq(trigger.as_str()))
            .order((created_at.desc(), id.desc()))
            .first::<AutoReplyTemplate>(conn)
            .await
            .optional()
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        template_id: Uuid,
        changes: TemplateUpdate,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::auto_reply_templates::dsl::*;

        diesel::update(auto_reply_templates.filter(id.eq(template_id)))
            .set(&changes)
            .get_result::<AutoReplyTemplate>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        template_id: Uuid,
        owner: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::auto_reply_templates::dsl::*;

        diesel::delete(
            auto_reply_templates
                .filter(id.eq(template_id))
                .filter(company_id.eq(owner)),
        )
        .execute(conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_type_conversion() {
        assert_eq!(TriggerType::Lead.as_str(), "lead");
        assert_eq!(TriggerType::from_str("email"), Ok(TriggerType::Email));
        assert!(TriggerType::from_str("webhook").is_err());
    }
}
