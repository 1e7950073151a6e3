// Lead model - captured from forms, chat, or the public API.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::leads;

/// Lead lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Closed,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Closed => "closed",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "closed" => Ok(LeadStatus::Closed),
            "won" => Ok(LeadStatus::Won),
            "lost" => Ok(LeadStatus::Lost),
            _ => Err(format!("Invalid lead status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lead {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
    pub conversation_summary: Option<String>,
    pub preferred_language: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Insertable)]
#[diesel(table_name = leads)]
pub struct NewLead {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
    pub conversation_summary: Option<String>,
    pub preferred_language: Option<String>,
    pub status: String,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = leads)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
}

impl Lead {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_lead: NewLead,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(leads::table)
            .values(&new_lead)
            .get_result::<Lead>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        leads.filter(id.eq(lead_id)).first::<Lead>(conn).await
    }

    /// Tenant-scoped lookup; cross-company ids behave like missing rows
    pub async fn find_for_company(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
        owner: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        leads
            .filter(id.eq(lead_id))
            .filter(company_id.eq(owner))
            .first::<Lead>(conn)
            .await
    }

    /// Exact address match - the system's only identity-resolution mechanism
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        address: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        leads
            .filter(email.eq(address))
            .first::<Lead>(conn)
            .await
            .optional()
    }

    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        leads
            .filter(company_id.eq(owner))
            .order(created_at.desc())
            .load::<Lead>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
        changes: LeadUpdate,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        diesel::update(leads.filter(id.eq(lead_id)))
            .set(&changes)
            .get_result::<Lead>(conn)
            .await
    }

    pub async fn set_status(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
        new_status: LeadStatus,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::leads::dsl::*;

        diesel::update(leads.filter(id.eq(lead_id)))
            .set(status.eq(new_status.as_str()))
            .execute(conn)
            .await
    }

    pub fn status_enum(&self) -> LeadStatus {
        LeadStatus::from_str(&self.status).unwrap_or(LeadStatus::New)
    }
}
