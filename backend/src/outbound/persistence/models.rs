//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{analysis_requests, analysis_results, business_types, users};

/// Credential columns of the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    pub id: Uuid,
    pub password_salt: String,
    pub password_hash: String,
}

/// Row struct for reading from the business_types table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = business_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BusinessTypeRow {
    pub id: i32,
    pub name: String,
}

/// Row struct for the analysis_requests table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = analysis_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnalysisRequestRow {
    pub id: Uuid,
    pub address: String,
    pub area: f64,
    pub business_type_id: i32,
    pub service_type: i16,
    pub longitude: f64,
    pub latitude: f64,
    pub x_coord: f64,
    pub y_coord: f64,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the analysis_results table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = analysis_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnalysisResultRow {
    pub request_id: Uuid,
    pub metrics: serde_json::Value,
    pub unavailable_metrics: Vec<String>,
    pub survival_probability: f64,
    pub survival_percentage: f64,
    pub feature_contract: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_strengths: Option<String>,
    pub ai_risks: Option<String>,
}

/// History listing projection.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct AnalysisSummaryRow {
    pub id: Uuid,
    pub address: String,
    pub business_type_id: i32,
    pub service_type: i16,
    pub created_at: DateTime<Utc>,
    pub survival_percentage: f64,
}
