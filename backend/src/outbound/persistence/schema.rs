//! Diesel table definitions for the application-owned PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The GIS layer
//! tables are read-only reference data owned by the datastore and are queried
//! through raw SQL instead.

diesel::table! {
    /// Accounts that may sign in and own analyses.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Human-readable name.
        display_name -> Varchar,
        /// Per-user salt prepended to the password before hashing.
        password_salt -> Text,
        /// Lowercase hex SHA-256 of `salt || password`.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restaurant categories, seeded by migration.
    business_types (id) {
        /// Positive category id; also a model feature.
        id -> Int4,
        /// Category name matched against store points.
        name -> Varchar,
    }
}

diesel::table! {
    /// Submitted analysis requests. Immutable once written.
    analysis_requests (id) {
        id -> Uuid,
        address -> Text,
        area -> Float8,
        business_type_id -> Int4,
        service_type -> Int2,
        longitude -> Float8,
        latitude -> Float8,
        x_coord -> Float8,
        y_coord -> Float8,
        user_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One result row per request.
    analysis_results (request_id) {
        request_id -> Uuid,
        /// Aggregates keyed by metric name.
        metrics -> Jsonb,
        unavailable_metrics -> Array<Text>,
        survival_probability -> Float8,
        survival_percentage -> Float8,
        /// `full`, `reduced`, or NULL when no contract produced a prediction.
        feature_contract -> Nullable<Varchar>,
        ai_summary -> Nullable<Text>,
        ai_strengths -> Nullable<Text>,
        ai_risks -> Nullable<Text>,
    }
}

diesel::joinable!(analysis_requests -> business_types (business_type_id));
diesel::joinable!(analysis_requests -> users (user_id));
diesel::joinable!(analysis_results -> analysis_requests (request_id));

diesel::allow_tables_to_appear_in_same_query!(
    analysis_requests,
    analysis_results,
    business_types,
    users,
);
