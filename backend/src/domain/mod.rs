//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities for site analysis and the
//! services that drive the pipeline (geocode, aggregate, predict, persist).
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - SiteAnalysisInput: validated analysis request.
//! - SpatialAggregator: buffer aggregation with lock retry.
//! - SurvivalPredictor: feature-contract fallback over an injected model.
//! - SiteAnalysisService / AnalysisQueryService: driving-port implementations.

pub mod aggregates;
pub mod analysis;
pub mod analysis_service;
pub mod auth;
pub mod business_type;
pub mod error;
pub mod feature_vector;
pub mod layers;
pub mod password_login;
pub mod ports;
pub mod prediction;
pub mod report_format;
pub mod site;
pub mod spatial_aggregation;
pub mod trace_id;
pub mod user;
pub mod user_messages;

pub use self::aggregates::{
    AggregationReport, ForeignerCounts, MetricGroup, PopulationCounts, PopulationProfile,
    SiteMetrics, StoreCounts, UnavailableGroup, ratio_percent,
};
pub use self::analysis::{
    AnalysisId, AnalysisRecord, AnalysisSummary, HistoryPage, HistoryPageError, Narrative,
    SiteLocation,
};
pub use self::analysis_service::{AnalysisQueryService, SiteAnalysisPorts, SiteAnalysisService};
pub use self::auth::{LoginCredentials, LoginValidationError, password_digest, password_matches};
pub use self::business_type::{BusinessType, BusinessTypeId, BusinessTypeValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::feature_vector::{
    FULL_FEATURE_NAMES, FeatureContract, FeatureSource, UnknownFeatureContract,
};
pub use self::layers::{LayerCatalogue, LayerTable, SpatialLayer};
pub use self::password_login::PasswordLoginService;
pub use self::prediction::{
    ContractPolicy, ContractPolicyParseError, SurvivalPrediction, SurvivalPredictor,
    survival_percentage,
};
pub use self::report_format::{
    PdfReport, SurvivalGrade, format_count, format_percent, format_timestamp, format_won,
    group_thousands,
};
pub use self::site::{
    KnownLocation, ProjectedPoint, ServiceType, SiteAnalysisDraft, SiteAnalysisInput,
    SiteDraftError, SiteValidationError, StoreArea, Wgs84Point,
};
pub use self::spatial_aggregation::{
    AggregationError, AggregationRequest, LockRetryPolicy, RetrySleeper, SpatialAggregator,
    TokioSleeper,
};
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use locaai::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
