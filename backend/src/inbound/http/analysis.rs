//! Site analysis HTTP handlers.
//!
//! ```text
//! POST /analyze-business/
//! GET  /api/result/{id}/
//! GET  /pdf-data/{id}/
//! GET  /api/v1/analyses?limit=20&offset=0
//! ```
//!
//! The first three paths keep the legacy client's URLs; only history sits
//! under `/api/v1`.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AnalysisRecord, AnalysisSummary, PdfReport, SiteAnalysisDraft, SiteAnalysisInput,
    SiteMetrics,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_analysis_id, parse_history_page, site_draft_error,
};

/// Request payload for a new analysis.
///
/// Coordinates are optional: WGS84 skips geocoding, WGS84 plus projected
/// x/y also skips reprojection.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequestBody {
    #[schema(example = "서울특별시 중구 세종대로 110")]
    pub address: String,
    /// Store area in square metres.
    #[schema(example = 50.0)]
    pub area: f64,
    #[schema(example = 7)]
    pub business_type_id: i64,
    /// `0` 휴게음식점, `1` 일반음식점.
    #[schema(example = 1)]
    pub service_type: i64,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    /// EPSG:5186 easting.
    #[serde(default)]
    pub x: Option<f64>,
    /// EPSG:5186 northing.
    #[serde(default)]
    pub y: Option<f64>,
}

impl AnalyzeRequestBody {
    fn into_draft(self, owner: Option<crate::domain::UserId>) -> SiteAnalysisDraft {
        SiteAnalysisDraft {
            address: self.address,
            area: self.area,
            business_type_id: self.business_type_id,
            service_type: self.service_type,
            longitude: self.longitude,
            latitude: self.latitude,
            x: self.x,
            y: self.y,
            owner,
        }
    }
}

/// Stored or freshly computed analysis.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponseBody {
    #[schema(format = "uuid")]
    pub request_id: String,
    /// Same identifier as `requestId`; results are one-to-one with requests.
    #[schema(format = "uuid")]
    pub result_id: String,
    pub address: String,
    pub area: f64,
    pub business_type_id: i32,
    pub service_type: i16,
    pub service_type_label: String,
    pub longitude: f64,
    pub latitude: f64,
    pub x: f64,
    pub y: f64,
    #[schema(format = "date-time")]
    pub created_at: String,
    /// Aggregates keyed by stored column name.
    #[schema(value_type = Object)]
    pub metrics: SiteMetrics,
    /// Metrics whose sub-query failed; their values above are 0.
    pub unavailable_metrics: Vec<String>,
    pub survival_probability: f64,
    pub survival_percentage: f64,
    /// `full`, `reduced`, or null when the model did not answer.
    pub feature_contract: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_strengths: Option<String>,
    pub ai_risks: Option<String>,
}

impl From<AnalysisRecord> for AnalysisResponseBody {
    fn from(record: AnalysisRecord) -> Self {
        let id = record.id.to_string();
        Self {
            request_id: id.clone(),
            result_id: id,
            address: record.address,
            area: record.area.square_metres(),
            business_type_id: record.business_type_id.get(),
            service_type: record.service_type.wire_value(),
            service_type_label: record.service_type.label().to_owned(),
            longitude: record.location.geographic.longitude(),
            latitude: record.location.geographic.latitude(),
            x: record.location.projected.x(),
            y: record.location.projected.y(),
            created_at: record.created_at.to_rfc3339(),
            metrics: record.metrics,
            unavailable_metrics: record.unavailable_metrics,
            survival_probability: record.prediction.probability(),
            survival_percentage: record.prediction.percentage(),
            feature_contract: record
                .prediction
                .contract()
                .map(|contract| contract.as_str().to_owned()),
            ai_summary: record.narrative.summary,
            ai_strengths: record.narrative.strengths,
            ai_risks: record.narrative.risks,
        }
    }
}

/// Display strings for client-side PDF rendering.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfReportBody {
    pub address: String,
    pub business_type_name: String,
    pub service_type_label: String,
    #[schema(example = "50.0㎡")]
    pub area: String,
    #[schema(example = "2026-03-02 00:30")]
    pub created_at: String,
    #[schema(example = "73.5%")]
    pub survival_percentage: String,
    #[schema(example = "높음")]
    pub survival_grade: String,
    pub life_pop_300m: String,
    /// 20s, 30s, 40s, 50s, 60+.
    pub life_pop_age_ratios_300m: Vec<String>,
    pub life_pop_1000m: String,
    pub life_pop_age_ratios_1000m: Vec<String>,
    pub working_pop_300m: String,
    pub temp_foreign_1000m: String,
    pub temp_foreign_cn_300m: String,
    pub temp_foreign_cn_1000m: String,
    pub long_foreign_300m: String,
    pub long_foreign_1000m: String,
    pub long_foreign_cn_1000m: String,
    pub public_building_250m: String,
    pub school_250m: String,
    pub competitor_300m: String,
    pub adjacent_biz_300m: String,
    pub competitor_ratio_300m: String,
    pub business_diversity_300m: String,
    #[schema(example = "5,000,000원")]
    pub land_unit_price: String,
    #[schema(example = "250,000,000원")]
    pub total_land_value: String,
    pub unavailable_metrics: Vec<String>,
    pub ai_summary: Option<String>,
    pub ai_strengths: Option<String>,
    pub ai_risks: Option<String>,
}

impl From<PdfReport> for PdfReportBody {
    fn from(report: PdfReport) -> Self {
        Self {
            address: report.address,
            business_type_name: report.business_type_name,
            service_type_label: report.service_type_label,
            area: report.area,
            created_at: report.created_at,
            survival_percentage: report.survival_percentage,
            survival_grade: report.survival_grade,
            life_pop_300m: report.life_pop_300m,
            life_pop_age_ratios_300m: report.life_pop_age_ratios_300m.into(),
            life_pop_1000m: report.life_pop_1000m,
            life_pop_age_ratios_1000m: report.life_pop_age_ratios_1000m.into(),
            working_pop_300m: report.working_pop_300m,
            temp_foreign_1000m: report.temp_foreign_1000m,
            temp_foreign_cn_300m: report.temp_foreign_cn_300m,
            temp_foreign_cn_1000m: report.temp_foreign_cn_1000m,
            long_foreign_300m: report.long_foreign_300m,
            long_foreign_1000m: report.long_foreign_1000m,
            long_foreign_cn_1000m: report.long_foreign_cn_1000m,
            public_building_250m: report.public_building_250m,
            school_250m: report.school_250m,
            competitor_300m: report.competitor_300m,
            adjacent_biz_300m: report.adjacent_biz_300m,
            competitor_ratio_300m: report.competitor_ratio_300m,
            business_diversity_300m: report.business_diversity_300m,
            land_unit_price: report.land_unit_price,
            total_land_value: report.total_land_value,
            unavailable_metrics: report.unavailable_metrics,
            ai_summary: report.narrative.summary,
            ai_strengths: report.narrative.strengths,
            ai_risks: report.narrative.risks,
        }
    }
}

/// History paging parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Page size, 1 to 100; defaults to 20.
    pub limit: Option<i64>,
    /// Rows to skip; defaults to 0.
    pub offset: Option<i64>,
}

/// One history entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummaryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub address: String,
    pub business_type_id: i32,
    pub service_type: i16,
    pub survival_percentage: f64,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<AnalysisSummary> for AnalysisSummaryBody {
    fn from(summary: AnalysisSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            address: summary.address,
            business_type_id: summary.business_type_id.get(),
            service_type: summary.service_type.wire_value(),
            survival_percentage: summary.survival_percentage,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

/// Run a new analysis. Signed-in users become the owner.
#[utoipa::path(
    post,
    path = "/analyze-business/",
    request_body = AnalyzeRequestBody,
    responses(
        (status = 200, description = "Analysis stored", body = AnalysisResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Address not found", body = ErrorSchema),
        (status = 503, description = "Geocoder or datastore unavailable", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "analyzeBusiness",
    security([])
)]
#[post("/analyze-business/")]
pub async fn analyze_business(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AnalyzeRequestBody>,
) -> ApiResult<web::Json<AnalysisResponseBody>> {
    let owner = session.user_id()?;
    let input = SiteAnalysisInput::try_from(payload.into_inner().into_draft(owner))
        .map_err(site_draft_error)?;
    let record = state.analysis.analyze(input).await?;
    Ok(web::Json(AnalysisResponseBody::from(record)))
}

/// Fetch a stored analysis.
#[utoipa::path(
    get,
    path = "/api/result/{id}/",
    params(("id" = String, Path, description = "Analysis id", format = "uuid")),
    responses(
        (status = 200, description = "Stored analysis", body = AnalysisResponseBody),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "No such analysis", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "getResult",
    security([])
)]
#[get("/api/result/{id}/")]
pub async fn get_result(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AnalysisResponseBody>> {
    let id = parse_analysis_id(&path.into_inner(), FieldName::new("id"))?;
    let record = state.analyses.result(&id).await?;
    Ok(web::Json(AnalysisResponseBody::from(record)))
}

/// Pre-formatted strings for PDF rendering.
#[utoipa::path(
    get,
    path = "/pdf-data/{id}/",
    params(("id" = String, Path, description = "Analysis id", format = "uuid")),
    responses(
        (status = 200, description = "Formatted report", body = PdfReportBody),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "No such analysis", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "getPdfData",
    security([])
)]
#[get("/pdf-data/{id}/")]
pub async fn get_pdf_data(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PdfReportBody>> {
    let id = parse_analysis_id(&path.into_inner(), FieldName::new("id"))?;
    let report = state.analyses.pdf_report(&id).await?;
    Ok(web::Json(PdfReportBody::from(report)))
}

/// The signed-in user's analyses, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/analyses",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History page", body = [AnalysisSummaryBody]),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "listAnalyses",
    security(("SessionCookie" = []))
)]
#[get("/analyses")]
pub async fn list_analyses(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Vec<AnalysisSummaryBody>>> {
    let owner = session.require_user_id()?;
    let HistoryQuery { limit, offset } = query.into_inner();
    let page = parse_history_page(limit, offset)?;
    let summaries = state.analyses.history(&owner, page).await?;
    Ok(web::Json(
        summaries.into_iter().map(AnalysisSummaryBody::from).collect(),
    ))
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
