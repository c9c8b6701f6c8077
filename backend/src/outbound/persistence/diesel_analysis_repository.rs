//! PostgreSQL-backed analysis persistence.
//!
//! A record is split into one `analysis_requests` row and one
//! `analysis_results` row sharing the same UUID. Aggregate values are kept
//! in a JSONB column so adding a metric does not widen the table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::debug;

use crate::domain::ports::{AnalysisRepository, AnalysisRepositoryError};
use crate::domain::{
    AnalysisId, AnalysisRecord, AnalysisSummary, BusinessTypeId, FeatureContract, HistoryPage,
    Narrative, ProjectedPoint, ServiceType, SiteLocation, SiteMetrics, StoreArea,
    SurvivalPrediction, UserId, Wgs84Point,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AnalysisRequestRow, AnalysisResultRow, AnalysisSummaryRow};
use super::pool::DbPool;
use super::schema::{analysis_requests, analysis_results};

/// Diesel-backed implementation of [`AnalysisRepository`].
#[derive(Clone)]
pub struct DieselAnalysisRepository {
    pool: DbPool,
}

impl DieselAnalysisRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> AnalysisRepositoryError {
    move |error| {
        map_basic_diesel_error(
            error,
            operation,
            AnalysisRepositoryError::query,
            AnalysisRepositoryError::connection,
        )
    }
}

fn record_to_rows(
    record: &AnalysisRecord,
) -> Result<(AnalysisRequestRow, AnalysisResultRow), AnalysisRepositoryError> {
    let metrics = serde_json::to_value(&record.metrics)
        .map_err(|error| AnalysisRepositoryError::query(format!("encode metrics: {error}")))?;
    let request = AnalysisRequestRow {
        id: *record.id.as_uuid(),
        address: record.address.clone(),
        area: record.area.square_metres(),
        business_type_id: record.business_type_id.get(),
        service_type: record.service_type.wire_value(),
        longitude: record.location.geographic.longitude(),
        latitude: record.location.geographic.latitude(),
        x_coord: record.location.projected.x(),
        y_coord: record.location.projected.y(),
        user_id: record.owner.as_ref().map(|owner| *owner.as_uuid()),
        created_at: record.created_at,
    };
    let result = AnalysisResultRow {
        request_id: *record.id.as_uuid(),
        metrics,
        unavailable_metrics: record.unavailable_metrics.clone(),
        survival_probability: record.prediction.probability(),
        survival_percentage: record.prediction.percentage(),
        feature_contract: record
            .prediction
            .contract()
            .map(|contract| contract.as_str().to_owned()),
        ai_summary: record.narrative.summary.clone(),
        ai_strengths: record.narrative.strengths.clone(),
        ai_risks: record.narrative.risks.clone(),
    };
    Ok((request, result))
}

fn corrupt(field: &str) -> impl FnOnce(String) -> AnalysisRepositoryError + '_ {
    move |message| AnalysisRepositoryError::corrupt(format!("{field}: {message}"))
}

fn rows_to_record(
    request: AnalysisRequestRow,
    result: AnalysisResultRow,
) -> Result<AnalysisRecord, AnalysisRepositoryError> {
    let area = StoreArea::new(request.area).map_err(|e| corrupt("area")(e.to_string()))?;
    let business_type_id = BusinessTypeId::new(i64::from(request.business_type_id))
        .map_err(|e| corrupt("business_type_id")(e.to_string()))?;
    let service_type = ServiceType::try_from(i64::from(request.service_type))
        .map_err(|e| corrupt("service_type")(e.to_string()))?;
    let geographic = Wgs84Point::new(request.longitude, request.latitude)
        .map_err(|e| corrupt("longitude/latitude")(e.to_string()))?;
    let projected = ProjectedPoint::new(request.x_coord, request.y_coord)
        .map_err(|e| corrupt("x_coord/y_coord")(e.to_string()))?;
    let metrics: SiteMetrics = serde_json::from_value(result.metrics)
        .map_err(|e| corrupt("metrics")(e.to_string()))?;
    let contract = result
        .feature_contract
        .as_deref()
        .map(str::parse::<FeatureContract>)
        .transpose()
        .map_err(|e| corrupt("feature_contract")(e.to_string()))?;

    Ok(AnalysisRecord {
        id: AnalysisId::from_uuid(request.id),
        address: request.address,
        area,
        business_type_id,
        service_type,
        location: SiteLocation {
            geographic,
            projected,
        },
        owner: request.user_id.map(UserId::from_uuid),
        created_at: request.created_at,
        metrics,
        unavailable_metrics: result.unavailable_metrics,
        prediction: SurvivalPrediction::new(result.survival_probability, contract),
        narrative: Narrative {
            summary: result.ai_summary,
            strengths: result.ai_strengths,
            risks: result.ai_risks,
        },
    })
}

fn row_to_summary(row: AnalysisSummaryRow) -> Result<AnalysisSummary, AnalysisRepositoryError> {
    Ok(AnalysisSummary {
        id: AnalysisId::from_uuid(row.id),
        address: row.address,
        business_type_id: BusinessTypeId::new(i64::from(row.business_type_id))
            .map_err(|e| corrupt("business_type_id")(e.to_string()))?,
        service_type: ServiceType::try_from(i64::from(row.service_type))
            .map_err(|e| corrupt("service_type")(e.to_string()))?,
        survival_percentage: row.survival_percentage,
        created_at: row.created_at,
    })
}

#[async_trait]
impl AnalysisRepository for DieselAnalysisRepository {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), AnalysisRepositoryError> {
        let (request, result) = record_to_rows(record)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, AnalysisRepositoryError::connection))?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(analysis_requests::table)
                    .values(&request)
                    .execute(conn)
                    .await?;
                diesel::insert_into(analysis_results::table)
                    .values(&result)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error("save analysis"))?;

        debug!(analysis_id = %record.id, "analysis persisted");
        Ok(())
    }

    async fn find(
        &self,
        id: &AnalysisId,
    ) -> Result<Option<AnalysisRecord>, AnalysisRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, AnalysisRepositoryError::connection))?;

        let row: Option<(AnalysisRequestRow, AnalysisResultRow)> = analysis_requests::table
            .inner_join(analysis_results::table)
            .filter(analysis_requests::id.eq(id.as_uuid()))
            .select((AnalysisRequestRow::as_select(), AnalysisResultRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find analysis"))?;

        row.map(|(request, result)| rows_to_record(request, result))
            .transpose()
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<AnalysisSummary>, AnalysisRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, AnalysisRepositoryError::connection))?;

        let rows: Vec<AnalysisSummaryRow> = analysis_requests::table
            .inner_join(analysis_results::table)
            .filter(analysis_requests::user_id.eq(owner.as_uuid()))
            .order_by(analysis_requests::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select((
                analysis_requests::id,
                analysis_requests::address,
                analysis_requests::business_type_id,
                analysis_requests::service_type,
                analysis_requests::created_at,
                analysis_results::survival_percentage,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list analyses"))?;

        rows.into_iter().map(row_to_summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn record() -> AnalysisRecord {
        let metrics = SiteMetrics {
            life_pop_300m: 1234.0,
            competitor_300m: 12,
            land_unit_price: 5_000_000.0,
            total_land_value: 250_000_000.0,
            ..SiteMetrics::default()
        };
        AnalysisRecord {
            id: AnalysisId::from_uuid(Uuid::nil()),
            address: "서울 중구 세종대로 110".to_owned(),
            area: StoreArea::new(50.0).expect("valid area"),
            business_type_id: BusinessTypeId::new(7).expect("valid id"),
            service_type: ServiceType::General,
            location: SiteLocation {
                geographic: Wgs84Point::new(126.9784, 37.5663).expect("valid point"),
                projected: ProjectedPoint::new(198_056.0, 551_885.0).expect("valid point"),
            },
            owner: Some(UserId::from_uuid(Uuid::from_u128(42))),
            created_at: Utc
                .with_ymd_and_hms(2026, 3, 1, 15, 30, 0)
                .single()
                .expect("valid timestamp"),
            metrics,
            unavailable_metrics: vec!["working_pop_300m".to_owned()],
            prediction: SurvivalPrediction::new(0.7351, Some(FeatureContract::Reduced)),
            narrative: Narrative::default(),
        }
    }

    #[rstest]
    fn rows_restore_the_record(record: AnalysisRecord) {
        let (request, result) = record_to_rows(&record).expect("encode rows");

        assert_eq!(request.id, result.request_id);
        assert_eq!(request.service_type, 1);
        assert_eq!(result.survival_percentage, 73.5);
        assert_eq!(result.feature_contract.as_deref(), Some("reduced"));

        let restored = rows_to_record(request, result).expect("decode rows");
        assert_eq!(restored, record);
    }

    #[rstest]
    fn anonymous_records_store_no_owner(mut record: AnalysisRecord) {
        record.owner = None;
        let (request, _) = record_to_rows(&record).expect("encode rows");
        assert!(request.user_id.is_none());
    }

    #[rstest]
    fn degraded_predictions_store_no_contract(mut record: AnalysisRecord) {
        record.prediction = SurvivalPrediction::degraded();
        let (_, result) = record_to_rows(&record).expect("encode rows");
        assert_eq!(result.feature_contract, None);
        assert_eq!(result.survival_percentage, 0.0);
    }

    #[rstest]
    #[case::service_type(|request: &mut AnalysisRequestRow, _: &mut AnalysisResultRow| request.service_type = 9, "service_type")]
    #[case::contract(|_: &mut AnalysisRequestRow, result: &mut AnalysisResultRow| result.feature_contract = Some("legacy".to_owned()), "feature_contract")]
    #[case::metrics(|_: &mut AnalysisRequestRow, result: &mut AnalysisResultRow| result.metrics = serde_json::json!([1, 2]), "metrics")]
    fn invalid_rows_are_corrupt(
        record: AnalysisRecord,
        #[case] tamper: fn(&mut AnalysisRequestRow, &mut AnalysisResultRow),
        #[case] field: &str,
    ) {
        let (mut request, mut result) = record_to_rows(&record).expect("encode rows");
        tamper(&mut request, &mut result);

        let error = rows_to_record(request, result).expect_err("tampered rows");

        assert!(matches!(error, AnalysisRepositoryError::Corrupt { .. }));
        assert!(error.to_string().contains(field));
    }
}
