//! Site analysis domain services.
//!
//! [`SiteAnalysisService`] implements the command port: resolve the site,
//! aggregate the buffer metrics, predict survival and persist the record.
//! [`AnalysisQueryService`] implements the read side.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AnalysisQuery, AnalysisRepository, AnalysisRepositoryError, BusinessTypeRepository,
    BusinessTypeRepositoryError, CoordinateProjector, Geocoder, GeocoderError, ProjectionError,
    SiteAnalysisCommand,
};
use crate::domain::spatial_aggregation::{AggregationError, AggregationRequest, SpatialAggregator};
use crate::domain::{
    AnalysisId, AnalysisRecord, AnalysisSummary, BusinessType, BusinessTypeId, Error,
    FeatureSource, HistoryPage, KnownLocation, Narrative, PdfReport, SiteAnalysisInput,
    SiteLocation, SurvivalPredictor, UserId, user_messages,
};

fn map_repository_error(error: AnalysisRepositoryError) -> Error {
    match error {
        AnalysisRepositoryError::Connection { message } => {
            warn!(%message, "analysis repository unavailable");
            Error::service_unavailable(user_messages::SAVE_FAILED)
        }
        AnalysisRepositoryError::Query { message }
        | AnalysisRepositoryError::Corrupt { message } => {
            Error::internal(format!("analysis repository error: {message}"))
        }
    }
}

fn map_business_type_error(error: BusinessTypeRepositoryError) -> Error {
    match error {
        BusinessTypeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("business type repository unavailable: {message}"))
        }
        BusinessTypeRepositoryError::Query { message } => {
            Error::internal(format!("business type repository error: {message}"))
        }
    }
}

fn map_geocoder_error(error: GeocoderError) -> Error {
    match error {
        GeocoderError::NotFound { address } => {
            info!(%address, "address not found by geocoder");
            Error::not_found(user_messages::ADDRESS_NOT_FOUND)
        }
        other => {
            warn!(error = %other, "geocoder failed");
            Error::service_unavailable(user_messages::GEOCODER_UNAVAILABLE)
        }
    }
}

fn map_projection_error(error: ProjectionError) -> Error {
    warn!(error = %error, "coordinate projection failed");
    Error::service_unavailable(user_messages::PROJECTION_FAILED)
}

fn map_aggregation_error(error: AggregationError) -> Error {
    warn!(error = %error, "spatial aggregation aborted");
    match error {
        AggregationError::LockContention { .. } => {
            Error::service_unavailable(user_messages::DATASTORE_BUSY)
        }
        AggregationError::Unavailable { .. } => {
            Error::service_unavailable(user_messages::ANALYSIS_FAILED)
        }
    }
}

/// Ports the analysis command depends on.
pub struct SiteAnalysisPorts {
    /// Address lookup.
    pub geocoder: Arc<dyn Geocoder>,
    /// WGS84 to EPSG:5186 reprojection.
    pub projector: Arc<dyn CoordinateProjector>,
    /// Category lookup for competitor matching.
    pub business_types: Arc<dyn BusinessTypeRepository>,
    /// Record storage.
    pub repository: Arc<dyn AnalysisRepository>,
}

/// Analysis service implementing [`SiteAnalysisCommand`].
#[derive(Clone)]
pub struct SiteAnalysisService {
    geocoder: Arc<dyn Geocoder>,
    projector: Arc<dyn CoordinateProjector>,
    business_types: Arc<dyn BusinessTypeRepository>,
    repository: Arc<dyn AnalysisRepository>,
    aggregator: Arc<SpatialAggregator>,
    predictor: SurvivalPredictor,
    clock: Arc<dyn Clock>,
}

impl SiteAnalysisService {
    /// Wire the service.
    pub fn new(
        ports: SiteAnalysisPorts,
        aggregator: Arc<SpatialAggregator>,
        predictor: SurvivalPredictor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder: ports.geocoder,
            projector: ports.projector,
            business_types: ports.business_types,
            repository: ports.repository,
            aggregator,
            predictor,
            clock,
        }
    }

    async fn business_type(&self, id: BusinessTypeId) -> Result<BusinessType, Error> {
        self.business_types
            .find(id)
            .await
            .map_err(map_business_type_error)?
            .ok_or_else(|| {
                Error::invalid_request(user_messages::UNKNOWN_BUSINESS_TYPE)
                    .with_details(json!({ "field": "businessTypeId", "value": id.get() }))
            })
    }

    async fn locate(&self, input: &SiteAnalysisInput) -> Result<SiteLocation, Error> {
        let geographic = match input.location() {
            KnownLocation::Projected(geographic, projected) => {
                return Ok(SiteLocation {
                    geographic,
                    projected,
                });
            }
            KnownLocation::Geographic(point) => point,
            KnownLocation::Unresolved => self
                .geocoder
                .geocode(input.address())
                .await
                .map_err(map_geocoder_error)?,
        };
        let projected = self
            .projector
            .project(geographic)
            .await
            .map_err(map_projection_error)?;
        Ok(SiteLocation {
            geographic,
            projected,
        })
    }
}

#[async_trait]
impl SiteAnalysisCommand for SiteAnalysisService {
    async fn analyze(&self, input: SiteAnalysisInput) -> Result<AnalysisRecord, Error> {
        let business_type = self.business_type(input.business_type_id()).await?;
        let location = self.locate(&input).await?;

        let report = self
            .aggregator
            .aggregate(&AggregationRequest {
                centre: location.projected,
                area: input.area(),
                business_category: business_type.name(),
            })
            .await
            .map_err(map_aggregation_error)?;
        let (metrics, unavailable_metrics) = report.into_parts();

        let prediction = self.predictor.predict(&FeatureSource {
            area: input.area(),
            service_type: input.service_type(),
            business_type_id: input.business_type_id(),
            metrics: &metrics,
        });

        let record = AnalysisRecord {
            id: AnalysisId::random(),
            address: input.address().to_owned(),
            area: input.area(),
            business_type_id: input.business_type_id(),
            service_type: input.service_type(),
            location,
            owner: input.owner().cloned(),
            created_at: self.clock.utc(),
            metrics,
            unavailable_metrics,
            prediction,
            narrative: Narrative::default(),
        };

        self.repository
            .save(&record)
            .await
            .map_err(map_repository_error)?;

        info!(
            analysis_id = %record.id,
            contract = ?record.prediction.contract(),
            survival_percentage = record.prediction.percentage(),
            unavailable = record.unavailable_metrics.len(),
            "site analysis stored"
        );
        Ok(record)
    }
}

/// Read-side service implementing [`AnalysisQuery`].
#[derive(Clone)]
pub struct AnalysisQueryService {
    repository: Arc<dyn AnalysisRepository>,
    business_types: Arc<dyn BusinessTypeRepository>,
}

impl AnalysisQueryService {
    /// Wire the service.
    pub fn new(
        repository: Arc<dyn AnalysisRepository>,
        business_types: Arc<dyn BusinessTypeRepository>,
    ) -> Self {
        Self {
            repository,
            business_types,
        }
    }
}

#[async_trait]
impl AnalysisQuery for AnalysisQueryService {
    async fn result(&self, id: &AnalysisId) -> Result<AnalysisRecord, Error> {
        self.repository
            .find(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(user_messages::RESULT_NOT_FOUND))
    }

    async fn pdf_report(&self, id: &AnalysisId) -> Result<PdfReport, Error> {
        let record = self.result(id).await?;
        let business_type = match self.business_types.find(record.business_type_id).await {
            Ok(found) => found,
            Err(error) => {
                warn!(error = %error, "business type lookup failed; using id as label");
                None
            }
        };
        Ok(PdfReport::from_record(&record, business_type.as_ref()))
    }

    async fn history(
        &self,
        owner: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<AnalysisSummary>, Error> {
        self.repository
            .list_for_owner(owner, page)
            .await
            .map_err(map_repository_error)
    }

    async fn business_types(&self) -> Result<Vec<BusinessType>, Error> {
        self.business_types
            .list()
            .await
            .map_err(map_business_type_error)
    }
}

#[cfg(test)]
#[path = "analysis_service_tests.rs"]
mod tests;
