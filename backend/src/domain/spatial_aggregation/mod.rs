//! Buffer-intersection aggregation around a projected site.
//!
//! The aggregator runs one query per [`MetricGroup`]. A failed query marks
//! only its own metrics unavailable and the run continues. Lock contention
//! aborts the run and the whole block is retried with doubling backoff.
//! Connection failures abort without retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{SpatialDataSource, SpatialQueryError};
use crate::domain::{
    AggregationReport, LayerCatalogue, MetricGroup, PopulationProfile, ProjectedPoint,
    SpatialLayer, StoreArea,
};

mod runtime;

pub use runtime::{LockRetryPolicy, TokioSleeper};

/// Async sleeping abstraction so retry tests do not wait.
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use locaai::domain::RetrySleeper;
/// use std::time::Duration;
///
/// struct NoSleep;
///
/// #[async_trait]
/// impl RetrySleeper for NoSleep {
///     async fn sleep(&self, _duration: Duration) {}
/// }
/// ```
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Site parameters for one aggregation run.
#[derive(Debug, Clone, Copy)]
pub struct AggregationRequest<'a> {
    /// Buffer centre in EPSG:5186.
    pub centre: ProjectedPoint,
    /// Store footprint used for total land value.
    pub area: StoreArea,
    /// Business category name matched against store points.
    pub business_category: &'a str,
}

/// Failures that abort an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    /// Lock contention persisted through every attempt.
    #[error("spatial datastore stayed locked after {attempts} attempts: {message}")]
    LockContention { attempts: u32, message: String },
    /// The datastore could not be reached.
    #[error("spatial datastore unavailable: {message}")]
    Unavailable { message: String },
}

/// Runs the fixed query battery with lock retry.
pub struct SpatialAggregator {
    source: Arc<dyn SpatialDataSource>,
    catalogue: Arc<LayerCatalogue>,
    sleeper: Arc<dyn RetrySleeper>,
    retry: LockRetryPolicy,
}

impl SpatialAggregator {
    /// Build an aggregator that sleeps on Tokio between retries.
    pub fn new(
        source: Arc<dyn SpatialDataSource>,
        catalogue: Arc<LayerCatalogue>,
        retry: LockRetryPolicy,
    ) -> Self {
        Self::with_sleeper(source, catalogue, retry, Arc::new(TokioSleeper))
    }

    /// Build an aggregator with an injected sleeper.
    pub fn with_sleeper(
        source: Arc<dyn SpatialDataSource>,
        catalogue: Arc<LayerCatalogue>,
        retry: LockRetryPolicy,
        sleeper: Arc<dyn RetrySleeper>,
    ) -> Self {
        Self {
            source,
            catalogue,
            sleeper,
            retry,
        }
    }

    /// Run every query and collect the report.
    ///
    /// # Errors
    /// Returns [`AggregationError`] when lock retries are exhausted or the
    /// datastore is unreachable.
    pub async fn aggregate(
        &self,
        request: &AggregationRequest<'_>,
    ) -> Result<AggregationReport, AggregationError> {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.run_single_attempt(request).await {
                Ok(report) => return Ok(report),
                Err(error) if error.is_lock_contention() && attempt < max_attempts => {
                    let delay = self.retry.backoff_after(attempt);
                    info!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "spatial datastore locked; retrying aggregation"
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(error) if error.is_lock_contention() => {
                    return Err(AggregationError::LockContention {
                        attempts: attempt,
                        message: error.to_string(),
                    });
                }
                Err(error) => {
                    return Err(AggregationError::Unavailable {
                        message: error.to_string(),
                    });
                }
            }
        }

        Err(AggregationError::LockContention {
            attempts: max_attempts,
            message: "retry loop ended without a result".to_owned(),
        })
    }

    async fn run_single_attempt(
        &self,
        request: &AggregationRequest<'_>,
    ) -> Result<AggregationReport, SpatialQueryError> {
        let mut report = AggregationReport::new();
        for group in MetricGroup::ALL {
            self.run_group(group, request, &mut report).await?;
        }
        Ok(report)
    }

    async fn run_group(
        &self,
        group: MetricGroup,
        request: &AggregationRequest<'_>,
        report: &mut AggregationReport,
    ) -> Result<(), SpatialQueryError> {
        let layer = layer_for(group);
        let Some(table) = self.catalogue.table(layer) else {
            report.mark_unavailable(group, format!("no table resolved for layer {layer}"));
            return Ok(());
        };
        let centre = request.centre;
        let source = self.source.as_ref();

        let outcome = match group {
            MetricGroup::ResidentPopulation300m | MetricGroup::ResidentPopulation1000m => source
                .resident_population(table, centre, radius_for(group))
                .await
                .map(|counts| {
                    report.record_resident_population(group, PopulationProfile::from(counts));
                }),
            MetricGroup::WorkingPopulation300m => source
                .working_population(table, centre, radius_for(group))
                .await
                .map(|total| report.record_working_population(total)),
            MetricGroup::TemporaryForeigners300m
            | MetricGroup::TemporaryForeigners1000m
            | MetricGroup::LongTermForeigners300m
            | MetricGroup::LongTermForeigners1000m => source
                .foreign_residents(table, centre, radius_for(group))
                .await
                .map(|counts| report.record_foreigners(group, counts)),
            MetricGroup::PublicBuildings250m | MetricGroup::Schools250m => source
                .count_features(table, centre, radius_for(group))
                .await
                .map(|count| report.record_count(group, count)),
            MetricGroup::Stores300m => source
                .store_counts(table, centre, radius_for(group), request.business_category)
                .await
                .map(|counts| report.record_stores(counts)),
            MetricGroup::LandValue => source
                .nearest_land_price(table, centre)
                .await
                .map(|price| {
                    report.record_land_value(price.unwrap_or(0.0), request.area.square_metres());
                }),
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(error @ (SpatialQueryError::Locked { .. } | SpatialQueryError::Connection { .. })) => {
                Err(error)
            }
            Err(error) => {
                warn!(?group, %table, error = %error, "spatial sub-query failed; metrics unavailable");
                report.mark_unavailable(group, error.to_string());
                Ok(())
            }
        }
    }
}

fn layer_for(group: MetricGroup) -> SpatialLayer {
    match group {
        MetricGroup::ResidentPopulation300m | MetricGroup::ResidentPopulation1000m => {
            SpatialLayer::ResidentPopulation
        }
        MetricGroup::WorkingPopulation300m => SpatialLayer::WorkingPopulation,
        MetricGroup::TemporaryForeigners300m | MetricGroup::TemporaryForeigners1000m => {
            SpatialLayer::TemporaryForeigners
        }
        MetricGroup::LongTermForeigners300m | MetricGroup::LongTermForeigners1000m => {
            SpatialLayer::LongTermForeigners
        }
        MetricGroup::PublicBuildings250m => SpatialLayer::PublicBuildings,
        MetricGroup::Schools250m => SpatialLayer::Schools,
        MetricGroup::Stores300m => SpatialLayer::Stores,
        MetricGroup::LandValue => SpatialLayer::LandValue,
    }
}

fn radius_for(group: MetricGroup) -> f64 {
    match group {
        MetricGroup::PublicBuildings250m | MetricGroup::Schools250m => 250.0,
        MetricGroup::ResidentPopulation1000m
        | MetricGroup::TemporaryForeigners1000m
        | MetricGroup::LongTermForeigners1000m => 1000.0,
        MetricGroup::ResidentPopulation300m
        | MetricGroup::WorkingPopulation300m
        | MetricGroup::TemporaryForeigners300m
        | MetricGroup::LongTermForeigners300m
        | MetricGroup::Stores300m => 300.0,
        MetricGroup::LandValue => 0.0,
    }
}
