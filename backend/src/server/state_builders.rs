//! Builds the HTTP state from the database pool and loaded adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use locaai::domain::ports::{Geocoder, SurvivalModel};
use locaai::domain::{
    AnalysisQueryService, ContractPolicy, LayerCatalogue, LockRetryPolicy, PasswordLoginService,
    SiteAnalysisPorts, SiteAnalysisService, SpatialAggregator, SurvivalPredictor,
};
use locaai::inbound::http::state::HttpState;
use locaai::outbound::persistence::{
    DbPool, DieselAnalysisRepository, DieselBusinessTypeRepository,
    DieselUserCredentialsRepository, PostgisCoordinateProjector, PostgisSpatialSource,
};

/// Everything the analysis services need beyond the pool-backed adapters.
pub struct AnalysisWiring {
    pub pool: DbPool,
    pub geocoder: Arc<dyn Geocoder>,
    pub model: Arc<dyn SurvivalModel>,
    pub catalogue: Arc<LayerCatalogue>,
    pub contract_policy: ContractPolicy,
    pub lock_retry: LockRetryPolicy,
}

/// Wire the domain services onto their Diesel and PostGIS adapters.
pub fn build_http_state(wiring: AnalysisWiring) -> web::Data<HttpState> {
    let AnalysisWiring {
        pool,
        geocoder,
        model,
        catalogue,
        contract_policy,
        lock_retry,
    } = wiring;

    let repository = Arc::new(DieselAnalysisRepository::new(pool.clone()));
    let business_types = Arc::new(DieselBusinessTypeRepository::new(pool.clone()));
    let aggregator = Arc::new(SpatialAggregator::new(
        Arc::new(PostgisSpatialSource::new(pool.clone())),
        catalogue,
        lock_retry,
    ));

    let analysis = SiteAnalysisService::new(
        SiteAnalysisPorts {
            geocoder,
            projector: Arc::new(PostgisCoordinateProjector::new(pool.clone())),
            business_types: business_types.clone(),
            repository: repository.clone(),
        },
        aggregator,
        SurvivalPredictor::new(model, contract_policy),
        Arc::new(DefaultClock),
    );
    let analyses = AnalysisQueryService::new(repository, business_types);
    let login = PasswordLoginService::new(Arc::new(DieselUserCredentialsRepository::new(pool)));

    web::Data::new(HttpState::new(
        Arc::new(login),
        Arc::new(analysis),
        Arc::new(analyses),
    ))
}
