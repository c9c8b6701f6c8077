//! Service entry-point: loads settings, prepares the database and model, and
//! serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use locaai::domain::LayerCatalogue;
use locaai::domain::ports::Geocoder;
use locaai::inbound::http::health::HealthState;
use locaai::inbound::http::session_config::fingerprint::key_fingerprint;
use locaai::inbound::http::session_config::{BuildMode, session_settings};
use locaai::outbound::geocoding::{KakaoGeocoderConfig, KakaoHttpGeocoder};
use locaai::outbound::model::load_survival_model;
use locaai::outbound::persistence::{
    DbPool, PoolConfig, PostgisSpatialSource, run_pending_migrations,
};
use locaai::settings::Settings;

use server::{AnalysisWiring, ServerConfig, build_http_state, create_server};

fn init_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}

fn build_geocoder(settings: &Settings) -> color_eyre::Result<Arc<dyn Geocoder>> {
    let mut config = KakaoGeocoderConfig::with_key(settings.geocoder_api_key()?)?;
    if let Some(endpoint) = settings.geocoder_endpoint()? {
        config.endpoint = endpoint;
    }
    config.timeout = settings.geocoder_timeout();
    let geocoder = KakaoHttpGeocoder::new(config).wrap_err("build geocoder HTTP client")?;
    Ok(Arc::new(geocoder))
}

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = Settings::load_from_iter(std::env::args_os()).wrap_err("load settings")?;
    let session = session_settings(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key ready");

    let database_url = settings.database_url()?;
    if settings.run_migrations() {
        run_pending_migrations(database_url).await?;
    }
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await?;

    let catalogue = LayerCatalogue::resolve(&PostgisSpatialSource::new(pool.clone()))
        .await
        .wrap_err("resolve spatial layers")?;
    let missing = catalogue.missing_layers();
    if !missing.is_empty() {
        warn!(?missing, "serving with unresolved spatial layers");
    }

    let http_state = build_http_state(AnalysisWiring {
        pool,
        geocoder: build_geocoder(&settings)?,
        model: load_survival_model(&settings.model_path()),
        catalogue: Arc::new(catalogue),
        contract_policy: settings.feature_contract()?,
        lock_retry: settings.lock_retry(),
    });

    let bind_addr = settings.bind_addr()?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(session, bind_addr),
        http_state,
    )?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
