//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod analysis_query;
mod analysis_repository;
mod business_type_repository;
mod coordinate_projector;
mod geocoder;
mod login_service;
mod site_analysis_command;
mod spatial_data_source;
mod survival_model;
mod user_credentials_repository;

#[cfg(test)]
pub use analysis_query::MockAnalysisQuery;
pub use analysis_query::AnalysisQuery;
#[cfg(test)]
pub use analysis_repository::MockAnalysisRepository;
pub use analysis_repository::{
    AnalysisRepository, AnalysisRepositoryError, FixtureAnalysisRepository,
};
#[cfg(test)]
pub use business_type_repository::MockBusinessTypeRepository;
pub use business_type_repository::{
    BusinessTypeRepository, BusinessTypeRepositoryError, FixtureBusinessTypeRepository,
};
#[cfg(test)]
pub use coordinate_projector::MockCoordinateProjector;
pub use coordinate_projector::{
    CoordinateProjector, FixtureCoordinateProjector, ProjectionError,
};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use site_analysis_command::MockSiteAnalysisCommand;
pub use site_analysis_command::SiteAnalysisCommand;
#[cfg(test)]
pub use spatial_data_source::MockSpatialDataSource;
pub use spatial_data_source::{FixtureSpatialDataSource, SpatialDataSource, SpatialQueryError};
#[cfg(test)]
pub use survival_model::MockSurvivalModel;
pub use survival_model::{SurvivalModel, SurvivalModelError, UnavailableSurvivalModel};
#[cfg(test)]
pub use user_credentials_repository::MockUserCredentialsRepository;
pub use user_credentials_repository::{
    StoredCredentials, UserCredentialsError, UserCredentialsRepository,
};
