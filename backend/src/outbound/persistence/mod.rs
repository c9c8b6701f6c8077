//! PostgreSQL/PostGIS adapters.
//!
//! Repository adapters translate between Diesel rows and domain types and
//! map every database failure onto the owning port's error enum. The spatial
//! source and the coordinate projector issue raw PostGIS SQL through the same
//! bb8 pool. Row structs and the schema stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use locaai::outbound::persistence::{DbPool, DieselAnalysisRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/locaai")).await?;
//! let repository = DieselAnalysisRepository::new(pool);
//! ```

mod diesel_analysis_repository;
mod diesel_basic_error_mapping;
mod diesel_business_type_repository;
mod diesel_user_credentials_repository;
mod migrations;
mod models;
mod pool;
mod postgis_coordinate_projector;
mod postgis_spatial_source;
mod schema;

pub use diesel_analysis_repository::DieselAnalysisRepository;
pub use diesel_business_type_repository::DieselBusinessTypeRepository;
pub use diesel_user_credentials_repository::DieselUserCredentialsRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgis_coordinate_projector::PostgisCoordinateProjector;
pub use postgis_spatial_source::PostgisSpatialSource;
