//! LocaAI site analysis service.
//!
//! Hexagonal layout: [`domain`] holds the analysis pipeline and its ports,
//! [`outbound`] the PostGIS, geocoder and model adapters, [`inbound`] the
//! HTTP handlers.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
