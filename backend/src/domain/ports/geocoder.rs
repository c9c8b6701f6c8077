//! Driven port for turning a free-text address into WGS84 coordinates.

use async_trait::async_trait;

use crate::domain::Wgs84Point;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while geocoding.
    pub enum GeocoderError {
        /// The provider returned no match for the address.
        NotFound { address: String } =>
            "no geocoding match for address: {address}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "geocoder transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } =>
            "geocoder timeout: {message}",
        /// The provider answered with a non-success status.
        Upstream { message: String } =>
            "geocoder rejected request: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "geocoder response decode failed: {message}",
    }
}

/// Port for address lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `address` to its first matching point.
    async fn geocode(&self, address: &str) -> Result<Wgs84Point, GeocoderError>;
}

/// Fixture geocoder resolving every address to Seoul City Hall.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, address: &str) -> Result<Wgs84Point, GeocoderError> {
        Wgs84Point::new(126.978_4, 37.566_3)
            .map_err(|err| GeocoderError::decode(format!("{address}: {err}")))
    }
}
