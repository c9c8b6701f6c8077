//! Validated inputs describing the site under analysis.
//!
//! A site is an address plus optional client-supplied coordinates, a store
//! footprint, a business category and a service licence type. Constructors
//! reject values the spatial queries cannot use (non-finite numbers,
//! out-of-range WGS84 coordinates, non-positive areas).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::business_type::BusinessTypeId;
use super::user::UserId;

/// Validation failures for site inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SiteValidationError {
    /// Address was blank.
    #[error("address must not be empty")]
    EmptyAddress,
    /// Area must be a finite, strictly positive number of square metres.
    #[error("area must be a positive number of square metres, got {value}")]
    InvalidArea { value: f64 },
    /// Unknown service type wire value.
    #[error("service type must be 0 (rest stop) or 1 (general restaurant), got {value}")]
    UnknownServiceType { value: i64 },
    /// Longitude outside [-180, 180] or non-finite.
    #[error("longitude must be a finite value within [-180, 180], got {value}")]
    InvalidLongitude { value: f64 },
    /// Latitude outside [-90, 90] or non-finite.
    #[error("latitude must be a finite value within [-90, 90], got {value}")]
    InvalidLatitude { value: f64 },
    /// Projected coordinates must be finite.
    #[error("projected coordinates must be finite")]
    InvalidProjected,
    /// Projected coordinates were supplied without WGS84 coordinates.
    #[error("projected coordinates require longitude and latitude")]
    ProjectedWithoutGeographic,
    /// Only one half of a coordinate pair was supplied.
    #[error("{pair} must be supplied together")]
    IncompletePair { pair: &'static str },
}

/// Restaurant licence category; the wire value is the `service_type` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ServiceType {
    /// 휴게음식점 (wire value 0).
    RestStop,
    /// 일반음식점 (wire value 1).
    General,
}

impl ServiceType {
    /// Numeric value used on the wire, in storage and as a model feature.
    #[must_use]
    pub fn wire_value(self) -> i16 {
        match self {
            Self::RestStop => 0,
            Self::General => 1,
        }
    }

    /// Korean display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RestStop => "휴게음식점",
            Self::General => "일반음식점",
        }
    }
}

impl TryFrom<i64> for ServiceType {
    type Error = SiteValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RestStop),
            1 => Ok(Self::General),
            other => Err(SiteValidationError::UnknownServiceType { value: other }),
        }
    }
}

impl From<ServiceType> for i64 {
    fn from(value: ServiceType) -> Self {
        Self::from(value.wire_value())
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Store footprint in square metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct StoreArea(f64);

impl StoreArea {
    /// Validate a raw area.
    ///
    /// # Errors
    /// Returns [`SiteValidationError::InvalidArea`] unless the value is
    /// finite and greater than zero.
    pub fn new(square_metres: f64) -> Result<Self, SiteValidationError> {
        if square_metres.is_finite() && square_metres > 0.0 {
            Ok(Self(square_metres))
        } else {
            Err(SiteValidationError::InvalidArea {
                value: square_metres,
            })
        }
    }

    /// Area in square metres.
    #[must_use]
    pub fn square_metres(self) -> f64 {
        self.0
    }
}

impl From<StoreArea> for f64 {
    fn from(value: StoreArea) -> Self {
        value.0
    }
}

/// WGS84 (EPSG:4326) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wgs84Point {
    longitude: f64,
    latitude: f64,
}

impl Wgs84Point {
    /// Validate longitude/latitude bounds.
    ///
    /// # Errors
    /// Returns [`SiteValidationError`] for non-finite or out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, SiteValidationError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SiteValidationError::InvalidLongitude { value: longitude });
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SiteValidationError::InvalidLatitude { value: latitude });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(self) -> f64 {
        self.latitude
    }
}

/// Point in the projected CRS (EPSG:5186) used by every spatial layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    x: f64,
    y: f64,
}

impl ProjectedPoint {
    /// Validate projected coordinates.
    ///
    /// # Errors
    /// Returns [`SiteValidationError::InvalidProjected`] for non-finite values.
    pub fn new(x: f64, y: f64) -> Result<Self, SiteValidationError> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(SiteValidationError::InvalidProjected)
        }
    }

    /// Easting in metres.
    #[must_use]
    pub fn x(self) -> f64 {
        self.x
    }

    /// Northing in metres.
    #[must_use]
    pub fn y(self) -> f64 {
        self.y
    }
}

/// Coordinates the client already resolved, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnownLocation {
    /// Geocode the address and project the result.
    Unresolved,
    /// WGS84 known; projection still required.
    Geographic(Wgs84Point),
    /// Both coordinate systems known.
    Projected(Wgs84Point, ProjectedPoint),
}

impl KnownLocation {
    /// Build from optional raw client inputs.
    ///
    /// # Errors
    /// Returns [`SiteValidationError`] for invalid coordinates, a pair with
    /// one half missing, or projected coordinates supplied without their
    /// WGS84 counterpart.
    pub fn from_parts(
        longitude: Option<f64>,
        latitude: Option<f64>,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<Self, SiteValidationError> {
        let geographic = match (longitude, latitude) {
            (Some(lon), Some(lat)) => Some(Wgs84Point::new(lon, lat)?),
            (None, None) => None,
            _ => {
                return Err(SiteValidationError::IncompletePair {
                    pair: "longitude and latitude",
                });
            }
        };
        let projected = match (x, y) {
            (Some(px), Some(py)) => Some(ProjectedPoint::new(px, py)?),
            (None, None) => None,
            _ => return Err(SiteValidationError::IncompletePair { pair: "x and y" }),
        };
        match (geographic, projected) {
            (None, None) => Ok(Self::Unresolved),
            (Some(point), None) => Ok(Self::Geographic(point)),
            (Some(point), Some(projected)) => Ok(Self::Projected(point, projected)),
            (None, Some(_)) => Err(SiteValidationError::ProjectedWithoutGeographic),
        }
    }
}

/// A validated analysis request as submitted by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteAnalysisInput {
    address: String,
    area: StoreArea,
    business_type_id: BusinessTypeId,
    service_type: ServiceType,
    location: KnownLocation,
    owner: Option<UserId>,
}

/// Raw parts used to build a [`SiteAnalysisInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct SiteAnalysisDraft {
    /// Free-text address.
    pub address: String,
    /// Store area in square metres.
    pub area: f64,
    /// Business category id.
    pub business_type_id: i64,
    /// Service type wire value.
    pub service_type: i64,
    /// Optional WGS84 longitude.
    pub longitude: Option<f64>,
    /// Optional WGS84 latitude.
    pub latitude: Option<f64>,
    /// Optional projected easting.
    pub x: Option<f64>,
    /// Optional projected northing.
    pub y: Option<f64>,
    /// Authenticated owner, if any.
    pub owner: Option<UserId>,
}

/// Validation failure for a whole draft, naming the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct SiteDraftError {
    /// camelCase field name as it appears on the wire.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl SiteDraftError {
    fn new(field: &'static str, error: &impl fmt::Display) -> Self {
        Self {
            field,
            message: error.to_string(),
        }
    }
}

impl TryFrom<SiteAnalysisDraft> for SiteAnalysisInput {
    type Error = SiteDraftError;

    fn try_from(draft: SiteAnalysisDraft) -> Result<Self, Self::Error> {
        let address = draft.address.trim();
        if address.is_empty() {
            return Err(SiteDraftError::new(
                "address",
                &SiteValidationError::EmptyAddress,
            ));
        }
        let area = StoreArea::new(draft.area).map_err(|err| SiteDraftError::new("area", &err))?;
        let business_type_id = BusinessTypeId::new(draft.business_type_id)
            .map_err(|err| SiteDraftError::new("businessTypeId", &err))?;
        let service_type = ServiceType::try_from(draft.service_type)
            .map_err(|err| SiteDraftError::new("serviceType", &err))?;
        let location = KnownLocation::from_parts(draft.longitude, draft.latitude, draft.x, draft.y)
            .map_err(|err| SiteDraftError::new("coordinates", &err))?;

        Ok(Self {
            address: address.to_owned(),
            area,
            business_type_id,
            service_type,
            location,
            owner: draft.owner,
        })
    }
}

impl SiteAnalysisInput {
    /// Trimmed address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Store footprint.
    #[must_use]
    pub fn area(&self) -> StoreArea {
        self.area
    }

    /// Business category.
    #[must_use]
    pub fn business_type_id(&self) -> BusinessTypeId {
        self.business_type_id
    }

    /// Licence category.
    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Client-resolved coordinates.
    #[must_use]
    pub fn location(&self) -> KnownLocation {
        self.location
    }

    /// Owning user.
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> SiteAnalysisDraft {
        SiteAnalysisDraft {
            address: " 서울특별시 중구 세종대로 110 ".to_owned(),
            area: 50.0,
            business_type_id: 7,
            service_type: 1,
            longitude: None,
            latitude: None,
            x: None,
            y: None,
            owner: None,
        }
    }

    #[rstest]
    fn accepts_minimal_draft(draft: SiteAnalysisDraft) {
        let input = SiteAnalysisInput::try_from(draft).expect("valid draft");
        assert_eq!(input.address(), "서울특별시 중구 세종대로 110");
        assert_eq!(input.service_type(), ServiceType::General);
        assert_eq!(input.location(), KnownLocation::Unresolved);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-12.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_unusable_areas(mut draft: SiteAnalysisDraft, #[case] area: f64) {
        draft.area = area;
        let err = SiteAnalysisInput::try_from(draft).expect_err("area must be rejected");
        assert_eq!(err.field, "area");
    }

    #[rstest]
    fn rejects_unknown_service_type(mut draft: SiteAnalysisDraft) {
        draft.service_type = 2;
        let err = SiteAnalysisInput::try_from(draft).expect_err("service type must be rejected");
        assert_eq!(err.field, "serviceType");
    }

    #[rstest]
    fn rejects_blank_address(mut draft: SiteAnalysisDraft) {
        draft.address = "   ".to_owned();
        let err = SiteAnalysisInput::try_from(draft).expect_err("address must be rejected");
        assert_eq!(err.field, "address");
    }

    #[rstest]
    #[case(Some(126.97), Some(37.56), None, None, true)]
    #[case(Some(126.97), Some(37.56), Some(197_000.0), Some(551_000.0), true)]
    #[case(None, None, Some(197_000.0), Some(551_000.0), false)]
    #[case(Some(190.0), Some(37.56), None, None, false)]
    #[case(Some(126.97), Some(f64::NAN), None, None, false)]
    #[case(Some(126.97), None, None, None, false)]
    #[case(None, Some(37.56), None, None, false)]
    #[case(Some(126.97), Some(37.56), Some(197_000.0), None, false)]
    #[case(Some(126.97), Some(37.56), None, Some(551_000.0), false)]
    fn validates_client_coordinates(
        #[case] longitude: Option<f64>,
        #[case] latitude: Option<f64>,
        #[case] x: Option<f64>,
        #[case] y: Option<f64>,
        #[case] accepted: bool,
    ) {
        assert_eq!(
            KnownLocation::from_parts(longitude, latitude, x, y).is_ok(),
            accepted
        );
    }

    #[rstest]
    fn half_supplied_pair_is_rejected_on_coordinates(mut draft: SiteAnalysisDraft) {
        draft.longitude = Some(126.97);
        let err = SiteAnalysisInput::try_from(draft).expect_err("latitude is missing");
        assert_eq!(err.field, "coordinates");
        assert!(err.message.contains("longitude and latitude"));
    }

    #[rstest]
    fn service_type_round_trips_wire_values() {
        assert_eq!(ServiceType::try_from(0), Ok(ServiceType::RestStop));
        assert_eq!(i64::from(ServiceType::General), 1);
        assert_eq!(ServiceType::RestStop.label(), "휴게음식점");
    }
}
