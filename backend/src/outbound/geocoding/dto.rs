//! DTOs for decoding Kakao Local address search responses.
//!
//! Coordinates arrive as decimal strings; `x` is longitude and `y` latitude.

use serde::Deserialize;

use crate::domain::Wgs84Point;

#[derive(Debug, Deserialize)]
pub(super) struct AddressSearchDto {
    #[serde(default)]
    pub(super) documents: Vec<AddressDocumentDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressDocumentDto {
    #[serde(default)]
    pub(super) address_name: Option<String>,
    pub(super) x: String,
    pub(super) y: String,
}

impl AddressSearchDto {
    /// First match as a point; `Ok(None)` when there are no documents.
    pub(super) fn into_first_point(self) -> Result<Option<Wgs84Point>, String> {
        self.documents
            .into_iter()
            .next()
            .map(AddressDocumentDto::into_point)
            .transpose()
    }
}

impl AddressDocumentDto {
    fn into_point(self) -> Result<Wgs84Point, String> {
        let label = self.address_name.as_deref().unwrap_or("<unnamed>");
        let longitude = parse_coordinate("x", &self.x, label)?;
        let latitude = parse_coordinate("y", &self.y, label)?;
        Wgs84Point::new(longitude, latitude)
            .map_err(|error| format!("document {label} has invalid coordinates: {error}"))
    }
}

fn parse_coordinate(axis: &str, raw: &str, label: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|error| format!("document {label} has non-numeric {axis} {raw:?}: {error}"))
}
