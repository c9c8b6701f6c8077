//! Reqwest-backed Kakao Local geocoder adapter.
//!
//! This adapter owns transport details only: request construction, timeout
//! and HTTP error mapping, and JSON decoding into a WGS84 point. Failures are
//! never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::AddressSearchDto;
use crate::domain::Wgs84Point;
use crate::domain::ports::{Geocoder, GeocoderError};

const DEFAULT_ENDPOINT: &str = "https://dapi.kakao.com/v2/local/search/address.json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint, credentials and timeout for the Kakao address search API.
pub struct KakaoGeocoderConfig {
    /// Address search endpoint.
    pub endpoint: Url,
    /// REST API key sent as `Authorization: KakaoAK <key>`.
    pub api_key: Zeroizing<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl KakaoGeocoderConfig {
    /// Config for the public endpoint with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in endpoint fails to parse.
    pub fn with_key(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            api_key: Zeroizing::new(api_key.into()),
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

/// Geocoder adapter issuing one GET request per address.
pub struct KakaoHttpGeocoder {
    client: Client,
    endpoint: Url,
    authorization: Zeroizing<String>,
}

impl KakaoHttpGeocoder {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: KakaoGeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            authorization: Zeroizing::new(format!("KakaoAK {}", config.api_key.as_str())),
        })
    }
}

#[async_trait]
impl Geocoder for KakaoHttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Wgs84Point, GeocoderError> {
        let query = address.trim();
        if query.is_empty() {
            return Err(GeocoderError::not_found(address));
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::AUTHORIZATION, self.authorization.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("query", query)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let point = parse_first_point(body.as_ref())?
            .ok_or_else(|| GeocoderError::not_found(query))?;
        debug!(
            longitude = point.longitude(),
            latitude = point.latitude(),
            "geocoded address"
        );
        Ok(point)
    }
}

fn parse_first_point(body: &[u8]) -> Result<Option<Wgs84Point>, GeocoderError> {
    let decoded: AddressSearchDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid address search JSON payload: {error}"))
    })?;
    decoded.into_first_point().map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeocoderError::timeout(message)
        }
        _ => GeocoderError::upstream(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network geocoder mapping helpers.

    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_first_document_coordinates() {
        let body = r#"{
            "meta": { "total_count": 2 },
            "documents": [
                { "address_name": "서울 중구 세종대로 110", "x": "126.978388", "y": "37.566610" },
                { "address_name": "elsewhere", "x": "127.0", "y": "37.0" }
            ]
        }"#;

        let point = parse_first_point(body.as_bytes())
            .expect("JSON should decode")
            .expect("one match");

        assert_eq!(point.longitude(), 126.978_388);
        assert_eq!(point.latitude(), 37.566_61);
    }

    #[test]
    fn empty_documents_mean_no_match() {
        let body = r#"{ "meta": { "total_count": 0 }, "documents": [] }"#;

        let point = parse_first_point(body.as_bytes()).expect("JSON should decode");

        assert!(point.is_none());
    }

    #[rstest]
    #[case::not_json("<html>")]
    #[case::non_numeric(r#"{ "documents": [ { "x": "east", "y": "37.5" } ] }"#)]
    #[case::out_of_range(r#"{ "documents": [ { "x": "126.9", "y": "137.5" } ] }"#)]
    fn undecodable_bodies_map_to_decode(#[case] body: &str) {
        let error = parse_first_point(body.as_bytes()).expect_err("decode should fail");
        assert!(
            matches!(error, GeocoderError::Decode { .. }),
            "bad payloads should map to Decode, got {error:?}",
        );
    }

    #[rstest]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] is_timeout: bool) {
        let error = map_status_error(status, br#"{"errorType":"AccessDeniedError"}"#);
        if is_timeout {
            assert!(matches!(error, GeocoderError::Timeout { .. }));
        } else {
            assert!(matches!(error, GeocoderError::Upstream { .. }));
        }
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[test]
    fn long_bodies_are_truncated_in_previews() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[tokio::test]
    async fn blank_address_is_not_found_without_a_request() {
        let config = KakaoGeocoderConfig::with_key("test-key").expect("default endpoint parses");
        let geocoder = KakaoHttpGeocoder::new(config).expect("client builds");

        let error = geocoder.geocode("   ").await.expect_err("blank address");

        assert!(matches!(error, GeocoderError::NotFound { .. }));
    }
}
