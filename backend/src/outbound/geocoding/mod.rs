//! Geocoding outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `Geocoder` port
//! against the Kakao Local address search API.

mod dto;
mod kakao_http_geocoder;

pub use kakao_http_geocoder::{KakaoGeocoderConfig, KakaoHttpGeocoder};
