//! Outbound adapters implementing domain ports against infrastructure.
//!
//! - **geocoding**: Kakao Local address search over HTTP
//! - **model**: in-process XGBoost JSON survival classifier
//! - **persistence**: Diesel repositories, PostGIS spatial queries and
//!   reprojection, embedded migrations
//!
//! Adapters translate between domain types and wire or row formats. They
//! contain no business logic.

pub mod geocoding;
pub mod model;
pub mod persistence;
