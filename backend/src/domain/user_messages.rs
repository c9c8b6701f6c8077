//! User-facing Korean messages for analysis failures.

/// Geocoder found no match for the address.
pub const ADDRESS_NOT_FOUND: &str = "입력하신 주소를 찾을 수 없습니다. 주소를 다시 확인해 주세요.";

/// Geocoding provider failed.
pub const GEOCODER_UNAVAILABLE: &str =
    "주소 검색 서비스에 일시적인 문제가 발생했습니다. 잠시 후 다시 시도해 주세요.";

/// Coordinate reprojection failed.
pub const PROJECTION_FAILED: &str = "좌표 변환 중 오류가 발생했습니다.";

/// Spatial datastore stayed locked after retries.
pub const DATASTORE_BUSY: &str =
    "분석 요청이 많아 데이터베이스가 혼잡합니다. 잠시 후 다시 시도해 주세요.";

/// Spatial datastore unreachable.
pub const ANALYSIS_FAILED: &str = "상권 분석 중 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.";

/// Result could not be saved.
pub const SAVE_FAILED: &str = "분석 결과를 저장하지 못했습니다. 다시 시도해 주세요.";

/// Unknown business category id.
pub const UNKNOWN_BUSINESS_TYPE: &str = "존재하지 않는 업종입니다.";

/// No stored analysis with the requested id.
pub const RESULT_NOT_FOUND: &str = "분석 결과를 찾을 수 없습니다.";

/// History requires a signed-in user.
pub const LOGIN_REQUIRED: &str = "로그인이 필요합니다.";
