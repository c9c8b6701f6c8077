//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` name the
//! offending wire field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{AnalysisId, Error, HistoryPage, HistoryPageError, SiteDraftError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidField,
    InvalidPaging,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidField => "invalid_field",
            Self::InvalidPaging => "invalid_paging",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_analysis_id(value: &str, field: FieldName) -> Result<AnalysisId, Error> {
    value.parse::<AnalysisId>().map_err(|_| {
        let field = field.as_str();
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

pub(crate) fn site_draft_error(error: SiteDraftError) -> Error {
    field_error(error.field, ErrorCode::InvalidField, error.to_string())
}

pub(crate) fn parse_history_page(
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<HistoryPage, Error> {
    HistoryPage::new(limit, offset).map_err(|error| {
        let field = match error {
            HistoryPageError::LimitOutOfRange { .. } => "limit",
            HistoryPageError::NegativeOffset { .. } => "offset",
        };
        field_error(field, ErrorCode::InvalidPaging, error.to_string())
    })
}
