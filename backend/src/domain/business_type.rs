//! Restaurant categories used as filters, competitor keys and model input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for business type values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusinessTypeValidationError {
    /// Identifiers start at 1.
    #[error("business type id must be positive, got {value}")]
    NonPositiveId { value: i64 },
    /// Names are matched against the store layer and must be present.
    #[error("business type name must not be empty")]
    EmptyName,
}

/// Positive numeric business category identifier.
///
/// The raw value is also the `business_type_id` model feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BusinessTypeId(i32);

impl BusinessTypeId {
    /// Validate a raw identifier.
    ///
    /// # Errors
    /// Returns [`BusinessTypeValidationError::NonPositiveId`] for values
    /// outside `1..=i32::MAX`.
    pub fn new(value: i64) -> Result<Self, BusinessTypeValidationError> {
        i32::try_from(value)
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(BusinessTypeValidationError::NonPositiveId { value })
    }

    /// Raw database value.
    #[must_use]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for BusinessTypeId {
    type Error = BusinessTypeValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BusinessTypeId> for i64 {
    fn from(value: BusinessTypeId) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for BusinessTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named restaurant category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessType {
    id: BusinessTypeId,
    name: String,
}

impl BusinessType {
    /// Build a category after validating its name.
    ///
    /// # Errors
    /// Returns [`BusinessTypeValidationError::EmptyName`] for blank names.
    pub fn new(id: BusinessTypeId, name: impl Into<String>) -> Result<Self, BusinessTypeValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BusinessTypeValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
        })
    }

    /// Category identifier.
    #[must_use]
    pub fn id(&self) -> BusinessTypeId {
        self.id
    }

    /// Category display name, also used to match store-layer categories.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
