//! Driving port for running a site analysis.

use async_trait::async_trait;

use crate::domain::{AnalysisRecord, Error, SiteAnalysisInput};

/// Domain use-case port for new analyses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteAnalysisCommand: Send + Sync {
    /// Geocode, aggregate, predict and persist one analysis.
    async fn analyze(&self, input: SiteAnalysisInput) -> Result<AnalysisRecord, Error>;
}
