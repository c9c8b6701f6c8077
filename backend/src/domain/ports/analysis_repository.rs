//! Driven port for persisting analysis requests and their results.
//!
//! A request row and its result row are written together; adapters must make
//! [`AnalysisRepository::save`] atomic.

use async_trait::async_trait;

use crate::domain::{AnalysisId, AnalysisRecord, AnalysisSummary, HistoryPage, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by analysis persistence adapters.
    pub enum AnalysisRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "analysis repository connection failed: {message}",
        /// Query or transaction failed during execution.
        Query { message: String } =>
            "analysis repository query failed: {message}",
        /// A stored row could not be mapped back into a record.
        Corrupt { message: String } =>
            "analysis repository returned invalid data: {message}",
    }
}

/// Port for analysis storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Insert the request and result rows in one transaction.
    async fn save(&self, record: &AnalysisRecord) -> Result<(), AnalysisRepositoryError>;

    /// Load a record by id.
    async fn find(&self, id: &AnalysisId)
    -> Result<Option<AnalysisRecord>, AnalysisRepositoryError>;

    /// Newest-first summaries of one owner's analyses.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<AnalysisSummary>, AnalysisRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAnalysisRepository;

#[async_trait]
impl AnalysisRepository for FixtureAnalysisRepository {
    async fn save(&self, _record: &AnalysisRecord) -> Result<(), AnalysisRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _id: &AnalysisId,
    ) -> Result<Option<AnalysisRecord>, AnalysisRepositoryError> {
        Ok(None)
    }

    async fn list_for_owner(
        &self,
        _owner: &UserId,
        _page: HistoryPage,
    ) -> Result<Vec<AnalysisSummary>, AnalysisRepositoryError> {
        Ok(Vec::new())
    }
}
