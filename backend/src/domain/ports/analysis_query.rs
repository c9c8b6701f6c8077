//! Driving port for reading stored analyses and lookup data.

use async_trait::async_trait;

use crate::domain::{
    AnalysisId, AnalysisRecord, AnalysisSummary, BusinessType, Error, HistoryPage, PdfReport,
    UserId,
};

/// Domain use-case port for analysis reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisQuery: Send + Sync {
    /// Stored record by id.
    async fn result(&self, id: &AnalysisId) -> Result<AnalysisRecord, Error>;

    /// Display strings for PDF rendering.
    async fn pdf_report(&self, id: &AnalysisId) -> Result<PdfReport, Error>;

    /// One owner's analyses, newest first.
    async fn history(&self, owner: &UserId, page: HistoryPage)
    -> Result<Vec<AnalysisSummary>, Error>;

    /// Every business category.
    async fn business_types(&self) -> Result<Vec<BusinessType>, Error>;
}
