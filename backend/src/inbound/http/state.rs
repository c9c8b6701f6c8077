//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only depend on driving ports,
//! so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AnalysisQuery, LoginService, SiteAnalysisCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub analysis: Arc<dyn SiteAnalysisCommand>,
    pub analyses: Arc<dyn AnalysisQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use locaai::domain::ports::{AnalysisQuery, FixtureLoginService, SiteAnalysisCommand};
    /// use locaai::inbound::http::state::HttpState;
    ///
    /// fn build(
    ///     analysis: Arc<dyn SiteAnalysisCommand>,
    ///     analyses: Arc<dyn AnalysisQuery>,
    /// ) -> HttpState {
    ///     HttpState::new(Arc::new(FixtureLoginService), analysis, analyses)
    /// }
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        analysis: Arc<dyn SiteAnalysisCommand>,
        analyses: Arc<dyn AnalysisQuery>,
    ) -> Self {
        Self {
            login,
            analysis,
            analyses,
        }
    }
}
