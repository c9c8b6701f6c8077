//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AnalysisRepository, AnalysisRepositoryError, SurvivalModel, SurvivalModelError,
};
use crate::domain::{
    AnalysisId, AnalysisRecord, AnalysisSummary, FeatureContract, HistoryPage, RetrySleeper,
    UserId,
};

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! Model and session-key fixtures are written through `cap_std::fs::Dir`
    //! so test suites share the same file access path as the loaders.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use locaai::test_support::cap_fs::write_file;
    ///
    /// let path = std::env::temp_dir().join("cap-fs-write-example.json");
    /// write_file(&path, b"{}")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path must include a file name")
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(file_name), contents)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2026-03-01 15:30 UTC, i.e. 2026-03-02 00:30 KST.
    #[must_use]
    pub fn march_first() -> Self {
        match Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).single() {
            Some(at) => Self(at),
            None => panic!("fixture timestamp is unambiguous"),
        }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Sleeper that returns at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl RetrySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far, in order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0).push(duration);
    }
}

/// Model answering a fixed probability for one vector width.
#[derive(Debug, Clone, Copy)]
pub struct FixedSurvivalModel {
    probability: f64,
    accepts: FeatureContract,
}

impl FixedSurvivalModel {
    /// Accept vectors shaped like `accepts`; reject every other width.
    #[must_use]
    pub fn new(probability: f64, accepts: FeatureContract) -> Self {
        Self {
            probability,
            accepts,
        }
    }
}

impl SurvivalModel for FixedSurvivalModel {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, SurvivalModelError> {
        if features.len() == self.accepts.width() {
            Ok(self.probability)
        } else {
            Err(SurvivalModelError::feature_count(
                self.accepts.width(),
                features.len(),
            ))
        }
    }
}

/// Analysis repository backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryAnalysisRepository {
    records: Mutex<HashMap<AnalysisId, AnalysisRecord>>,
}

impl InMemoryAnalysisRepository {
    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a record directly, bypassing the pipeline.
    pub fn insert(&self, record: AnalysisRecord) {
        lock(&self.records).insert(record.id, record);
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), AnalysisRepositoryError> {
        let mut records = lock(&self.records);
        if records.contains_key(&record.id) {
            return Err(AnalysisRepositoryError::query(format!(
                "duplicate analysis id {}",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find(
        &self,
        id: &AnalysisId,
    ) -> Result<Option<AnalysisRecord>, AnalysisRepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<AnalysisSummary>, AnalysisRepositoryError> {
        let records = lock(&self.records);
        let mut owned: Vec<&AnalysisRecord> = records
            .values()
            .filter(|record| record.owner.as_ref() == Some(owner))
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(0);
        Ok(owned
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| AnalysisSummary {
                id: record.id,
                address: record.address.clone(),
                business_type_id: record.business_type_id,
                service_type: record.service_type,
                survival_percentage: record.prediction.percentage(),
                created_at: record.created_at,
            })
            .collect())
    }
}
