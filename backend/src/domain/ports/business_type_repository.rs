//! Driven port for the business category lookup table.

use async_trait::async_trait;

use crate::domain::{BusinessType, BusinessTypeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by business type adapters.
    pub enum BusinessTypeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "business type repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "business type repository query failed: {message}",
    }
}

/// Port for reading business categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessTypeRepository: Send + Sync {
    /// Every category ordered by id.
    async fn list(&self) -> Result<Vec<BusinessType>, BusinessTypeRepositoryError>;

    /// One category by id.
    async fn find(
        &self,
        id: BusinessTypeId,
    ) -> Result<Option<BusinessType>, BusinessTypeRepositoryError>;
}

/// Fixture repository exposing a small fixed set of categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureBusinessTypeRepository;

impl FixtureBusinessTypeRepository {
    const ENTRIES: [(i64, &'static str); 3] = [(1, "한식"), (2, "중식"), (7, "커피전문점")];

    fn entries() -> Result<Vec<BusinessType>, BusinessTypeRepositoryError> {
        Self::ENTRIES
            .iter()
            .map(|(id, name)| {
                BusinessTypeId::new(*id)
                    .and_then(|id| BusinessType::new(id, *name))
                    .map_err(|err| BusinessTypeRepositoryError::query(err.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl BusinessTypeRepository for FixtureBusinessTypeRepository {
    async fn list(&self) -> Result<Vec<BusinessType>, BusinessTypeRepositoryError> {
        Self::entries()
    }

    async fn find(
        &self,
        id: BusinessTypeId,
    ) -> Result<Option<BusinessType>, BusinessTypeRepositoryError> {
        Ok(Self::entries()?
            .into_iter()
            .find(|business_type| business_type.id() == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_finds_known_categories() {
        let repo = FixtureBusinessTypeRepository;
        let id = BusinessTypeId::new(7).expect("valid id");
        let found = repo.find(id).await.expect("lookup succeeds");
        assert_eq!(found.map(|bt| bt.name().to_owned()), Some("커피전문점".to_owned()));
        assert_eq!(repo.list().await.expect("list succeeds").len(), 3);
    }
}
