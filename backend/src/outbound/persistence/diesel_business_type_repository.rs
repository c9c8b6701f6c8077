//! PostgreSQL-backed business type lookup.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BusinessTypeRepository, BusinessTypeRepositoryError};
use crate::domain::{BusinessType, BusinessTypeId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::BusinessTypeRow;
use super::pool::DbPool;
use super::schema::business_types;

/// Diesel-backed implementation of [`BusinessTypeRepository`].
#[derive(Clone)]
pub struct DieselBusinessTypeRepository {
    pool: DbPool,
}

impl DieselBusinessTypeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BusinessTypeRepositoryError {
    map_basic_diesel_error(
        error,
        "business type lookup",
        BusinessTypeRepositoryError::query,
        BusinessTypeRepositoryError::connection,
    )
}

fn row_to_domain(row: BusinessTypeRow) -> Result<BusinessType, BusinessTypeRepositoryError> {
    BusinessTypeId::new(i64::from(row.id))
        .and_then(|id| BusinessType::new(id, row.name))
        .map_err(|error| BusinessTypeRepositoryError::query(error.to_string()))
}

#[async_trait]
impl BusinessTypeRepository for DieselBusinessTypeRepository {
    async fn list(&self) -> Result<Vec<BusinessType>, BusinessTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|error| {
            map_basic_pool_error(error, BusinessTypeRepositoryError::connection)
        })?;
        let rows: Vec<BusinessTypeRow> = business_types::table
            .select(BusinessTypeRow::as_select())
            .order_by(business_types::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_domain).collect()
    }

    async fn find(
        &self,
        id: BusinessTypeId,
    ) -> Result<Option<BusinessType>, BusinessTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|error| {
            map_basic_pool_error(error, BusinessTypeRepositoryError::connection)
        })?;
        let row: Option<BusinessTypeRow> = business_types::table
            .filter(business_types::id.eq(id.get()))
            .select(BusinessTypeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_domain).transpose()
    }
}
