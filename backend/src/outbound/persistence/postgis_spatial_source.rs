//! PostGIS-backed spatial data source.
//!
//! Every aggregate is one `ST_DWithin` query against a layer table in
//! EPSG:5186, so buffering and index use stay inside PostGIS. Table names
//! come from the fixed candidate lists in [`crate::domain::SpatialLayer`],
//! never from user input. Each query checks out its own pooled connection.

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text};
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{SpatialDataSource, SpatialQueryError};
use crate::domain::{ForeignerCounts, LayerTable, PopulationCounts, ProjectedPoint, StoreCounts};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_spatial_error};
use super::pool::DbPool;

/// Buffer centre bound as `$1`/`$2`, radius as `$3`.
const CENTRE: &str = "ST_SetSRID(ST_MakePoint($1, $2), 5186)";

#[derive(Debug, QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    present: bool,
}

#[derive(Debug, QueryableByName)]
struct PopulationRow {
    #[diesel(sql_type = Double)]
    total: f64,
    #[diesel(sql_type = Double)]
    age_20s: f64,
    #[diesel(sql_type = Double)]
    age_30s: f64,
    #[diesel(sql_type = Double)]
    age_40s: f64,
    #[diesel(sql_type = Double)]
    age_50s: f64,
    #[diesel(sql_type = Double)]
    age_60_plus: f64,
}

#[derive(Debug, QueryableByName)]
struct TotalRow {
    #[diesel(sql_type = Double)]
    total: f64,
}

#[derive(Debug, QueryableByName)]
struct ForeignerRow {
    #[diesel(sql_type = Double)]
    total: f64,
    #[diesel(sql_type = Double)]
    chinese: f64,
}

#[derive(Debug, QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(Debug, QueryableByName)]
struct StoreRow {
    #[diesel(sql_type = BigInt)]
    competitors: i64,
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    distinct_categories: i64,
}

#[derive(Debug, QueryableByName)]
struct LandPriceRow {
    #[diesel(sql_type = Nullable<Double>)]
    unit_price: Option<f64>,
}

fn resident_population_sql(table: LayerTable) -> String {
    format!(
        "SELECT \
            COALESCE(SUM(total_pop), 0)::float8 AS total, \
            COALESCE(SUM(pop_20s), 0)::float8 AS age_20s, \
            COALESCE(SUM(pop_30s), 0)::float8 AS age_30s, \
            COALESCE(SUM(pop_40s), 0)::float8 AS age_40s, \
            COALESCE(SUM(pop_50s), 0)::float8 AS age_50s, \
            COALESCE(SUM(pop_60_plus), 0)::float8 AS age_60_plus \
         FROM \"{table}\" WHERE ST_DWithin(geom, {CENTRE}, $3)"
    )
}

fn working_population_sql(table: LayerTable) -> String {
    format!(
        "SELECT COALESCE(SUM(total_pop), 0)::float8 AS total \
         FROM \"{table}\" WHERE ST_DWithin(geom, {CENTRE}, $3)"
    )
}

fn foreign_residents_sql(table: LayerTable) -> String {
    format!(
        "SELECT \
            COALESCE(SUM(total_pop), 0)::float8 AS total, \
            COALESCE(SUM(chinese_pop), 0)::float8 AS chinese \
         FROM \"{table}\" WHERE ST_DWithin(geom, {CENTRE}, $3)"
    )
}

fn count_features_sql(table: LayerTable) -> String {
    format!(
        "SELECT COUNT(*)::int8 AS count \
         FROM \"{table}\" WHERE ST_DWithin(geom, {CENTRE}, $3)"
    )
}

fn store_counts_sql(table: LayerTable) -> String {
    format!(
        "SELECT \
            COUNT(*) FILTER (WHERE category = $4) AS competitors, \
            COUNT(*)::int8 AS total, \
            COUNT(DISTINCT category)::int8 AS distinct_categories \
         FROM \"{table}\" WHERE ST_DWithin(geom, {CENTRE}, $3)"
    )
}

fn nearest_land_price_sql(table: LayerTable) -> String {
    format!(
        "SELECT unit_price::float8 AS unit_price \
         FROM \"{table}\" ORDER BY geom <-> {CENTRE} LIMIT 1"
    )
}

/// Spatial source issuing PostGIS buffer queries through a Diesel pool.
#[derive(Clone)]
pub struct PostgisSpatialSource {
    pool: DbPool,
}

impl PostgisSpatialSource {
    /// Create a new source with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, SpatialQueryError> {
        self.pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, SpatialQueryError::connection))
    }
}

#[async_trait]
impl SpatialDataSource for PostgisSpatialSource {
    async fn table_exists(&self, table: &str) -> Result<bool, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: ExistsRow = sql_query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind::<Text, _>(table)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "table probe"))?;
        Ok(row.present)
    }

    async fn resident_population(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<PopulationCounts, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: PopulationRow = sql_query(resident_population_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .bind::<Double, _>(radius_m)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "resident population"))?;
        Ok(PopulationCounts {
            total: row.total,
            age_20s: row.age_20s,
            age_30s: row.age_30s,
            age_40s: row.age_40s,
            age_50s: row.age_50s,
            age_60_plus: row.age_60_plus,
        })
    }

    async fn working_population(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<f64, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: TotalRow = sql_query(working_population_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .bind::<Double, _>(radius_m)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "working population"))?;
        Ok(row.total)
    }

    async fn foreign_residents(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<ForeignerCounts, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: ForeignerRow = sql_query(foreign_residents_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .bind::<Double, _>(radius_m)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "foreign residents"))?;
        Ok(ForeignerCounts {
            total: row.total,
            chinese: row.chinese,
        })
    }

    async fn count_features(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<i64, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: CountRow = sql_query(count_features_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .bind::<Double, _>(radius_m)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "feature count"))?;
        Ok(row.count)
    }

    async fn store_counts(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
        category: &str,
    ) -> Result<StoreCounts, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let row: StoreRow = sql_query(store_counts_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .bind::<Double, _>(radius_m)
            .bind::<Text, _>(category)
            .get_result(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "store counts"))?;
        Ok(StoreCounts {
            competitors: row.competitors,
            total: row.total,
            distinct_categories: row.distinct_categories,
        })
    }

    async fn nearest_land_price(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
    ) -> Result<Option<f64>, SpatialQueryError> {
        let mut conn = self.connection().await?;
        let rows: Vec<LandPriceRow> = sql_query(nearest_land_price_sql(table))
            .bind::<Double, _>(centre.x())
            .bind::<Double, _>(centre.y())
            .load(&mut conn)
            .await
            .map_err(|error| map_spatial_error(error, "nearest land price"))?;
        Ok(rows.into_iter().next().and_then(|row| row.unit_price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayerCatalogue, SpatialLayer};
    use rstest::rstest;

    fn preferred(layer: SpatialLayer) -> LayerTable {
        LayerCatalogue::preferred()
            .table(layer)
            .expect("preferred catalogue resolves every layer")
    }

    #[rstest]
    fn buffer_queries_quote_the_resolved_table() {
        let sql = resident_population_sql(preferred(SpatialLayer::ResidentPopulation));
        assert!(sql.contains("FROM \"life_pop_grid_10m_5186\""));
        assert!(sql.contains("ST_DWithin(geom, ST_SetSRID(ST_MakePoint($1, $2), 5186), $3)"));
    }

    #[rstest]
    fn store_query_binds_category_as_fourth_parameter() {
        let sql = store_counts_sql(preferred(SpatialLayer::Stores));
        assert!(sql.contains("WHERE category = $4"));
        assert!(sql.contains("COUNT(DISTINCT category)"));
    }

    #[rstest]
    fn land_value_orders_by_distance_without_radius() {
        let sql = nearest_land_price_sql(preferred(SpatialLayer::LandValue));
        assert!(sql.contains("ORDER BY geom <->"));
        assert!(sql.ends_with("LIMIT 1"));
        assert!(!sql.contains("$3"));
    }

    #[rstest]
    #[case(working_population_sql(preferred(SpatialLayer::WorkingPopulation)))]
    #[case(foreign_residents_sql(preferred(SpatialLayer::TemporaryForeigners)))]
    #[case(count_features_sql(preferred(SpatialLayer::Schools)))]
    fn sums_default_to_zero_over_empty_buffers(#[case] sql: String) {
        assert!(sql.contains("COALESCE(") || sql.contains("COUNT(*)"));
    }
}
