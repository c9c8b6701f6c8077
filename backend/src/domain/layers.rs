//! GIS layer resolution.
//!
//! Layer tables have been renamed across data loads, so each layer carries an
//! ordered list of candidate table names. [`LayerCatalogue::resolve`] probes
//! them once at startup and keeps the first that exists. Only names from
//! these lists can become a [`LayerTable`], which is what lets adapters
//! interpolate them into SQL.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use super::ports::{SpatialDataSource, SpatialQueryError};

/// Reference layer consumed by the spatial aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpatialLayer {
    /// Resident population grid with age-decade columns.
    ResidentPopulation,
    /// Workplace population grid.
    WorkingPopulation,
    /// Short-term foreign residents grid.
    TemporaryForeigners,
    /// Long-term foreign residents grid.
    LongTermForeigners,
    /// Public building footprints.
    PublicBuildings,
    /// School locations.
    Schools,
    /// Store points with category names.
    Stores,
    /// Land-value parcels.
    LandValue,
}

impl SpatialLayer {
    /// Every layer.
    pub const ALL: [Self; 8] = [
        Self::ResidentPopulation,
        Self::WorkingPopulation,
        Self::TemporaryForeigners,
        Self::LongTermForeigners,
        Self::PublicBuildings,
        Self::Schools,
        Self::Stores,
        Self::LandValue,
    ];

    /// Candidate table names in priority order.
    #[must_use]
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::ResidentPopulation => &[
                "life_pop_grid_10m_5186",
                "life_pop_grid_5186",
                "life_pop_grid",
            ],
            Self::WorkingPopulation => &[
                "workgroup_grid_10m_5186",
                "work_pop_grid_5186",
                "work_pop_grid",
            ],
            Self::TemporaryForeigners => &[
                "temp_foreign_residence_grid_5186",
                "temp_foreign_grid_5186",
                "temp_foreign_grid",
            ],
            Self::LongTermForeigners => &[
                "long_foreign_residence_grid_5186",
                "long_foreign_grid_5186",
                "long_foreign_grid",
            ],
            Self::PublicBuildings => &["public_building_5186", "public_building"],
            Self::Schools => &["school_5186", "school"],
            Self::Stores => &["store_point_5186", "store_point"],
            Self::LandValue => &["land_value_5186", "land_value"],
        }
    }
}

impl fmt::Display for SpatialLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResidentPopulation => "resident_population",
            Self::WorkingPopulation => "working_population",
            Self::TemporaryForeigners => "temporary_foreigners",
            Self::LongTermForeigners => "long_term_foreigners",
            Self::PublicBuildings => "public_buildings",
            Self::Schools => "schools",
            Self::Stores => "stores",
            Self::LandValue => "land_value",
        };
        f.write_str(name)
    }
}

/// A table name taken from a layer's candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerTable(&'static str);

impl LayerTable {
    /// Table name as it appears in the datastore.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for LayerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Resolved table per layer; layers without an existing table are missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerCatalogue {
    tables: BTreeMap<SpatialLayer, LayerTable>,
}

impl LayerCatalogue {
    /// Probe every candidate in priority order and keep the first match.
    ///
    /// # Errors
    /// Propagates [`SpatialQueryError`] when the datastore cannot be probed.
    pub async fn resolve(source: &dyn SpatialDataSource) -> Result<Self, SpatialQueryError> {
        let mut tables = BTreeMap::new();
        for layer in SpatialLayer::ALL {
            let mut resolved = None;
            for candidate in layer.candidates() {
                if source.table_exists(candidate).await? {
                    resolved = Some(LayerTable(*candidate));
                    break;
                }
            }
            match resolved {
                Some(table) => {
                    info!(%layer, %table, "resolved spatial layer");
                    tables.insert(layer, table);
                }
                None => warn!(
                    %layer,
                    candidates = ?layer.candidates(),
                    "no table found for spatial layer; its metrics will be unavailable"
                ),
            }
        }
        Ok(Self { tables })
    }

    /// Catalogue pointing every layer at its first candidate.
    #[must_use]
    pub fn preferred() -> Self {
        let tables = SpatialLayer::ALL
            .into_iter()
            .filter_map(|layer| {
                layer
                    .candidates()
                    .first()
                    .map(|name| (layer, LayerTable(*name)))
            })
            .collect();
        Self { tables }
    }

    /// Copy of this catalogue with `layer` marked missing.
    #[must_use]
    pub fn without(mut self, layer: SpatialLayer) -> Self {
        self.tables.remove(&layer);
        self
    }

    /// Table for `layer`, if one exists.
    #[must_use]
    pub fn table(&self, layer: SpatialLayer) -> Option<LayerTable> {
        self.tables.get(&layer).copied()
    }

    /// Layers with no existing table.
    #[must_use]
    pub fn missing_layers(&self) -> Vec<SpatialLayer> {
        SpatialLayer::ALL
            .into_iter()
            .filter(|layer| !self.tables.contains_key(layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSpatialDataSource;
    use rstest::rstest;

    fn source_with_tables(existing: &'static [&'static str]) -> MockSpatialDataSource {
        let mut source = MockSpatialDataSource::new();
        source
            .expect_table_exists()
            .returning(move |table| Ok(existing.iter().any(|name| *name == table)));
        source
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_prefers_first_existing_candidate() {
        let source = source_with_tables(&["life_pop_grid_5186", "life_pop_grid", "school"]);

        let catalogue = LayerCatalogue::resolve(&source)
            .await
            .expect("probing succeeds");

        assert_eq!(
            catalogue
                .table(SpatialLayer::ResidentPopulation)
                .map(LayerTable::as_str),
            Some("life_pop_grid_5186")
        );
        assert_eq!(
            catalogue.table(SpatialLayer::Schools).map(LayerTable::as_str),
            Some("school")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn layers_without_tables_are_missing() {
        let source = source_with_tables(&["store_point"]);

        let catalogue = LayerCatalogue::resolve(&source)
            .await
            .expect("probing succeeds");

        let missing = catalogue.missing_layers();
        assert_eq!(missing.len(), SpatialLayer::ALL.len() - 1);
        assert!(!missing.contains(&SpatialLayer::Stores));
    }

    #[rstest]
    #[tokio::test]
    async fn probe_failures_propagate() {
        let mut source = MockSpatialDataSource::new();
        source
            .expect_table_exists()
            .times(1)
            .returning(|_| Err(SpatialQueryError::connection("pool exhausted")));

        let result = LayerCatalogue::resolve(&source).await;

        assert!(matches!(result, Err(SpatialQueryError::Connection { .. })));
    }

    #[rstest]
    fn preferred_catalogue_covers_every_layer() {
        let catalogue = LayerCatalogue::preferred();
        assert!(catalogue.missing_layers().is_empty());
        let catalogue = catalogue.without(SpatialLayer::LandValue);
        assert_eq!(catalogue.missing_layers(), vec![SpatialLayer::LandValue]);
    }
}
