//! Aggregate values produced by the spatial buffer queries.
//!
//! Raw per-query observations ([`PopulationCounts`], [`ForeignerCounts`],
//! [`StoreCounts`]) come from the spatial data source. This module derives
//! ratios from them and collects every query outcome into an
//! [`AggregationReport`] that keeps computed zeros apart from metrics whose
//! query failed.

use serde::{Deserialize, Serialize};

/// Percentage of `part` in `whole`; a zero or invalid denominator yields 0.
///
/// # Examples
/// ```
/// use locaai::domain::ratio_percent;
///
/// assert_eq!(ratio_percent(3.0, 12.0), 25.0);
/// assert_eq!(ratio_percent(3.0, 0.0), 0.0);
/// ```
#[must_use]
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    if !whole.is_finite() || !part.is_finite() || whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// Resident population counts inside one buffer, split by age decade.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopulationCounts {
    /// All residents.
    pub total: f64,
    /// Residents in their twenties.
    pub age_20s: f64,
    /// Residents in their thirties.
    pub age_30s: f64,
    /// Residents in their forties.
    pub age_40s: f64,
    /// Residents in their fifties.
    pub age_50s: f64,
    /// Residents aged sixty and over.
    pub age_60_plus: f64,
}

/// Population total with per-decade shares in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopulationProfile {
    /// All residents.
    pub total: f64,
    /// Shares for 20s, 30s, 40s, 50s and 60+.
    pub age_ratios: [f64; 5],
}

impl From<PopulationCounts> for PopulationProfile {
    fn from(counts: PopulationCounts) -> Self {
        let share = |part| ratio_percent(part, counts.total);
        Self {
            total: counts.total,
            age_ratios: [
                share(counts.age_20s),
                share(counts.age_30s),
                share(counts.age_40s),
                share(counts.age_50s),
                share(counts.age_60_plus),
            ],
        }
    }
}

/// Foreign-resident counts inside one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForeignerCounts {
    /// All foreign residents.
    pub total: f64,
    /// Chinese nationals.
    pub chinese: f64,
}

impl ForeignerCounts {
    /// Chinese-national share in percent.
    #[must_use]
    pub fn chinese_ratio(&self) -> f64 {
        ratio_percent(self.chinese, self.total)
    }
}

/// Store-point counts inside one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    /// Stores of the requested category.
    pub competitors: i64,
    /// All stores.
    pub total: i64,
    /// Distinct store categories.
    pub distinct_categories: i64,
}

impl StoreCounts {
    /// Competitor share of all stores in percent.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "store counts stay far below 2^52"
    )]
    pub fn competitor_ratio(&self) -> f64 {
        ratio_percent(self.competitors as f64, self.total as f64)
    }
}

/// One independent buffer query run for every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricGroup {
    /// Resident population at 300 m.
    ResidentPopulation300m,
    /// Resident population at 1000 m.
    ResidentPopulation1000m,
    /// Workplace population at 300 m.
    WorkingPopulation300m,
    /// Short-term foreigners at 300 m.
    TemporaryForeigners300m,
    /// Short-term foreigners at 1000 m.
    TemporaryForeigners1000m,
    /// Long-term foreigners at 300 m.
    LongTermForeigners300m,
    /// Long-term foreigners at 1000 m.
    LongTermForeigners1000m,
    /// Public buildings at 250 m.
    PublicBuildings250m,
    /// Schools at 250 m.
    Schools250m,
    /// Store points at 300 m.
    Stores300m,
    /// Nearest land-value parcel.
    LandValue,
}

impl MetricGroup {
    /// Every group in execution order.
    pub const ALL: [Self; 11] = [
        Self::ResidentPopulation300m,
        Self::ResidentPopulation1000m,
        Self::WorkingPopulation300m,
        Self::TemporaryForeigners300m,
        Self::TemporaryForeigners1000m,
        Self::LongTermForeigners300m,
        Self::LongTermForeigners1000m,
        Self::PublicBuildings250m,
        Self::Schools250m,
        Self::Stores300m,
        Self::LandValue,
    ];

    /// Names of the metrics this group fills.
    #[must_use]
    pub fn metric_names(self) -> &'static [&'static str] {
        match self {
            Self::ResidentPopulation300m => &[
                "life_pop_300m",
                "life_pop_20_300m",
                "life_pop_30_300m",
                "life_pop_40_300m",
                "life_pop_50_300m",
                "life_pop_60_300m",
            ],
            Self::ResidentPopulation1000m => &[
                "life_pop_1000m",
                "life_pop_20_1000m",
                "life_pop_30_1000m",
                "life_pop_40_1000m",
                "life_pop_50_1000m",
                "life_pop_60_1000m",
            ],
            Self::WorkingPopulation300m => &["working_pop_300m"],
            Self::TemporaryForeigners300m => &["temp_foreign_cn_300m"],
            Self::TemporaryForeigners1000m => &["temp_foreign_1000m", "temp_foreign_cn_1000m"],
            Self::LongTermForeigners300m => &["long_foreign_300m"],
            Self::LongTermForeigners1000m => &["long_foreign_1000m", "long_foreign_cn_1000m"],
            Self::PublicBuildings250m => &["public_building_250m"],
            Self::Schools250m => &["school_250m"],
            Self::Stores300m => &[
                "competitor_300m",
                "adjacent_biz_300m",
                "competitor_ratio_300m",
                "business_diversity_300m",
            ],
            Self::LandValue => &["land_unit_price", "total_land_value"],
        }
    }
}

/// Flat aggregate values; metrics whose query failed hold 0.
///
/// Field names match the stored result columns and the entries of
/// [`AggregationReport::unavailable_metrics`], so they serialise unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteMetrics {
    pub life_pop_300m: f64,
    pub life_pop_20_300m: f64,
    pub life_pop_30_300m: f64,
    pub life_pop_40_300m: f64,
    pub life_pop_50_300m: f64,
    pub life_pop_60_300m: f64,
    pub life_pop_1000m: f64,
    pub life_pop_20_1000m: f64,
    pub life_pop_30_1000m: f64,
    pub life_pop_40_1000m: f64,
    pub life_pop_50_1000m: f64,
    pub life_pop_60_1000m: f64,
    pub working_pop_300m: f64,
    pub temp_foreign_1000m: f64,
    pub temp_foreign_cn_300m: f64,
    pub temp_foreign_cn_1000m: f64,
    pub long_foreign_300m: f64,
    pub long_foreign_1000m: f64,
    pub long_foreign_cn_1000m: f64,
    pub public_building_250m: i64,
    pub school_250m: i64,
    pub competitor_300m: i64,
    pub adjacent_biz_300m: i64,
    pub competitor_ratio_300m: f64,
    pub business_diversity_300m: i64,
    pub land_unit_price: f64,
    pub total_land_value: f64,
}

/// A metric group whose query failed, with the logged reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableGroup {
    /// Which query failed.
    pub group: MetricGroup,
    /// Adapter error or missing-layer description.
    pub reason: String,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationReport {
    metrics: SiteMetrics,
    unavailable: Vec<UnavailableGroup>,
}

impl AggregationReport {
    /// Start an empty report where every value is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the resident population profile for a radius group.
    pub fn record_resident_population(&mut self, group: MetricGroup, profile: PopulationProfile) {
        let m = &mut self.metrics;
        let [r20, r30, r40, r50, r60] = profile.age_ratios;
        match group {
            MetricGroup::ResidentPopulation300m => {
                m.life_pop_300m = profile.total;
                m.life_pop_20_300m = r20;
                m.life_pop_30_300m = r30;
                m.life_pop_40_300m = r40;
                m.life_pop_50_300m = r50;
                m.life_pop_60_300m = r60;
            }
            MetricGroup::ResidentPopulation1000m => {
                m.life_pop_1000m = profile.total;
                m.life_pop_20_1000m = r20;
                m.life_pop_30_1000m = r30;
                m.life_pop_40_1000m = r40;
                m.life_pop_50_1000m = r50;
                m.life_pop_60_1000m = r60;
            }
            _ => {}
        }
    }

    /// Record the workplace population at 300 m.
    pub fn record_working_population(&mut self, total: f64) {
        self.metrics.working_pop_300m = total;
    }

    /// Record foreign-resident counts for one of the foreigner groups.
    pub fn record_foreigners(&mut self, group: MetricGroup, counts: ForeignerCounts) {
        let m = &mut self.metrics;
        match group {
            MetricGroup::TemporaryForeigners300m => {
                m.temp_foreign_cn_300m = counts.chinese_ratio();
            }
            MetricGroup::TemporaryForeigners1000m => {
                m.temp_foreign_1000m = counts.total;
                m.temp_foreign_cn_1000m = counts.chinese_ratio();
            }
            MetricGroup::LongTermForeigners300m => {
                m.long_foreign_300m = counts.total;
            }
            MetricGroup::LongTermForeigners1000m => {
                m.long_foreign_1000m = counts.total;
                m.long_foreign_cn_1000m = counts.chinese_ratio();
            }
            _ => {}
        }
    }

    /// Record a plain feature count (public buildings or schools).
    pub fn record_count(&mut self, group: MetricGroup, count: i64) {
        match group {
            MetricGroup::PublicBuildings250m => self.metrics.public_building_250m = count,
            MetricGroup::Schools250m => self.metrics.school_250m = count,
            _ => {}
        }
    }

    /// Record store counts and the derived competitor ratio.
    pub fn record_stores(&mut self, counts: StoreCounts) {
        let m = &mut self.metrics;
        m.competitor_300m = counts.competitors;
        m.adjacent_biz_300m = counts.total;
        m.competitor_ratio_300m = counts.competitor_ratio();
        m.business_diversity_300m = counts.distinct_categories;
    }

    /// Record the nearest parcel's unit price and derive the total value.
    pub fn record_land_value(&mut self, unit_price: f64, area_square_metres: f64) {
        self.metrics.land_unit_price = unit_price;
        self.metrics.total_land_value = unit_price * area_square_metres;
    }

    /// Mark a group as failed; its metrics keep their default of 0.
    pub fn mark_unavailable(&mut self, group: MetricGroup, reason: impl Into<String>) {
        self.unavailable.push(UnavailableGroup {
            group,
            reason: reason.into(),
        });
    }

    /// Aggregate values.
    #[must_use]
    pub fn metrics(&self) -> &SiteMetrics {
        &self.metrics
    }

    /// Failed groups in the order they were recorded.
    #[must_use]
    pub fn unavailable_groups(&self) -> &[UnavailableGroup] {
        &self.unavailable
    }

    /// Names of every metric whose query failed.
    #[must_use]
    pub fn unavailable_metrics(&self) -> Vec<String> {
        self.unavailable
            .iter()
            .flat_map(|entry| entry.group.metric_names().iter())
            .map(|name| (*name).to_owned())
            .collect()
    }

    /// Split into values and unavailable metric names.
    #[must_use]
    pub fn into_parts(self) -> (SiteMetrics, Vec<String>) {
        let names = self.unavailable_metrics();
        (self.metrics, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 0.0, 0.0)]
    #[case(0.0, 0.0, 0.0)]
    #[case(5.0, -1.0, 0.0)]
    #[case(5.0, f64::NAN, 0.0)]
    #[case(1.0, 4.0, 25.0)]
    fn ratio_never_divides_by_zero(#[case] part: f64, #[case] whole: f64, #[case] expected: f64) {
        assert_eq!(ratio_percent(part, whole), expected);
    }

    #[rstest]
    fn population_profile_uses_total_as_denominator() {
        let profile = PopulationProfile::from(PopulationCounts {
            total: 200.0,
            age_20s: 50.0,
            age_30s: 40.0,
            age_40s: 30.0,
            age_50s: 20.0,
            age_60_plus: 10.0,
        });
        assert_eq!(profile.age_ratios, [25.0, 20.0, 15.0, 10.0, 5.0]);
    }

    #[rstest]
    fn empty_population_has_zero_ratios() {
        let profile = PopulationProfile::from(PopulationCounts::default());
        assert_eq!(profile.age_ratios, [0.0; 5]);
    }

    #[rstest]
    #[case(StoreCounts { competitors: 3, total: 12, distinct_categories: 5 }, 25.0)]
    #[case(StoreCounts { competitors: 0, total: 0, distinct_categories: 0 }, 0.0)]
    fn competitor_ratio_is_a_percentage(#[case] counts: StoreCounts, #[case] expected: f64) {
        assert_eq!(counts.competitor_ratio(), expected);
    }

    #[rstest]
    fn land_value_scales_with_area() {
        let mut report = AggregationReport::new();
        report.record_land_value(5_000_000.0, 50.0);
        assert_eq!(report.metrics().total_land_value, 250_000_000.0);
    }

    #[rstest]
    fn unavailable_groups_expand_to_metric_names() {
        let mut report = AggregationReport::new();
        report.mark_unavailable(MetricGroup::LandValue, "relation missing");
        report.mark_unavailable(MetricGroup::Schools250m, "timeout");
        assert_eq!(
            report.unavailable_metrics(),
            vec!["land_unit_price", "total_land_value", "school_250m"]
        );
        assert_eq!(report.metrics().total_land_value, 0.0);
    }

    #[rstest]
    fn computed_zero_is_not_unavailable() {
        let mut report = AggregationReport::new();
        report.record_count(MetricGroup::Schools250m, 0);
        assert!(report.unavailable_metrics().is_empty());
    }

    #[rstest]
    fn every_group_names_at_least_one_metric() {
        for group in MetricGroup::ALL {
            assert!(!group.metric_names().is_empty(), "{group:?}");
        }
    }
}
