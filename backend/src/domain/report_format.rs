//! Display strings for client-side PDF rendering.
//!
//! Counts use thousands separators with a Korean unit suffix, ratios carry
//! one decimal and a percent sign, money is whole won. Timestamps render in
//! Korea Standard Time.

use chrono::{DateTime, FixedOffset, Utc};

use super::analysis::{AnalysisRecord, Narrative};
use super::business_type::BusinessType;

const KST_OFFSET_SECONDS: i32 = 9 * 3600;

/// Survival grade bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivalGrade {
    /// 70 % and above.
    High,
    /// 50 % up to 70 %.
    Medium,
    /// Below 50 %.
    Low,
}

impl SurvivalGrade {
    /// Band for a survival percentage.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 70.0 {
            Self::High
        } else if percentage >= 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Korean label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "높음",
            Self::Medium => "보통",
            Self::Low => "낮음",
        }
    }
}

/// Insert `,` every three digits.
///
/// # Examples
/// ```
/// use locaai::domain::group_thousands;
///
/// assert_eq!(group_thousands(1_234_567), "1,234,567");
/// assert_eq!(group_thousands(-950), "-950");
/// ```
#[must_use]
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "display values are rounded and far inside the i64 range"
)]
fn rounded(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Rounded count with a unit suffix, e.g. `1,234명`.
#[must_use]
pub fn format_count(value: f64, unit: &str) -> String {
    format!("{}{unit}", group_thousands(rounded(value)))
}

/// Percentage with one decimal, e.g. `12.3%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Whole won, e.g. `250,000,000원`.
#[must_use]
pub fn format_won(value: f64) -> String {
    format_count(value, "원")
}

/// Timestamp as `YYYY-MM-DD HH:MM` in KST.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    FixedOffset::east_opt(KST_OFFSET_SECONDS)
        .map_or_else(
            || at.format("%Y-%m-%d %H:%M").to_string(),
            |kst| at.with_timezone(&kst).format("%Y-%m-%d %H:%M").to_string(),
        )
}

/// Pre-formatted strings for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfReport {
    pub address: String,
    pub business_type_name: String,
    pub service_type_label: String,
    pub area: String,
    pub created_at: String,
    pub survival_percentage: String,
    pub survival_grade: String,
    pub life_pop_300m: String,
    pub life_pop_age_ratios_300m: [String; 5],
    pub life_pop_1000m: String,
    pub life_pop_age_ratios_1000m: [String; 5],
    pub working_pop_300m: String,
    pub temp_foreign_1000m: String,
    pub temp_foreign_cn_300m: String,
    pub temp_foreign_cn_1000m: String,
    pub long_foreign_300m: String,
    pub long_foreign_1000m: String,
    pub long_foreign_cn_1000m: String,
    pub public_building_250m: String,
    pub school_250m: String,
    pub competitor_300m: String,
    pub adjacent_biz_300m: String,
    pub competitor_ratio_300m: String,
    pub business_diversity_300m: String,
    pub land_unit_price: String,
    pub total_land_value: String,
    pub unavailable_metrics: Vec<String>,
    pub narrative: Narrative,
}

impl PdfReport {
    /// Format a stored record; `business_type` supplies the category name.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "counts are small integers formatted for display"
    )]
    pub fn from_record(record: &AnalysisRecord, business_type: Option<&BusinessType>) -> Self {
        let m = &record.metrics;
        let percentage = record.prediction.percentage();
        let people = |value: f64| format_count(value, "명");
        let places = |value: i64| format_count(value as f64, "개");

        Self {
            address: record.address.clone(),
            business_type_name: business_type.map_or_else(
                || record.business_type_id.to_string(),
                |bt| bt.name().to_owned(),
            ),
            service_type_label: record.service_type.label().to_owned(),
            area: format!("{:.1}㎡", record.area.square_metres()),
            created_at: format_timestamp(record.created_at),
            survival_percentage: format_percent(percentage),
            survival_grade: SurvivalGrade::from_percentage(percentage).label().to_owned(),
            life_pop_300m: people(m.life_pop_300m),
            life_pop_age_ratios_300m: [
                m.life_pop_20_300m,
                m.life_pop_30_300m,
                m.life_pop_40_300m,
                m.life_pop_50_300m,
                m.life_pop_60_300m,
            ]
            .map(format_percent),
            life_pop_1000m: people(m.life_pop_1000m),
            life_pop_age_ratios_1000m: [
                m.life_pop_20_1000m,
                m.life_pop_30_1000m,
                m.life_pop_40_1000m,
                m.life_pop_50_1000m,
                m.life_pop_60_1000m,
            ]
            .map(format_percent),
            working_pop_300m: people(m.working_pop_300m),
            temp_foreign_1000m: people(m.temp_foreign_1000m),
            temp_foreign_cn_300m: format_percent(m.temp_foreign_cn_300m),
            temp_foreign_cn_1000m: format_percent(m.temp_foreign_cn_1000m),
            long_foreign_300m: people(m.long_foreign_300m),
            long_foreign_1000m: people(m.long_foreign_1000m),
            long_foreign_cn_1000m: format_percent(m.long_foreign_cn_1000m),
            public_building_250m: places(m.public_building_250m),
            school_250m: places(m.school_250m),
            competitor_300m: places(m.competitor_300m),
            adjacent_biz_300m: places(m.adjacent_biz_300m),
            competitor_ratio_300m: format_percent(m.competitor_ratio_300m),
            business_diversity_300m: places(m.business_diversity_300m),
            land_unit_price: format_won(m.land_unit_price),
            total_land_value: format_won(m.total_land_value),
            unavailable_metrics: record.unavailable_metrics.clone(),
            narrative: record.narrative.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1,000")]
    #[case(250_000_000, "250,000,000")]
    #[case(-1_234, "-1,234")]
    fn groups_digits(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(group_thousands(value), expected);
    }

    #[rstest]
    fn formats_units() {
        assert_eq!(format_count(1_234.4, "명"), "1,234명");
        assert_eq!(format_count(12.0, "개"), "12개");
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_won(250_000_000.0), "250,000,000원");
        assert_eq!(format_count(f64::NAN, "명"), "0명");
    }

    #[rstest]
    #[case(85.0, "높음")]
    #[case(70.0, "높음")]
    #[case(69.9, "보통")]
    #[case(50.0, "보통")]
    #[case(49.9, "낮음")]
    fn grades_by_band(#[case] percentage: f64, #[case] expected: &str) {
        assert_eq!(SurvivalGrade::from_percentage(percentage).label(), expected);
    }

    #[rstest]
    fn timestamps_render_in_kst() {
        let at = Utc
            .with_ymd_and_hms(2026, 3, 1, 15, 30, 0)
            .single()
            .expect("valid time");
        assert_eq!(format_timestamp(at), "2026-03-02 00:30");
    }
}
