//! Aggregation and view-model logic.
//!
//! Every function here is pure and total over the shapes in [`crate::model`]:
//! no I/O, no errors. Upstream failures have already been degraded to empty
//! collections or unavailable fields by [`crate::data_access`], and those
//! flow through as "no data" results rather than numeric sentinels.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{
    AgeGroupCount, CaseType, CountryRecord, DailyPoint, DeltaFigures, GlobalSnapshot,
    InfluenzaWeek,
};
use crate::reference::{DiseaseProfile, RegionStat};

/// Countries shown in the "top countries" list unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Rendered in place of a value that is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Radius multiplier for the hotspot map on the main dashboard.
pub const HOTSPOT_MULTIPLIER: f64 = 150.0;

/// Radius multiplier for the full-screen overview map.
pub const OVERVIEW_MULTIPLIER: f64 = 400.0;

// ============================================================================
// Global rollup
// ============================================================================

/// Worldwide cumulative totals merged with today's deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalOverview {
    pub confirmed: Option<u64>,
    pub recovered: Option<u64>,
    pub deaths: Option<u64>,
    pub last_update: Option<DateTime<Utc>>,
    pub new_cases: Option<u64>,
    pub new_deaths: Option<u64>,
    pub new_recovered: Option<u64>,
}

impl GlobalOverview {
    /// True when neither the totals nor the deltas carry any value.
    pub fn is_unavailable(&self) -> bool {
        *self == GlobalOverview::default()
    }

    /// Display labels for the three "today" cards, in cases/deaths/recovered order.
    pub fn today_labels(&self) -> [String; 3] {
        [
            format_delta(self.new_cases),
            format_delta(self.new_deaths),
            format_delta(self.new_recovered),
        ]
    }
}

/// Merge a snapshot with separately fetched same-day deltas.
pub fn merge_global(snapshot: &GlobalSnapshot, deltas: &DeltaFigures) -> GlobalOverview {
    GlobalOverview {
        confirmed: snapshot.confirmed,
        recovered: snapshot.recovered,
        deaths: snapshot.deaths,
        last_update: snapshot.last_update,
        new_cases: deltas.today_cases,
        new_deaths: deltas.today_deaths,
        new_recovered: deltas.today_recovered,
    }
}

/// Format a count with thousands separators, e.g. `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a "new today" figure: `+1,234`, or `N/A` when unavailable.
pub fn format_delta(value: Option<u64>) -> String {
    match value {
        Some(n) => format!("+{}", format_count(n)),
        None => NOT_AVAILABLE.to_string(),
    }
}

// ============================================================================
// Ranking and totals
// ============================================================================

/// All records sorted by `cases`, largest first.
///
/// The sort is stable, so ties keep their upstream order.
pub fn rank_by_cases(records: &[CountryRecord]) -> Vec<CountryRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.cases.cmp(&a.cases));
    ranked
}

/// The `n` records with the most cases, largest first.
pub fn top_n(records: &[CountryRecord], n: usize) -> Vec<CountryRecord> {
    let mut ranked = rank_by_cases(records);
    ranked.truncate(n);
    ranked
}

/// Sums across a country collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountryTotals {
    pub cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub active: u64,
}

/// Sum every metric over the collection. Empty input gives all zeros.
pub fn country_totals(records: &[CountryRecord]) -> CountryTotals {
    records
        .iter()
        .fold(CountryTotals::default(), |acc, r| CountryTotals {
            cases: acc.cases.saturating_add(r.cases),
            recovered: acc.recovered.saturating_add(r.recovered),
            deaths: acc.deaths.saturating_add(r.deaths),
            active: acc.active.saturating_add(r.active),
        })
}

// ============================================================================
// Severity tiers
// ============================================================================

/// The tier a count was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityTier {
    /// 0 for the lowest tier, increasing with severity.
    pub level: usize,
    pub label: &'static str,
    pub color: &'static str,

    /// Counts strictly greater than this fall in this tier or higher.
    /// `None` for the lowest tier.
    pub exceeds: Option<u64>,
}

/// A threshold and the style of the tier it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub threshold: u64,
    pub label: &'static str,
    pub color: &'static str,
}

/// An ascending table of breakpoints with a floor tier below the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityScale {
    pub name: &'static str,
    pub floor_label: &'static str,
    pub floor_color: &'static str,

    /// Must be strictly ascending by threshold.
    pub breakpoints: &'static [Breakpoint],
}

impl SeverityScale {
    /// Classify a count. A count equal to a threshold stays in the tier below.
    pub fn classify(&self, cases: u64) -> SeverityTier {
        let level = self
            .breakpoints
            .iter()
            .take_while(|b| cases > b.threshold)
            .count();
        self.tier(level)
    }

    /// Every tier, lowest first.
    pub fn legend(&self) -> Vec<SeverityTier> {
        (0..=self.breakpoints.len()).map(|l| self.tier(l)).collect()
    }

    fn tier(&self, level: usize) -> SeverityTier {
        match level.checked_sub(1).and_then(|i| self.breakpoints.get(i)) {
            Some(b) => SeverityTier {
                level,
                label: b.label,
                color: b.color,
                exceeds: Some(b.threshold),
            },
            None => SeverityTier {
                level: 0,
                label: self.floor_label,
                color: self.floor_color,
                exceeds: None,
            },
        }
    }

    /// Look up a named table.
    pub fn by_name(name: &str) -> Option<&'static SeverityScale> {
        [&SEVERITY_TIERS_DETAILED, &SEVERITY_TIERS_COARSE]
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// Six tiers, used by the hotspot map on the main dashboard.
pub static SEVERITY_TIERS_DETAILED: SeverityScale = SeverityScale {
    name: "detailed",
    floor_label: "≤100K",
    floor_color: "#FFB3B3",
    breakpoints: &[
        Breakpoint {
            threshold: 100_000,
            label: ">100K",
            color: "#FF9999",
        },
        Breakpoint {
            threshold: 1_000_000,
            label: ">1M",
            color: "#FF6B6B",
        },
        Breakpoint {
            threshold: 5_000_000,
            label: ">5M",
            color: "#FF4444",
        },
        Breakpoint {
            threshold: 20_000_000,
            label: ">20M",
            color: "#CC1034",
        },
        Breakpoint {
            threshold: 50_000_000,
            label: ">50M",
            color: "#8B0000",
        },
    ],
};

/// Five tiers, used by the full-screen overview map.
pub static SEVERITY_TIERS_COARSE: SeverityScale = SeverityScale {
    name: "coarse",
    floor_label: "≤500K",
    floor_color: "#FF9999",
    breakpoints: &[
        Breakpoint {
            threshold: 500_000,
            label: ">500K",
            color: "#FF6B6B",
        },
        Breakpoint {
            threshold: 1_000_000,
            label: ">1M",
            color: "#FF4444",
        },
        Breakpoint {
            threshold: 5_000_000,
            label: ">5M",
            color: "#CC1034",
        },
        Breakpoint {
            threshold: 10_000_000,
            label: ">10M",
            color: "#8B0000",
        },
    ],
};

// ============================================================================
// Map markers
// ============================================================================

/// Circle radius for a count: `sqrt(count) * multiplier`.
pub fn radius(count: u64, multiplier: f64) -> f64 {
    (count as f64).sqrt() * multiplier
}

/// Radius multiplier for a per-metric map.
pub fn metric_multiplier(case_type: CaseType) -> f64 {
    match case_type {
        CaseType::Cases => 800.0,
        CaseType::Recovered => 1200.0,
        CaseType::Deaths => 2000.0,
    }
}

/// Which map a set of markers is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapView {
    /// One metric, colored by metric.
    Metric(CaseType),
    /// Cases, colored by the detailed severity table.
    Hotspot,
    /// Cases, colored by the coarse severity table.
    Overview,
}

impl MapView {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cases" => Some(MapView::Metric(CaseType::Cases)),
            "recovered" => Some(MapView::Metric(CaseType::Recovered)),
            "deaths" => Some(MapView::Metric(CaseType::Deaths)),
            "hotspot" => Some(MapView::Hotspot),
            "overview" => Some(MapView::Overview),
            _ => None,
        }
    }
}

/// One circle on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub name: String,
    pub flag: String,
    pub lat: f64,
    pub long: f64,

    /// The count the circle visualizes.
    pub value: u64,
    pub radius: f64,
    pub color: &'static str,

    /// Set on severity-colored maps only.
    pub tier: Option<SeverityTier>,
}

/// Build markers for every record, in input order.
pub fn map_markers(records: &[CountryRecord], view: MapView) -> Vec<MapMarker> {
    records
        .iter()
        .map(|r| {
            let (value, multiplier, color, tier) = match view {
                MapView::Metric(case_type) => (
                    case_type.value_of(r),
                    metric_multiplier(case_type),
                    case_type.color(),
                    None,
                ),
                MapView::Hotspot | MapView::Overview => {
                    let (scale, multiplier) = if view == MapView::Hotspot {
                        (&SEVERITY_TIERS_DETAILED, HOTSPOT_MULTIPLIER)
                    } else {
                        (&SEVERITY_TIERS_COARSE, OVERVIEW_MULTIPLIER)
                    };
                    let tier = scale.classify(r.cases);
                    (r.cases, multiplier, tier.color, Some(tier))
                }
            };

            MapMarker {
                name: r.name.clone(),
                flag: r.flag.clone(),
                lat: r.lat,
                long: r.long,
                value,
                radius: radius(value, multiplier),
                color,
                tier,
            }
        })
        .collect()
}

// ============================================================================
// Time series
// ============================================================================

/// Average, maximum and minimum of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesSummary {
    /// The series was empty.
    NoData,
    Observed { average: f64, max: u64, min: u64 },
}

impl SeriesSummary {
    /// Summarize a series of observations.
    pub fn of(values: &[u64]) -> Self {
        let (Some(&max), Some(&min)) = (values.iter().max(), values.iter().min()) else {
            return SeriesSummary::NoData;
        };
        let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();

        SeriesSummary::Observed {
            average: sum as f64 / values.len() as f64,
            max,
            min,
        }
    }

    /// Average rounded to the nearest integer, for display.
    pub fn rounded_average(&self) -> Option<u64> {
        match self {
            SeriesSummary::Observed { average, .. } => Some(average.round() as u64),
            SeriesSummary::NoData => None,
        }
    }
}

/// Day-over-day change derived from two consecutive cumulative points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub new_confirmed: u64,
    pub new_deaths: u64,
}

/// Daily increments of a cumulative series.
///
/// The first point has no predecessor and yields no change. Downward
/// revisions upstream are reported as zero.
pub fn daily_changes(points: &[DailyPoint]) -> Vec<DailyChange> {
    points
        .windows(2)
        .map(|pair| DailyChange {
            date: pair[1].date,
            new_confirmed: pair[1].confirmed.saturating_sub(pair[0].confirmed),
            new_deaths: pair[1].deaths.saturating_sub(pair[0].deaths),
        })
        .collect()
}

/// Everything the influenza panel renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenzaView {
    /// The most recent week, if any.
    pub current: Option<InfluenzaWeek>,

    /// The weeks charted, oldest first.
    pub weeks: Vec<InfluenzaWeek>,

    /// Summary of `total_ili` over `weeks`.
    pub ili_summary: SeriesSummary,

    /// Age groups of the current week.
    pub age_breakdown: Vec<AgeGroupCount>,
}

pub fn influenza_view(weeks: Vec<InfluenzaWeek>) -> InfluenzaView {
    let ili: Vec<u64> = weeks.iter().map(|w| w.total_ili).collect();
    let current = weeks.last().cloned();
    let age_breakdown = current
        .as_ref()
        .map(|w| w.ages.breakdown())
        .unwrap_or_default();

    InfluenzaView {
        current,
        ili_summary: SeriesSummary::of(&ili),
        age_breakdown,
        weeks,
    }
}

// ============================================================================
// Static profiles
// ============================================================================

/// Regional figures of a static profile, in report order.
pub fn regional_breakdown(profile: &DiseaseProfile) -> &[RegionStat] {
    profile.by_region
}
