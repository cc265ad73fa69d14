//! Canonical data shapes for Epiwatch.
//!
//! Every upstream payload, whatever its wire format, is normalized into one of
//! the types in this module before anything else in the crate touches it.
//!
//! # Unavailable vs zero
//!
//! Counts that may be missing upstream are `Option<u64>`. `None` means
//! "unavailable" and is rendered as `N/A`; it is never coerced to `0`.
//! Counts on [`CountryRecord`] and the time-series points are plain `u64`
//! because a record lacking them is rejected as a shape mismatch instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative totals for the whole world or for one country.
///
/// An all-`None` snapshot is what the data access layer hands back when the
/// fetch failed. Callers treat that as "no data yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSnapshot {
    /// Cumulative confirmed cases.
    pub confirmed: Option<u64>,

    /// Cumulative recoveries.
    pub recovered: Option<u64>,

    /// Cumulative deaths.
    pub deaths: Option<u64>,

    /// When the upstream source last refreshed these figures.
    pub last_update: Option<DateTime<Utc>>,
}

impl GlobalSnapshot {
    /// A snapshot with every field unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// True when no field carries a value.
    pub fn is_unavailable(&self) -> bool {
        self.confirmed.is_none()
            && self.recovered.is_none()
            && self.deaths.is_none()
            && self.last_update.is_none()
    }
}

/// Same-day changes reported alongside the global totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFigures {
    pub today_cases: Option<u64>,
    pub today_deaths: Option<u64>,
    pub today_recovered: Option<u64>,
}

impl DeltaFigures {
    /// Deltas with every field unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Per-country figures with geolocation and flag.
///
/// `name` is the natural key; no two records in one fetch share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub active: u64,

    /// URL of the country's flag image.
    pub flag: String,

    pub lat: f64,
    pub long: f64,
}

/// One day of the global cumulative history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
}

/// One day of vaccination coverage (cumulative doses administered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinePoint {
    pub date: NaiveDate,
    pub daily: u64,
}

/// ILI patient counts per age group for one surveillance week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBuckets {
    pub age_0_4: u64,
    pub age_5_24: u64,
    pub age_25_49: u64,
    pub age_50_64: u64,
    pub age_64_plus: u64,
}

impl AgeBuckets {
    /// Age groups in ascending order, labelled the way the CDC feed labels them.
    pub fn breakdown(&self) -> Vec<AgeGroupCount> {
        [
            ("0-4", self.age_0_4),
            ("5-24", self.age_5_24),
            ("25-49", self.age_25_49),
            ("50-64", self.age_50_64),
            ("64+", self.age_64_plus),
        ]
        .into_iter()
        .map(|(label, count)| AgeGroupCount {
            label: label.to_string(),
            count,
        })
        .collect()
    }
}

/// A labelled age-group count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroupCount {
    pub label: String,
    pub count: u64,
}

/// One week of the CDC ILINet influenza surveillance feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenzaWeek {
    /// Week label as published by the feed.
    pub week: String,

    /// Patients seen with influenza-like illness.
    pub total_ili: u64,

    /// All patients seen by reporting providers.
    pub total_patients: u64,

    pub percent_weighted_ili: f64,
    pub percent_unweighted_ili: f64,

    pub ages: AgeBuckets,
}

/// Which vaccination series to fetch.
///
/// Aggregate-across-all-countries is its own variant, so a country name is
/// never compared against a sentinel string inside the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationScope {
    Global,
    Country(String),
}

impl VaccinationScope {
    /// Interpret a free-text request parameter.
    ///
    /// Absent, blank or `global` (any case) selects [`VaccinationScope::Global`].
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") => VaccinationScope::Global,
            Some(p) if p.eq_ignore_ascii_case("global") => VaccinationScope::Global,
            Some(p) => VaccinationScope::Country(p.to_string()),
        }
    }

    /// Label used in chart titles.
    pub fn label(&self) -> &str {
        match self {
            VaccinationScope::Global => "Global",
            VaccinationScope::Country(name) => name,
        }
    }
}

/// The metric visualized on a per-metric map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Cases,
    Recovered,
    Deaths,
}

impl CaseType {
    /// Pick this metric out of a record.
    pub fn value_of(&self, record: &CountryRecord) -> u64 {
        match self {
            CaseType::Cases => record.cases,
            CaseType::Recovered => record.recovered,
            CaseType::Deaths => record.deaths,
        }
    }

    /// Display color for markers of this metric.
    pub fn color(&self) -> &'static str {
        match self {
            CaseType::Cases => "#CC1034",
            CaseType::Recovered => "#7dd71d",
            CaseType::Deaths => "#fb4443",
        }
    }
}

/// Query parameters for GET /overview.
#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// How many countries to rank (defaults to the configured top-N).
    pub top: Option<usize>,
}

/// Query parameters for GET /vaccinations.
#[derive(Debug, Deserialize)]
pub struct VaccinationQuery {
    /// Country name, or `Global`. Absent means global.
    pub country: Option<String>,
}

/// Query parameters for GET /map.
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    /// One of `cases`, `recovered`, `deaths`, `hotspot`, `overview`.
    #[serde(default = "default_map_view")]
    pub view: String,
}

fn default_map_view() -> String {
    "cases".to_string()
}
