//! disease.sh client.
//!
//! disease.sh is an open, unauthenticated API that republishes COVID-19
//! figures (Johns Hopkins, Worldometers), vaccination coverage and the CDC
//! ILINet influenza surveillance feed.
//!
//! # API Reference
//!
//! See: <https://disease.sh/docs/>
//!
//! This client is strict: every call returns a [`FetchError`] on transport
//! failure, non-success status or an unexpected body. Degrading those to
//! empty values is the job of [`crate::data_access`].

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;
use crate::model::{
    AgeBuckets, CountryRecord, DailyPoint, DeltaFigures, GlobalSnapshot, InfluenzaWeek,
    VaccinePoint,
};

/// Base URL for the disease.sh API.
pub const DISEASE_SH_BASE: &str = "https://disease.sh/v3";

/// Days of vaccination coverage requested per series.
pub const VACCINE_LOOKBACK_DAYS: u32 = 30;

/// Date format used for keys of the historical and vaccine timelines (e.g. `1/22/20`).
const TIMELINE_DATE_FORMAT: &str = "%m/%d/%y";

/// Client for querying disease.sh.
#[derive(Clone)]
pub struct DiseaseShClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for DiseaseShClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DiseaseShClient {
    /// Create a new client against the public API.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DISEASE_SH_BASE.to_string(),
        }
    }

    /// Create a new client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with a custom base URL and a per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a URL and decode the body as JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url = %url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| FetchError::shape(url, e))
    }

    /// Fetch cumulative totals, worldwide or for one country.
    ///
    /// # Arguments
    ///
    /// * `country` - Country name as disease.sh spells it (e.g. "Germany"), or
    ///   `None` for worldwide totals.
    pub async fn get_totals(&self, country: Option<&str>) -> Result<TotalsResponse, FetchError> {
        let url = match country {
            Some(name) => format!(
                "{}/covid-19/countries/{}",
                self.base_url,
                urlencoding::encode(name)
            ),
            None => format!("{}/covid-19/all", self.base_url),
        };

        self.get_json(&url).await
    }

    /// Fetch the full worldwide cumulative history.
    pub async fn get_historical_all(&self) -> Result<HistoricalResponse, FetchError> {
        let url = format!("{}/covid-19/historical/all?lastdays=all", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch every country's totals together with flag and geolocation.
    pub async fn get_countries(&self) -> Result<Vec<CountryResponse>, FetchError> {
        let url = format!("{}/covid-19/countries", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch worldwide vaccination coverage for the last `lastdays` days.
    ///
    /// The endpoint answers with a flat `{date: doses}` object.
    pub async fn get_global_vaccine_coverage(
        &self,
        lastdays: u32,
    ) -> Result<VaccineTimeline, FetchError> {
        let url = format!(
            "{}/covid-19/vaccine/coverage?lastdays={}",
            self.base_url, lastdays
        );
        let timeline = self.get_json(&url).await?;
        Ok(VaccineTimeline { timeline })
    }

    /// Fetch one country's vaccination coverage for the last `lastdays` days.
    ///
    /// The endpoint nests the `{date: doses}` object under `timeline`.
    pub async fn get_country_vaccine_coverage(
        &self,
        country: &str,
        lastdays: u32,
    ) -> Result<CountryVaccineResponse, FetchError> {
        let url = format!(
            "{}/covid-19/vaccine/coverage/countries/{}?lastdays={}",
            self.base_url,
            urlencoding::encode(country),
            lastdays
        );
        self.get_json(&url).await
    }

    /// Fetch the CDC ILINet influenza surveillance feed.
    pub async fn get_ilinet(&self) -> Result<IliNetResponse, FetchError> {
        let url = format!("{}/influenza/cdc/ILINet", self.base_url);
        self.get_json(&url).await
    }
}

/// Parse a timeline key such as `3/14/21`.
pub fn parse_timeline_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, TIMELINE_DATE_FORMAT).ok()
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the `/all` and `/countries/{country}` endpoints.
///
/// Only the fields Epiwatch reads are declared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalsResponse {
    #[serde(default)]
    pub cases: Option<u64>,

    #[serde(default)]
    pub recovered: Option<u64>,

    #[serde(default)]
    pub deaths: Option<u64>,

    /// Last refresh, milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated: Option<i64>,

    #[serde(default, rename = "todayCases")]
    pub today_cases: Option<u64>,

    #[serde(default, rename = "todayDeaths")]
    pub today_deaths: Option<u64>,

    #[serde(default, rename = "todayRecovered")]
    pub today_recovered: Option<u64>,
}

impl TotalsResponse {
    /// Get the refresh time as a DateTime.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated.and_then(DateTime::from_timestamp_millis)
    }

    /// Normalize into a snapshot.
    pub fn to_snapshot(&self) -> GlobalSnapshot {
        GlobalSnapshot {
            confirmed: self.cases,
            recovered: self.recovered,
            deaths: self.deaths,
            last_update: self.updated_at(),
        }
    }

    /// Extract the same-day deltas.
    pub fn to_deltas(&self) -> DeltaFigures {
        DeltaFigures {
            today_cases: self.today_cases,
            today_deaths: self.today_deaths,
            today_recovered: self.today_recovered,
        }
    }
}

/// Response from `/historical/all`: one date-keyed object per metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalResponse {
    pub cases: IndexMap<String, u64>,

    pub deaths: IndexMap<String, u64>,

    #[serde(default)]
    pub recovered: IndexMap<String, u64>,
}

impl HistoricalResponse {
    /// Normalize into daily points, keeping the upstream key order.
    ///
    /// Fails if a key is not a date or a case date has no matching death count.
    pub fn to_daily_points(&self) -> Result<Vec<DailyPoint>, String> {
        self.cases
            .iter()
            .map(|(key, &confirmed)| {
                let date =
                    parse_timeline_date(key).ok_or_else(|| format!("invalid date key {key:?}"))?;
                let deaths = self
                    .deaths
                    .get(key)
                    .copied()
                    .ok_or_else(|| format!("no death count for {key:?}"))?;
                Ok(DailyPoint {
                    date,
                    confirmed,
                    deaths,
                })
            })
            .collect()
    }
}

/// One element of the `/countries` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryResponse {
    pub country: String,

    #[serde(default, rename = "countryInfo")]
    pub country_info: CountryInfo,

    pub cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub active: u64,
}

/// Flag and geolocation attached to a country.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub flag: String,

    #[serde(default)]
    pub lat: f64,

    #[serde(default)]
    pub long: f64,
}

impl CountryResponse {
    /// Normalize into a country record.
    pub fn to_record(&self) -> CountryRecord {
        CountryRecord {
            name: self.country.clone(),
            cases: self.cases,
            recovered: self.recovered,
            deaths: self.deaths,
            active: self.active,
            flag: self.country_info.flag.clone(),
            lat: self.country_info.lat,
            long: self.country_info.long,
        }
    }
}

/// A flat `{date: doses}` vaccination timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaccineTimeline {
    pub timeline: IndexMap<String, u64>,
}

impl VaccineTimeline {
    /// Normalize into vaccine points, keeping the upstream key order.
    pub fn to_points(&self) -> Result<Vec<VaccinePoint>, String> {
        self.timeline
            .iter()
            .map(|(key, &daily)| {
                parse_timeline_date(key)
                    .map(|date| VaccinePoint { date, daily })
                    .ok_or_else(|| format!("invalid date key {key:?}"))
            })
            .collect()
    }
}

/// Response from `/vaccine/coverage/countries/{country}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryVaccineResponse {
    #[serde(default)]
    pub country: String,

    pub timeline: VaccineTimeline,
}

/// Response from `/influenza/cdc/ILINet`.
///
/// Rows stay undecoded until a window is picked, so a malformed row outside
/// that window does not sink the whole feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IliNetResponse {
    /// Weekly rows, oldest first.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl IliNetResponse {
    /// Decode and normalize the most recent `limit` weeks, oldest first.
    pub fn recent_weeks(&self, limit: usize) -> Result<Vec<InfluenzaWeek>, String> {
        let skip = self.data.len().saturating_sub(limit);
        self.data[skip..]
            .iter()
            .map(|row| {
                IliNetWeek::deserialize(row)
                    .map(|week| week.to_week())
                    .map_err(|e| format!("invalid ILINet week: {e}"))
            })
            .collect()
    }
}

/// One week of ILINet data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IliNetWeek {
    pub week: String,

    #[serde(rename = "age 0-4")]
    pub age_0_4: u64,

    #[serde(rename = "age 5-24")]
    pub age_5_24: u64,

    #[serde(rename = "age 25-49")]
    pub age_25_49: u64,

    #[serde(rename = "age 50-64")]
    pub age_50_64: u64,

    #[serde(rename = "age 64+")]
    pub age_64_plus: u64,

    #[serde(rename = "totalILI")]
    pub total_ili: u64,

    #[serde(rename = "totalPatients")]
    pub total_patients: u64,

    #[serde(default, rename = "percentUnweightedILI")]
    pub percent_unweighted_ili: f64,

    #[serde(default, rename = "percentWeightedILI")]
    pub percent_weighted_ili: f64,
}

impl IliNetWeek {
    pub fn to_week(&self) -> InfluenzaWeek {
        InfluenzaWeek {
            week: self.week.clone(),
            total_ili: self.total_ili,
            total_patients: self.total_patients,
            percent_weighted_ili: self.percent_weighted_ili,
            percent_unweighted_ili: self.percent_unweighted_ili,
            ages: AgeBuckets {
                age_0_4: self.age_0_4,
                age_5_24: self.age_5_24,
                age_25_49: self.age_25_49,
                age_50_64: self.age_50_64,
                age_64_plus: self.age_64_plus,
            },
        }
    }
}
