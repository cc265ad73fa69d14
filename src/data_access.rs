//! Fail-soft data access layer.
//!
//! Wraps the strict [`DiseaseShClient`] and converts every failure into an
//! empty or unavailable value, so one missing metric never blocks the rest
//! of the dashboard. Failures are logged at `warn` and otherwise swallowed.
//!
//! The [`DiseaseDataSource`] trait is the seam the dashboard depends on;
//! tests substitute their own implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::data_sources::DiseaseShClient;
use crate::data_sources::disease_sh::VACCINE_LOOKBACK_DAYS;
use crate::error::FetchError;
use crate::model::{
    CountryRecord, DailyPoint, DeltaFigures, GlobalSnapshot, InfluenzaWeek, VaccinationScope,
    VaccinePoint,
};

/// Most recent influenza weeks kept from the ILINet feed.
pub const INFLUENZA_WEEKS: usize = 30;

/// Every operation the dashboard needs from upstream.
///
/// No method can fail: implementations return the degraded value instead.
#[async_trait]
pub trait DiseaseDataSource: Send + Sync {
    /// Worldwide totals, or one country's when `country` is given.
    async fn fetch_snapshot(&self, country: Option<&str>) -> GlobalSnapshot;

    /// Today's new cases, deaths and recoveries worldwide.
    async fn fetch_today_deltas(&self) -> DeltaFigures;

    /// Full worldwide history, in upstream (ascending) order.
    async fn fetch_daily_series(&self) -> Vec<DailyPoint>;

    /// Names of every country the upstream knows about.
    async fn fetch_country_names(&self) -> BTreeSet<String>;

    /// Every country's record, in upstream order.
    async fn fetch_country_records(&self) -> Vec<CountryRecord>;

    /// Last 30 days of vaccination coverage for the given scope.
    async fn fetch_vaccination_series(&self, scope: &VaccinationScope) -> Vec<VaccinePoint>;

    /// Most recent influenza surveillance weeks, oldest first.
    async fn fetch_influenza_weeks(&self) -> Vec<InfluenzaWeek>;
}

/// [`DiseaseDataSource`] backed by disease.sh.
#[derive(Clone, Default)]
pub struct DataAccess {
    client: DiseaseShClient,
}

impl DataAccess {
    pub fn new(client: DiseaseShClient) -> Self {
        Self { client }
    }
}

/// Unwrap a fetch result, or log the failure and fall back.
fn degrade<T>(operation: &'static str, result: Result<T, FetchError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(
                operation,
                kind = e.kind(),
                error = %e,
                "Upstream fetch failed, serving empty result"
            );
            fallback
        }
    }
}

#[async_trait]
impl DiseaseDataSource for DataAccess {
    #[instrument(skip(self))]
    async fn fetch_snapshot(&self, country: Option<&str>) -> GlobalSnapshot {
        let result = self
            .client
            .get_totals(country)
            .await
            .map(|totals| totals.to_snapshot());
        degrade("fetch_snapshot", result, GlobalSnapshot::unavailable())
    }

    #[instrument(skip(self))]
    async fn fetch_today_deltas(&self) -> DeltaFigures {
        let result = self
            .client
            .get_totals(None)
            .await
            .map(|totals| totals.to_deltas());
        degrade("fetch_today_deltas", result, DeltaFigures::unavailable())
    }

    #[instrument(skip(self))]
    async fn fetch_daily_series(&self) -> Vec<DailyPoint> {
        let result = self.client.get_historical_all().await.and_then(|history| {
            history
                .to_daily_points()
                .map_err(|reason| FetchError::shape("covid-19/historical/all", reason))
        });
        degrade("fetch_daily_series", result, Vec::new())
    }

    #[instrument(skip(self))]
    async fn fetch_country_names(&self) -> BTreeSet<String> {
        let result = self
            .client
            .get_countries()
            .await
            .map(|countries| {
                countries
                    .into_iter()
                    .map(|c| c.country)
                    .collect::<BTreeSet<_>>()
            });
        degrade("fetch_country_names", result, BTreeSet::new())
    }

    #[instrument(skip(self))]
    async fn fetch_country_records(&self) -> Vec<CountryRecord> {
        let result = self
            .client
            .get_countries()
            .await
            .map(|countries| countries.iter().map(|c| c.to_record()).collect::<Vec<_>>());
        degrade("fetch_country_records", result, Vec::new())
    }

    #[instrument(skip(self))]
    async fn fetch_vaccination_series(&self, scope: &VaccinationScope) -> Vec<VaccinePoint> {
        let timeline = match scope {
            VaccinationScope::Global => {
                self.client
                    .get_global_vaccine_coverage(VACCINE_LOOKBACK_DAYS)
                    .await
            }
            VaccinationScope::Country(name) => self
                .client
                .get_country_vaccine_coverage(name, VACCINE_LOOKBACK_DAYS)
                .await
                .map(|response| response.timeline),
        };

        let result = timeline.and_then(|timeline| {
            timeline
                .to_points()
                .map_err(|reason| FetchError::shape("covid-19/vaccine/coverage", reason))
        });
        degrade("fetch_vaccination_series", result, Vec::new())
    }

    #[instrument(skip(self))]
    async fn fetch_influenza_weeks(&self) -> Vec<InfluenzaWeek> {
        let result = self
            .client
            .get_ilinet()
            .await
            .and_then(|feed| {
                feed.recent_weeks(INFLUENZA_WEEKS)
                    .map_err(|reason| FetchError::shape("influenza/cdc/ILINet", reason))
            });
        degrade("fetch_influenza_weeks", result, Vec::new())
    }
}
