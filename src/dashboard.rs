//! Dashboard views assembled from the data access layer.
//!
//! A view that needs several upstream figures fetches them concurrently and
//! renders once all of them have settled. Each fetch degrades on its own, so
//! a failed global snapshot still leaves a fully populated country list.
//!
//! # Usage
//!
//! ```ignore
//! let dashboard = Dashboard::new(Arc::new(DataAccess::default()), DashboardConfig::default());
//! let overview = dashboard.load_overview().await;
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregation::{
    CountryTotals, DEFAULT_TOP_N, DailyChange, GlobalOverview, InfluenzaView, MapMarker, MapView,
    country_totals, daily_changes, influenza_view, map_markers, merge_global, rank_by_cases,
    top_n,
};
use crate::data_access::DiseaseDataSource;
use crate::model::{
    CountryRecord, DailyPoint, DeltaFigures, GlobalSnapshot, InfluenzaWeek, VaccinationScope,
    VaccinePoint,
};

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// How many countries the overview ranks.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// The main COVID-19 overview.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    /// When this view was assembled.
    pub timestamp: DateTime<Utc>,

    pub global: GlobalOverview,

    /// Sums over `countries`.
    pub totals: CountryTotals,

    pub top_countries: Vec<CountryRecord>,

    /// Every country, in upstream order.
    pub countries: Vec<CountryRecord>,

    pub influenza: InfluenzaView,
}

/// Assemble an overview from already-fetched parts.
pub fn build_overview(
    countries: Vec<CountryRecord>,
    snapshot: &GlobalSnapshot,
    deltas: &DeltaFigures,
    weeks: Vec<InfluenzaWeek>,
    n: usize,
) -> OverviewView {
    OverviewView {
        timestamp: Utc::now(),
        global: merge_global(snapshot, deltas),
        totals: country_totals(&countries),
        top_countries: top_n(&countries, n),
        countries,
        influenza: influenza_view(weeks),
    }
}

/// One country's detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryView {
    pub country: String,
    pub snapshot: GlobalSnapshot,
    pub vaccinations: Vec<VaccinePoint>,
}

/// Vaccination chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaccinationView {
    /// `Global` or the country name.
    pub scope: String,
    pub points: Vec<VaccinePoint>,
}

/// Worldwide history with derived daily increments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesView {
    pub points: Vec<DailyPoint>,
    pub changes: Vec<DailyChange>,
}

/// Entry point for building views.
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    source: Arc<dyn DiseaseDataSource>,
}

impl Dashboard {
    /// Create a new dashboard over the given data source.
    pub fn new(source: Arc<dyn DiseaseDataSource>, config: DashboardConfig) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Build the overview with the configured top-N.
    pub async fn load_overview(&self) -> OverviewView {
        self.load_overview_with_top(self.config.top_n).await
    }

    /// Build the overview ranking the top `n` countries.
    pub async fn load_overview_with_top(&self, n: usize) -> OverviewView {
        // Fetch from all sources concurrently
        let (countries, snapshot, deltas, weeks) = tokio::join!(
            self.source.fetch_country_records(),
            self.source.fetch_snapshot(None),
            self.source.fetch_today_deltas(),
            self.source.fetch_influenza_weeks(),
        );

        info!(
            countries = countries.len(),
            global_available = !snapshot.is_unavailable(),
            influenza_weeks = weeks.len(),
            "Overview assembled"
        );

        build_overview(countries, &snapshot, &deltas, weeks, n)
    }

    /// Build one country's detail panel.
    pub async fn load_country(&self, country: &str) -> CountryView {
        let scope = VaccinationScope::Country(country.to_string());
        let (snapshot, vaccinations) = tokio::join!(
            self.source.fetch_snapshot(Some(country)),
            self.source.fetch_vaccination_series(&scope),
        );

        debug!(
            country = %country,
            available = !snapshot.is_unavailable(),
            vaccine_days = vaccinations.len(),
            "Country view assembled"
        );

        CountryView {
            country: country.to_string(),
            snapshot,
            vaccinations,
        }
    }

    /// Every country, most cases first.
    pub async fn country_table(&self) -> Vec<CountryRecord> {
        rank_by_cases(&self.source.fetch_country_records().await)
    }

    /// Country names, alphabetically.
    pub async fn country_names(&self) -> Vec<String> {
        self.source.fetch_country_names().await.into_iter().collect()
    }

    pub async fn daily_series(&self) -> DailySeriesView {
        let points = self.source.fetch_daily_series().await;
        let changes = daily_changes(&points);
        DailySeriesView { points, changes }
    }

    pub async fn vaccinations(&self, scope: &VaccinationScope) -> VaccinationView {
        VaccinationView {
            scope: scope.label().to_string(),
            points: self.source.fetch_vaccination_series(scope).await,
        }
    }

    pub async fn influenza(&self) -> InfluenzaView {
        influenza_view(self.source.fetch_influenza_weeks().await)
    }

    pub async fn map(&self, view: MapView) -> Vec<MapMarker> {
        map_markers(&self.source.fetch_country_records().await, view)
    }
}

/// Proof that a request was issued, used to order results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Holds the result of the most recently issued request.
///
/// Tickets are handed out in issue order. A result is kept only if no result
/// from a later ticket is already stored, so responses arriving out of order
/// cannot overwrite a newer one.
#[derive(Debug)]
pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
}

#[derive(Debug)]
struct SlotState<T> {
    issued: u64,
    stored: Option<(Ticket, T)>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState {
                issued: 0,
                stored: None,
            }),
        }
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request.
    pub fn issue(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.issued += 1;
        Ticket(state.issued)
    }

    /// Offer a result. Returns false if it was discarded as superseded.
    pub fn offer(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let superseded = matches!(&state.stored, Some((newest, _)) if *newest > ticket);
        if !superseded {
            state.stored = Some((ticket, value));
        }
        !superseded
    }

    /// The kept result, if any.
    pub fn current(&self) -> Option<T> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.stored.as_ref().map(|(_, value)| value.clone())
    }
}

/// One viewer's dashboard: the overview plus the currently selected country.
pub struct DashboardSession {
    dashboard: Dashboard,
    selection: LatestSlot<CountryView>,
}

impl DashboardSession {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            selection: LatestSlot::new(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Select a country and load its panel.
    ///
    /// Returns false if a later selection was already shown by the time this
    /// one finished loading.
    pub async fn select_country(&self, country: &str) -> bool {
        let ticket = self.selection.issue();
        let view = self.dashboard.load_country(country).await;
        let kept = self.selection.offer(ticket, view);
        if !kept {
            debug!(country = %country, "Discarded superseded country selection");
        }
        kept
    }

    /// The panel of the most recently issued selection that has loaded.
    pub fn selected(&self) -> Option<CountryView> {
        self.selection.current()
    }
}
