//! Integration tests for Epiwatch API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API,
//! with the upstream replaced by an in-memory data source.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use tower::ServiceExt;

use epiwatch::api::{AppState, router};
use epiwatch::dashboard::{Dashboard, DashboardConfig};
use epiwatch::data_access::DiseaseDataSource;
use epiwatch::model::{
    AgeBuckets, CountryRecord, DailyPoint, DeltaFigures, GlobalSnapshot, InfluenzaWeek,
    VaccinationScope, VaccinePoint,
};

/// Stub upstream. `healthy: false` behaves like every fetch failed.
struct StubSource {
    healthy: bool,
    snapshot_fails: bool,
}

fn country(name: &str, cases: u64) -> CountryRecord {
    CountryRecord {
        name: name.to_string(),
        cases,
        recovered: cases / 2,
        deaths: cases / 100,
        active: cases - cases / 2 - cases / 100,
        flag: format!("https://flags/{name}.png"),
        lat: 10.0,
        long: 20.0,
    }
}

#[async_trait]
impl DiseaseDataSource for StubSource {
    async fn fetch_snapshot(&self, country: Option<&str>) -> GlobalSnapshot {
        if !self.healthy || self.snapshot_fails {
            return GlobalSnapshot::unavailable();
        }
        let confirmed = match country {
            None => 350,
            Some(_) => 100,
        };
        GlobalSnapshot {
            confirmed: Some(confirmed),
            recovered: Some(175),
            deaths: Some(3),
            last_update: None,
        }
    }

    async fn fetch_today_deltas(&self) -> DeltaFigures {
        if !self.healthy {
            return DeltaFigures::unavailable();
        }
        DeltaFigures {
            today_cases: Some(12),
            today_deaths: None,
            today_recovered: Some(0),
        }
    }

    async fn fetch_daily_series(&self) -> Vec<DailyPoint> {
        if !self.healthy {
            return Vec::new();
        }
        vec![
            DailyPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
                confirmed: 557,
                deaths: 17,
            },
            DailyPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 23).unwrap(),
                confirmed: 657,
                deaths: 18,
            },
        ]
    }

    async fn fetch_country_names(&self) -> BTreeSet<String> {
        self.fetch_country_records()
            .await
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    async fn fetch_country_records(&self) -> Vec<CountryRecord> {
        if !self.healthy {
            return Vec::new();
        }
        vec![country("A", 100), country("B", 50), country("C", 200)]
    }

    async fn fetch_vaccination_series(&self, scope: &VaccinationScope) -> Vec<VaccinePoint> {
        if !self.healthy {
            return Vec::new();
        }
        let daily = match scope {
            VaccinationScope::Global => 13_000_000_000,
            VaccinationScope::Country(_) => 66_000_000,
        };
        vec![VaccinePoint {
            date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            daily,
        }]
    }

    async fn fetch_influenza_weeks(&self) -> Vec<InfluenzaWeek> {
        if !self.healthy {
            return Vec::new();
        }
        [10, 20, 30]
            .into_iter()
            .enumerate()
            .map(|(i, total_ili)| InfluenzaWeek {
                week: format!("2024-W{:02}", i + 1),
                total_ili,
                total_patients: total_ili * 100,
                percent_weighted_ili: 2.1,
                percent_unweighted_ili: 1.9,
                ages: AgeBuckets {
                    age_25_49: total_ili,
                    ..AgeBuckets::default()
                },
            })
            .collect()
    }
}

fn create_app(source: StubSource) -> axum::Router {
    let dashboard = Dashboard::new(Arc::new(source), DashboardConfig { top_n: 2 });
    router(AppState { dashboard })
}

fn create_test_server(source: StubSource) -> TestServer {
    TestServer::new(create_app(source)).unwrap()
}

fn healthy() -> StubSource {
    StubSource {
        healthy: true,
        snapshot_fails: false,
    }
}

fn broken() -> StubSource {
    StubSource {
        healthy: false,
        snapshot_fails: true,
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server(healthy());

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_overview() {
    let server = create_test_server(healthy());

    let response = server.get("/overview").await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["global"]["confirmed"], 350);
    assert_eq!(body["global"]["new_cases"], 12);
    assert!(body["global"]["new_deaths"].is_null());
    assert_eq!(body["global"]["new_recovered"], 0);
    assert_eq!(body["totals"]["cases"], 350);

    let top: Vec<_> = body["top_countries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(top, vec!["C", "A"]);

    assert_eq!(body["influenza"]["ili_summary"]["status"], "observed");
    assert_eq!(body["influenza"]["ili_summary"]["average"], 20.0);
    assert_eq!(body["influenza"]["current"]["week"], "2024-W03");
}

#[tokio::test]
async fn test_overview_top_parameter() {
    let server = create_test_server(healthy());

    let response = server.get("/overview?top=1").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["top_countries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_overview_with_failed_snapshot_keeps_countries() {
    let server = create_test_server(StubSource {
        healthy: true,
        snapshot_fails: true,
    });

    let response = server.get("/overview").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["global"]["confirmed"].is_null());
    assert_eq!(body["countries"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_overview_when_upstream_is_down() {
    let server = create_test_server(broken());

    let response = server.get("/overview").await;

    // Degraded, never an error status
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["top_countries"].as_array().unwrap().is_empty());
    assert_eq!(body["totals"]["cases"], 0);
    assert_eq!(body["influenza"]["ili_summary"]["status"], "no_data");
    assert!(body["influenza"]["current"].is_null());
}

#[tokio::test]
async fn test_countries_sorted_by_cases() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/countries").await.json();
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_country_names() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/countries/names").await.json();

    assert_eq!(body, serde_json::json!(["A", "B", "C"]));
}

#[tokio::test]
async fn test_country_names_route_does_not_shadow_country_view() {
    let server = create_test_server(healthy());

    let names: serde_json::Value = server.get("/countries/names").await.json();
    assert!(names.is_array());
    assert!(names.get("country").is_none());

    let view: serde_json::Value = server.get("/countries/Chile").await.json();
    assert_eq!(view["country"], "Chile");
}

#[tokio::test]
async fn test_country_view() {
    let server = create_test_server(healthy());

    let response = server.get("/countries/South%20Korea").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["country"], "South Korea");
    assert_eq!(body["snapshot"]["confirmed"], 100);
    assert_eq!(body["vaccinations"][0]["daily"], 66_000_000);
}

#[tokio::test]
async fn test_daily_series() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/timeseries/daily").await.json();

    assert_eq!(body["points"][0]["date"], "2020-01-22");
    assert_eq!(body["changes"][0]["new_confirmed"], 100);
}

#[tokio::test]
async fn test_vaccinations_scope() {
    let server = create_test_server(healthy());

    for path in ["/vaccinations", "/vaccinations?country=Global", "/vaccinations?country=global"] {
        let body: serde_json::Value = server.get(path).await.json();
        assert_eq!(body["scope"], "Global", "{path}");
        assert_eq!(body["points"][0]["daily"], 13_000_000_000_u64, "{path}");
    }

    let body: serde_json::Value = server.get("/vaccinations?country=Chile").await.json();
    assert_eq!(body["scope"], "Chile");
    assert_eq!(body["points"][0]["daily"], 66_000_000);
}

#[tokio::test]
async fn test_influenza() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/influenza").await.json();

    assert_eq!(body["weeks"].as_array().unwrap().len(), 3);
    assert_eq!(body["ili_summary"]["max"], 30);
    assert_eq!(body["ili_summary"]["min"], 10);
    assert_eq!(body["age_breakdown"][2]["label"], "25-49");
    assert_eq!(body["age_breakdown"][2]["count"], 30);
}

#[tokio::test]
async fn test_map_views() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/map").await.json();
    assert_eq!(body[0]["color"], "#CC1034");
    assert!(body[0]["tier"].is_null());

    let body: serde_json::Value = server.get("/map?view=hotspot").await.json();
    assert_eq!(body[0]["tier"]["label"], "≤100K");
    assert_eq!(body[0]["radius"], 1500.0);

    server
        .get("/map?view=heatmap")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_severity_legend() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/severity/detailed").await.json();
    assert_eq!(body["name"], "detailed");
    assert_eq!(body["tiers"].as_array().unwrap().len(), 6);
    assert_eq!(body["tiers"][1]["exceeds"], 100_000);

    server
        .get("/severity/medium")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disease_profiles() {
    let server = create_test_server(healthy());

    let body: serde_json::Value = server.get("/diseases/tb").await.json();
    assert_eq!(body["name"], "Tuberculosis (TB)");
    assert_eq!(body["by_region"][0]["region"], "South-East Asia");
    assert_eq!(body["global"]["extra"]["kind"], "people_at_risk");

    server
        .get("/diseases/covid")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/diseases/measles")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_router_oneshot() {
    let app = create_app(broken());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/countries")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"[]");
}
