//! Epiwatch - Global disease statistics as dashboard view models.
//!
//! # Overview
//!
//! Epiwatch fetches COVID-19 and influenza figures from the public disease.sh
//! API, combines them with compiled-in WHO/UNAIDS statistics for malaria,
//! tuberculosis and HIV, and turns the result into presentation-ready view
//! models: worldwide totals with today's deltas, ranked country lists,
//! severity tiers, map markers and time-series summaries.
//!
//! # Failure Model
//!
//! Upstream calls are fail-soft. A failed fetch degrades to an empty list or
//! an all-unavailable snapshot and is logged; it never aborts a view, and one
//! failed metric never hides the others.
//!
//! # Modules
//!
//! - [`model`]: Canonical data shapes
//! - [`data_sources`]: Strict HTTP client for the upstream API
//! - [`data_access`]: Fail-soft layer over the client
//! - [`reference`]: Static disease profiles
//! - [`aggregation`]: Pure view-model computations
//! - [`dashboard`]: Concurrent view assembly and per-viewer sessions
//! - [`api`]: HTTP API handlers
//! - [`config`]: Environment configuration

pub mod aggregation;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod data_access;
pub mod data_sources;
pub mod error;
pub mod model;
pub mod reference;
