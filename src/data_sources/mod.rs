//! Upstream data sources.
//!
//! # Data Sources
//!
//! - [`disease_sh`]: disease.sh - COVID-19 totals, history, vaccination
//!   coverage and the CDC ILINet influenza feed
//!
//! Clients here are strict and return [`crate::error::FetchError`] on any
//! failure; see [`crate::data_access`] for the fail-soft wrapper.

pub mod disease_sh;

pub use disease_sh::DiseaseShClient;
