//! Prometheus exporter for Rubrik cluster storage statistics.
//!
//! This crate polls a cluster's internal storage statistics API on a fixed
//! interval and exposes the values as gauges via an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Cluster API   │<────│     Poller      │────>│ StorageMetrics  │
//! │ (/stats/system_ │     │ (every 600 s)   │     │    (gauges)     │
//! │    storage)     │     └─────────────────┘     └────────┬────────┘
//! └─────────────────┘                                      │
//!                                                 ┌────────v────────┐
//!                                                 │   HTTP Server   │
//!                                                 │   (/metrics)    │
//!                                                 └─────────────────┘
//! ```
//!
//! # Usage
//!
//! Credentials are read from `RUBRIK_IP`, `RUBRIK_USER` and `RUBRIK_PASS`:
//!
//! ```bash
//! RUBRIK_IP=10.0.0.1 RUBRIK_USER=admin RUBRIK_PASS=secret rubrik-exporter-prometheus
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for the optional configuration file.

pub mod config;
pub mod http;
pub mod metrics;
pub mod poller;

pub use config::ExporterConfig;
pub use http::HttpServer;
pub use metrics::{PollStats, SharedMetrics, StorageMetrics};
pub use poller::{Poller, StatsSource};
