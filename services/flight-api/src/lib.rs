//! Flight API Service Library
//!
//! HTTP front for drone-flight takeoff queries: validates a date range, asks
//! the flight provider for one page of flights, and serves the normalized
//! records as a list or as zoom-dependent map clusters.

pub mod app;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod service;
pub mod state;
pub mod upstream;
