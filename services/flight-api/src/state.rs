//! Application state for the flight API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clustering::SpatialClusterer;
use flight_protocol::{ApiCredential, DateRangePolicy, UpstreamQueryBuilder};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServiceConfig;
use crate::service::QueryService;
use crate::upstream::{FlightSource, SkydioClient};

/// Source of "today" for date-range resolution.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Shared application state.
pub struct AppState {
    /// Date range in, flight records out.
    pub query_service: QueryService,

    /// Marker grouping for `/clusters`.
    pub clusterer: SpatialClusterer,

    /// Loaded service configuration.
    pub config: ServiceConfig,

    clock: Clock,

    /// Render handle for `/metrics`; absent when no recorder is installed.
    prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an existing flight source.
    pub fn new(
        config: ServiceConfig,
        credential: ApiCredential,
        source: Arc<dyn FlightSource>,
    ) -> Self {
        let query_service = QueryService::new(
            DateRangePolicy::default(),
            UpstreamQueryBuilder::new(config.upstream.base_url.clone()),
            credential,
            source,
        );

        Self {
            query_service,
            clusterer: SpatialClusterer::new(config.clustering.radius_px),
            config,
            clock: Arc::new(|| Utc::now().date_naive()),
            prometheus: None,
        }
    }

    /// Create state backed by the live provider client.
    pub fn from_config(config: ServiceConfig, credential: ApiCredential) -> Result<Self> {
        let client = SkydioClient::new(config.upstream.connect_timeout())?;
        Ok(Self::new(config, credential, Arc::new(client)))
    }

    /// Replace the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Current UTC calendar date.
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn query_timeout(&self) -> Duration {
        self.config.upstream.query_timeout()
    }

    pub fn prometheus(&self) -> Option<&PrometheusHandle> {
        self.prometheus.as_ref()
    }
}
