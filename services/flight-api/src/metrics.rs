//! Query metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! (tests, embedded use) every call is a no-op.

use std::time::Duration;

use ::metrics::{counter, histogram};

/// Record the end of one query with its outcome label.
pub fn record_query(outcome: &'static str, elapsed: Duration) {
    counter!("flight_queries_total", "outcome" => outcome).increment(1);
    histogram!("flight_query_duration_ms", "outcome" => outcome)
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record provider elements left out of the canonical list.
pub fn record_dropped(count: usize) {
    if count > 0 {
        counter!("flight_records_dropped_total").increment(count as u64);
    }
}

/// Record a query whose result filled the provider page.
pub fn record_truncated() {
    counter!("flight_query_truncated_total").increment(1);
}
