//! Flight query orchestration.
//!
//! One call to [`QueryService::execute`] walks the stages
//! `validating -> building -> fetching -> parsing -> done` exactly once. The
//! first failing stage ends the query; nothing is retried.

use std::sync::Arc;

use chrono::NaiveDate;
use flight_protocol::{
    normalize, ApiCredential, DateRange, DateRangePolicy, DropCounts, FlightRecord, QueryError,
    QueryResponse, QueryStage, UpstreamQueryBuilder,
};
use tracing::{debug, error, info, warn};

use crate::upstream::FlightSource;

/// Longest slice of a provider body copied into a log line.
const LOG_BODY_LIMIT: usize = 512;

/// Successful query result.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub range: DateRange,
    pub records: Vec<FlightRecord>,
    /// Provider filled the page, so more flights may exist.
    pub truncated: bool,
    pub page_size: u32,
    /// Elements the provider returned, before drops.
    pub returned_count: usize,
    pub dropped: DropCounts,
}

impl QueryOutcome {
    pub fn into_response(self) -> QueryResponse {
        QueryResponse {
            records: self.records,
            truncated: self.truncated,
            page_size: self.page_size,
            returned_count: self.returned_count,
            dropped_count: self.dropped.total(),
        }
    }
}

/// Date range in, canonical flight records out.
pub struct QueryService {
    policy: DateRangePolicy,
    builder: UpstreamQueryBuilder,
    credential: ApiCredential,
    source: Arc<dyn FlightSource>,
}

impl QueryService {
    pub fn new(
        policy: DateRangePolicy,
        builder: UpstreamQueryBuilder,
        credential: ApiCredential,
        source: Arc<dyn FlightSource>,
    ) -> Self {
        Self {
            policy,
            builder,
            credential,
            source,
        }
    }

    pub fn policy(&self) -> &DateRangePolicy {
        &self.policy
    }

    /// Run one query for the caller's raw dates as of `now`.
    pub async fn execute(
        &self,
        raw_start: Option<&str>,
        raw_end: Option<&str>,
        now: NaiveDate,
    ) -> Result<QueryOutcome, QueryError> {
        debug!(stage = %QueryStage::Validating, raw_start = ?raw_start, raw_end = ?raw_end, "Flight query");
        let range = self.policy.resolve(raw_start, raw_end, now).map_err(|e| {
            info!(stage = %QueryStage::Validating, reason = %e, "Rejected flight query");
            QueryError::from(e)
        })?;

        debug!(stage = %QueryStage::Building, start = %range.start(), end = %range.end(), "Flight query");
        let request = self.builder.build(&range, &self.credential);

        debug!(stage = %QueryStage::Fetching, url = %request.url, "Flight query");
        let response = self.source.fetch(&request).await.map_err(|e| {
            error!(stage = %QueryStage::Fetching, error = %e, url = %request.url, "Flight provider unreachable");
            QueryError::UpstreamTransport(e.to_string())
        })?;

        if !response.is_success() {
            error!(
                stage = %QueryStage::Fetching,
                status = response.status,
                url = %request.url,
                body = %body_excerpt(&response.body),
                "Flight provider returned an error status"
            );
            return Err(QueryError::UpstreamStatus {
                status: response.status,
            });
        }

        debug!(stage = %QueryStage::Parsing, bytes = response.body.len(), "Flight query");
        let normalized = normalize(&response.body).map_err(|e| {
            error!(
                stage = %QueryStage::Parsing,
                error = %e,
                body = %body_excerpt(&response.body),
                "Flight provider response did not match a known envelope"
            );
            QueryError::from(e)
        })?;

        if normalized.dropped.total() > 0 {
            warn!(
                not_an_object = normalized.dropped.not_an_object,
                missing_id = normalized.dropped.missing_id,
                duplicate_id = normalized.dropped.duplicate_id,
                "Dropped unusable flight records"
            );
        }

        let page_size = request.page_size();
        let truncated = normalized.returned_count == page_size as usize;

        info!(
            stage = %QueryStage::Done,
            start = %range.start(),
            end = %range.end(),
            returned = normalized.returned_count,
            kept = normalized.records.len(),
            truncated = truncated,
            "Flight query complete"
        );

        Ok(QueryOutcome {
            range,
            records: normalized.records,
            truncated,
            page_size,
            returned_count: normalized.returned_count,
            dropped: normalized.dropped,
        })
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let end = body.len().min(LOG_BODY_LIMIT);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{TransportError, UpstreamResponse};
    use async_trait::async_trait;
    use bytes::Bytes;
    use flight_protocol::{ParseError, UpstreamRequest, ValidationError};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use test_utils::{flat_envelope, full_page, nested_envelope, places, provider_error_body};
    use tokio_test::{assert_err, assert_ok};

    const TOKEN: &str = "tok-5a953ef0de24";

    struct StubSource {
        response: Result<UpstreamResponse, TransportError>,
        calls: AtomicUsize,
        last_url: Mutex<Option<String>>,
    }

    impl StubSource {
        fn new(response: Result<UpstreamResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                last_url: Mutex::new(None),
            })
        }

        fn json(status: u16, body: serde_json::Value) -> Arc<Self> {
            Self::new(Ok(UpstreamResponse {
                status,
                body: Bytes::from(body.to_string()),
            }))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FlightSource for StubSource {
        async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = Some(request.url.clone());
            self.response.clone()
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn service(source: Arc<StubSource>) -> QueryService {
        QueryService::new(
            DateRangePolicy::default(),
            UpstreamQueryBuilder::new("http://provider.test/api/v0"),
            ApiCredential::new(TOKEN).unwrap(),
            source,
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[tokio::test]
    async fn test_success_nested_envelope() {
        let source = StubSource::json(
            200,
            nested_envelope(vec![test_utils::flight_json(
                "f1",
                places::OKC_DOWNTOWN.0,
                places::OKC_DOWNTOWN.1,
            )]),
        );
        let outcome = assert_ok!(
            service(source.clone())
                .execute(Some("2024-01-01"), Some("2024-01-15"), today())
                .await
        );

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "f1");
        assert!(!outcome.truncated);
        assert_eq!(outcome.page_size, 500);
        assert_eq!(outcome.returned_count, 1);
        assert_eq!(source.calls(), 1);
        assert_eq!(
            source.last_url.lock().unwrap().as_deref(),
            Some("http://provider.test/api/v0/flights?takeoff_since=2024-01-01&takeoff_before=2024-01-15&per_page=500&page_number=1")
        );
    }

    #[tokio::test]
    async fn test_defaults_applied_when_no_dates() {
        let source = StubSource::json(200, flat_envelope(vec![]));
        let outcome = assert_ok!(service(source.clone()).execute(None, None, today()).await);

        assert_eq!(outcome.range.start(), NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
        assert_eq!(outcome.range.end(), NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_call() {
        let source = StubSource::json(200, flat_envelope(vec![]));
        let err = assert_err!(
            service(source.clone())
                .execute(Some("2024-01-10"), Some("2024-01-01"), today())
                .await
        );

        assert!(matches!(err, QueryError::Validation(ValidationError::InvalidRange(_))));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.stage(), QueryStage::Validating);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_page_is_truncated() {
        let source = StubSource::json(200, flat_envelope(full_page(500, places::OKC_DOWNTOWN)));
        let outcome = assert_ok!(service(source).execute(None, None, today()).await);

        assert!(outcome.truncated);
        assert_eq!(outcome.returned_count, 500);
    }

    #[tokio::test]
    async fn test_truncation_counts_dropped_elements() {
        let mut page = full_page(499, places::OKC_DOWNTOWN);
        page.push(serde_json::json!({"takeoff": "2024-01-05T14:00:00Z"}));
        let source = StubSource::json(200, flat_envelope(page));
        let outcome = assert_ok!(service(source).execute(None, None, today()).await);

        assert!(outcome.truncated);
        assert_eq!(outcome.records.len(), 499);
        assert_eq!(outcome.dropped.missing_id, 1);
        assert_eq!(outcome.into_response().dropped_count, 1);
    }

    #[tokio::test]
    async fn test_upstream_503_is_generic_to_caller_detailed_in_log() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = StubSource::json(503, provider_error_body());
        let err = assert_err!(service(source.clone()).execute(None, None, today()).await);

        assert!(matches!(err, QueryError::UpstreamStatus { status: 503 }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.stage(), QueryStage::Fetching);
        assert!(!err.public_message().contains("503"));
        assert!(!err.public_message().contains("maintenance"));
        assert_eq!(source.calls(), 1);

        let output = logs.contents();
        assert!(output.contains("503"));
        assert!(output.contains("upstream maintenance window"));
        assert!(!output.contains(TOKEN));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let source = StubSource::new(Err(TransportError("connection refused".to_string())));
        let err = assert_err!(service(source.clone()).execute(None, None, today()).await);

        assert!(matches!(err, QueryError::UpstreamTransport(_)));
        assert_eq!(err.status_code(), 502);
        assert!(!err.public_message().contains("refused"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_body_is_parse_error() {
        let source = StubSource::new(Ok(UpstreamResponse {
            status: 200,
            body: Bytes::from_static(b"<html>gateway</html>"),
        }));
        let err = assert_err!(service(source).execute(None, None, today()).await);

        assert!(matches!(err, QueryError::Parse(ParseError::MalformedJson(_))));
        assert_eq!(err.stage(), QueryStage::Parsing);

        let source = StubSource::json(200, serde_json::json!({"data": 7}));
        let err = assert_err!(service(source).execute(None, None, today()).await);
        assert!(matches!(err, QueryError::Parse(ParseError::UnexpectedShape(_))));
    }

    #[test]
    fn test_body_excerpt_is_bounded() {
        let body = vec![b'x'; 4096];
        assert_eq!(body_excerpt(&body).len(), LOG_BODY_LIMIT);
        assert_eq!(body_excerpt(b"short"), "short");
    }
}
