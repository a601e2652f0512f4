//! Upstream flight-search request construction.

use std::collections::BTreeMap;
use std::fmt;

use crate::dates::DateRange;
use crate::paging::{PAGE_NUMBER, PAGE_SIZE};

/// Path of the provider's flight-search endpoint, relative to its base URL.
pub const FLIGHTS_PATH: &str = "/flights";

/// Provider API token.
///
/// Never printed: `Debug` and `Display` both render a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wrap a token, rejecting blank values.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw token, for placing into the outbound header only.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(<redacted>)")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// HTTP method of an upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// Value of an outbound header.
#[derive(Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Public(String),
    Sensitive(ApiCredential),
}

impl HeaderValue {
    /// The value as sent on the wire.
    pub fn expose(&self) -> &str {
        match self {
            HeaderValue::Public(v) => v,
            HeaderValue::Sensitive(credential) => credential.expose_secret(),
        }
    }

    pub fn is_sensitive(&self) -> bool {
        matches!(self, HeaderValue::Sensitive(_))
    }
}

impl fmt::Debug for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Public(v) => write!(f, "{:?}", v),
            HeaderValue::Sensitive(_) => f.write_str("<redacted>"),
        }
    }
}

/// A fully-resolved request to the provider's flight-search endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<&'static str, HeaderValue>,
    /// Query parameters in the order they appear in `url`.
    pub query: Vec<(&'static str, String)>,
    pub page_size: u32,
    pub page_number: u32,
}

impl UpstreamRequest {
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }
}

impl fmt::Debug for UpstreamRequest {
    // Header values stay out of Debug output so requests can be logged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("page_size", &self.page_size)
            .field("page_number", &self.page_number)
            .finish()
    }
}

/// Builds provider requests against a fixed base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQueryBuilder {
    base_url: String,
}

impl UpstreamQueryBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Derive the single-page search request for `range`.
    pub fn build(&self, range: &DateRange, credential: &ApiCredential) -> UpstreamRequest {
        let query = vec![
            ("takeoff_since", range.start().format("%Y-%m-%d").to_string()),
            ("takeoff_before", range.end().format("%Y-%m-%d").to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page_number", PAGE_NUMBER.to_string()),
        ];

        let query_string = query
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}{}?{}", self.base_url, FLIGHTS_PATH, query_string);

        let mut headers = BTreeMap::new();
        headers.insert("Accept", HeaderValue::Public("application/json".to_string()));
        headers.insert("Authorization", HeaderValue::Sensitive(credential.clone()));

        UpstreamRequest {
            url,
            method: Method::Get,
            headers,
            query,
            page_size: PAGE_SIZE,
            page_number: PAGE_NUMBER,
        }
    }
}
