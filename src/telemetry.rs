//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Common labels
//!
//! - `operation`: gateway operation (e.g. "user", "repo", "followers")
//! - `status`: outcome, "ok", "not_found" or "error"

/// Total remote calls issued by the gateway (one per attempt).
///
/// Labels: `operation`, `status`.
pub const REMOTE_REQUESTS_TOTAL: &str = "huginn_remote_requests_total";

/// Remote call duration in seconds, retries included.
///
/// Labels: `operation`.
pub const REMOTE_REQUEST_DURATION_SECONDS: &str = "huginn_remote_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Total entity cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total entity cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Candidates dropped because they could not be scored.
pub const CANDIDATES_DROPPED_TOTAL: &str = "huginn_candidates_dropped_total";

/// Finished recommendation requests.
///
/// Labels: `status` ("success" | "error").
pub const RECOMMENDATIONS_TOTAL: &str = "huginn_recommendations_total";
