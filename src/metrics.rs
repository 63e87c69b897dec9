//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! The [`BatchAuthorizer`](crate::authorizer::BatchAuthorizer) reports one
//! [`BatchStats`] per `authorize_batch` call, failed ones included, and one
//! [`DispatchStats`] per verify call it sends to the policy engine. Implement [`MetricsSink`] to
//! forward these to Prometheus, OpenTelemetry or any other backend, and
//! install it with `BatchAuthorizer::with_metrics_sink`.
//!
//! ```ignore
//! use authcenter_core::metrics::{BatchStats, DispatchStats, MetricsSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct CallCounter {
//!     dispatches: AtomicU64,
//! }
//!
//! impl MetricsSink for CallCounter {
//!     fn on_batch(&self, _stats: &BatchStats) {}
//!
//!     fn on_dispatch(&self, _stats: &DispatchStats) {
//!         self.dispatches.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use std::time::Duration;

use serde::Serialize;
use strum_macros::Display;

use crate::types::ScopeKind;

/// Which verify endpoint a bucket was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerifyKind {
    /// Entries carrying instance ids.
    Exact,
    /// Type-level entries.
    Any,
}

/// Summary of one `authorize_batch` call, reported whether or not the call
/// succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    /// Resources in the request.
    pub total: usize,
    /// Resources allowed by the skip table.
    pub skipped: usize,
    /// Verify calls sent.
    pub dispatches: usize,
    /// Resources allowed, skipped ones included.
    pub allowed: usize,
    /// Time spent mapping and bucketing.
    pub mapping: Duration,
    /// Time spent waiting on the policy engine.
    pub dispatch: Duration,
    pub total_duration: Duration,
    /// False when mapping or any dispatch failed and no decisions were
    /// returned.
    pub success: bool,
}

impl BatchStats {
    /// Time not accounted for by the measured phases.
    pub fn overhead(&self) -> Duration {
        self.total_duration
            .saturating_sub(self.mapping)
            .saturating_sub(self.dispatch)
    }
}

/// One verify call to the policy engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchStats {
    pub scope: ScopeKind,
    pub verify: VerifyKind,
    pub entries: usize,
    pub duration: Duration,
    /// False when the call failed or its response was rejected.
    pub success: bool,
}

/// Consumer of authorizer metrics.
///
/// Called synchronously on the request path, so implementations should not
/// block.
pub trait MetricsSink: Send + Sync {
    fn on_batch(&self, stats: &BatchStats);

    fn on_dispatch(&self, _stats: &DispatchStats) {}
}

/// Drops everything. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_batch(&self, _stats: &BatchStats) {}
}
