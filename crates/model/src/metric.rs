//! UVE aggregation output.

use std::collections::HashMap;

use crate::value::FieldValue;

/// Which of the five output groupings a `MetricRecord` belongs to. `Star`
/// in the `app_metrics_*_sla` naming convention is `Diff` for monotonic
/// counters and `Dial` for gauges; that distinction is folded into the
/// variant name here instead of a separate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MetricGroup {
    /// `app_metrics_diff_sla` / `app_metrics_dial_sla`.
    AppMetricsSla,
    /// `app_metrics_diff_user` / `app_metrics_dial_user` (only populated
    /// when user-summarization is enabled for the tag).
    AppMetricsUser,
    /// `app_metrics_diff_link` / `app_metrics_dial_link`.
    AppMetricsLink,
    /// `link_metrics_diff_traffic_type` / `link_metrics_dial_traffic_type`.
    LinkMetricsTrafficType,
    /// `tenant_metrics_diff_sla` / `tenant_metrics_dial_sla`.
    TenantMetricsSla,
}

/// Whether a `MetricRecord` carries a cumulative-to-differential counter
/// delta or an instantaneous gauge reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A counter difference (`diff`).
    Diff,
    /// An instantaneous reading (`dial`).
    Dial,
}

/// One aggregated UVE metric record, keyed by `(tenant, location, device)`
/// or a narrower composite depending on the grouping, produced by one of
/// the six `summarize_*` modes for downstream UVE transport.
#[derive(Debug, Clone)]
pub struct MetricRecord {
    /// Which output grouping this record belongs to.
    pub group: MetricGroup,
    /// Whether this is a differential counter or a gauge reading.
    pub kind: MetricKind,
    /// The composite identity key (e.g. `tenant::location::device`).
    pub key: String,
    /// Named metric fields (counters, KPI scores, etc.).
    pub fields: HashMap<String, FieldValue>,
}

impl MetricRecord {
    /// Creates an empty metric record for the given group/kind/key.
    pub fn new(group: MetricGroup, kind: MetricKind, key: impl Into<String>) -> Self {
        Self {
            group,
            kind,
            key: key.into(),
            fields: HashMap::new(),
        }
    }
}
