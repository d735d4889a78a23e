//! The `Msg` type shared by every receiver/processor/exporter in this
//! pipeline.

use crate::{metric::MetricRecord, record::SyslogRecord};

/// A single message flowing through the pipeline.
///
/// The pipeline's generic `Msg` type parameter is instantiated once with
/// this enum, so a record and the metrics it derives travel through the
/// same processor chain and can be routed to different exporters
/// (`collector-store`, `collector-uve`'s transport, `collector-forwarder`)
/// without three parallel pipelines. This mirrors the two/three-variant
/// tagged-value design note for per-record fields, applied one level up.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CollectorEvent {
    /// A parsed, possibly decorated, structured-syslog record.
    Syslog(SyslogRecord),
    /// A UVE metric record derived from one or more syslog records.
    Metric(MetricRecord),
}

impl CollectorEvent {
    /// Returns the inner syslog record, if this event carries one.
    pub fn as_syslog(&self) -> Option<&SyslogRecord> {
        match self {
            CollectorEvent::Syslog(record) => Some(record),
            CollectorEvent::Metric(_) => None,
        }
    }

    /// Returns the inner syslog record mutably, if this event carries one.
    pub fn as_syslog_mut(&mut self) -> Option<&mut SyslogRecord> {
        match self {
            CollectorEvent::Syslog(record) => Some(record),
            CollectorEvent::Metric(_) => None,
        }
    }

    /// Returns the inner metric record, if this event carries one.
    pub fn as_metric(&self) -> Option<&MetricRecord> {
        match self {
            CollectorEvent::Metric(metric) => Some(metric),
            CollectorEvent::Syslog(_) => None,
        }
    }
}
