//! The six per-tag aggregation modes that turn a decorated `SyslogRecord`
//! into zero or more `MetricRecord`s.

use collector_model::metric::{MetricGroup, MetricKind, MetricRecord};
use collector_model::record::SyslogRecord;
use collector_model::value::FieldValue;

use crate::cache::{session_key, SessionCounterCache};
use crate::kpi::{calculate_link_score, LinkScoreCoefficients, JITTER_UNKNOWN, PACKET_LOSS_UNKNOWN, RTT_UNKNOWN};

const UNKNOWN: &str = "UNKNOWN";

fn field_or(record: &SyslogRecord, key: &str, default: &str) -> String {
    let v = record.str_field(key);
    if v.is_empty() {
        default.to_string()
    } else {
        v.to_string()
    }
}

/// `APPTRACK_SESSION_CLOSE` / `APPTRACK_SESSION_VOL_UPDATE` /
/// `RT_FLOW_NEXTHOP_CHANGE`: cumulative-to-differential traffic counters.
///
/// Vol-update messages only emit a metric when
/// `process_vol_update_enabled` is set; close messages always do.
pub fn summarize_data(record: &SyslogRecord, cache: &mut SessionCounterCache, process_vol_update_enabled: bool) -> Vec<MetricRecord> {
    let is_close = record.tag == "APPTRACK_SESSION_CLOSE";
    let is_vol_update = record.tag == "APPTRACK_SESSION_VOL_UPDATE";

    if is_vol_update && !process_vol_update_enabled {
        return Vec::new();
    }

    let tenant = field_or(record, "tenant", UNKNOWN);
    let location = field_or(record, "location", UNKNOWN);
    let device = field_or(record, "device", UNKNOWN);
    let sla_profile = if is_vol_update { "DEFAULT".to_string() } else { field_or(record, "sla-profile", UNKNOWN) };
    let traffic_type = if is_vol_update { "DEFAULT".to_string() } else { field_or(record, "active-probe-params", UNKNOWN) };

    let session_id_32 = record.int_field("session-id-32", -1);
    let key = session_key(&tenant, &location, &device, session_id_32);

    let cumulative = crate::cache::Counters {
        total_bytes: record.int_field("total-bytes", 0),
        bytes_from_client: record.int_field("bytes-from-client", 0),
        bytes_from_server: record.int_field("bytes-from-server", 0),
        packets_from_client: record.int_field("packets-from-client", 0),
        packets_from_server: record.int_field("packets-from-server", 0),
    };

    let diff = if is_close { cache.close(&key, cumulative) } else { cache.update(&key, cumulative) };
    let diff = match diff {
        Some(d) => d,
        None => return Vec::new(),
    };

    let uvename = format!("{tenant}::{location}::{device}");
    let tenantuvename = format!(
        "{}::{}::{tenant}",
        field_or(record, "region", "DEFAULT"),
        field_or(record, "OPCO", "DEFAULT"),
    );

    let mut fields = std::collections::HashMap::new();
    fields.insert("total_bytes".to_string(), FieldValue::Int(diff.total_bytes));
    fields.insert("bytes_from_client".to_string(), FieldValue::Int(diff.bytes_from_client));
    fields.insert("bytes_from_server".to_string(), FieldValue::Int(diff.bytes_from_server));
    fields.insert("packets_from_client".to_string(), FieldValue::Int(diff.packets_from_client));
    fields.insert("packets_from_server".to_string(), FieldValue::Int(diff.packets_from_server));

    let mut sla = MetricRecord::new(MetricGroup::AppMetricsSla, MetricKind::Diff, format!("{uvename}::{sla_profile}::{traffic_type}"));
    sla.fields = fields.clone();
    let mut tenant_sla = MetricRecord::new(MetricGroup::TenantMetricsSla, MetricKind::Diff, format!("{tenantuvename}::{sla_profile}::{traffic_type}"));
    tenant_sla.fields = fields;

    vec![sla, tenant_sla]
}

/// DSCP alias key derivation shared by the SLA-report aggregators. Per the
/// spec's Open Question, BPS is fed `ip_dscp`/`dscp_alias_code` already
/// swapped by its caller, reproducing an observed bug rather than fixing it.
fn dscp_key(ip_dscp: &str, dscp_alias_code: &str) -> String {
    if ip_dscp == UNKNOWN {
        UNKNOWN.to_string()
    } else if dscp_alias_code == UNKNOWN {
        format!("DSCP-{ip_dscp}")
    } else {
        format!("DSCP-{dscp_alias_code}")
    }
}

fn link_info(record: &SyslogRecord, link_field: &str) -> String {
    let link = field_or(record, link_field, UNKNOWN);
    let underlay_field = format!("underlay-{link_field}");
    let link_type_field = format!("link-type-{link_field}");
    let traffic_destination_field = format!("traffic-destination-{link_field}");
    let metadata_field = format!("metadata-{link_field}");
    format!(
        "{link}@{}@{}@{}@{}",
        field_or(record, &underlay_field, UNKNOWN),
        field_or(record, &link_type_field, UNKNOWN),
        field_or(record, &traffic_destination_field, UNKNOWN),
        field_or(record, &metadata_field, UNKNOWN),
    )
}

fn nested_appname_with_alias(record: &SyslogRecord, key: &str) -> (String, String) {
    let mut nested_appname = field_or(record, "nested-application", UNKNOWN);
    let mut appname = field_or(record, "application", UNKNOWN);
    if nested_appname == UNKNOWN && appname == UNKNOWN {
        let service_name = field_or(record, "service-name", UNKNOWN);
        if service_name != UNKNOWN && service_name != "None" {
            nested_appname = service_name.clone();
            appname = service_name;
        }
    }
    (format!("{nested_appname}@{key}"), appname)
}

struct SlaDial {
    key_prefix: String,
    link_info: String,
    sla_profile: String,
    traffic_type: String,
    location: String,
    username: String,
    fields: std::collections::HashMap<String, FieldValue>,
}

fn coefficients_from_record(record: &SyslogRecord) -> LinkScoreCoefficients {
    LinkScoreCoefficients {
        effective_latency_threshold: record.int_field("effective-latency-threshold", 0),
        latency_factor: record.int_field("latency-factor", 0),
        jitter_factor: record.int_field("jitter-factor", 0),
        packet_loss_factor: record.int_field("packet-loss-factor", 0),
    }
}

fn build_sla_dial(record: &SyslogRecord, link_field: &str, ip_dscp: &str, dscp_alias_code: &str) -> SlaDial {
    let coefficients = coefficients_from_record(record);
    let location = field_or(record, "location", UNKNOWN);
    let sla_profile = field_or(record, "sla-profile", UNKNOWN);
    let app_category = field_or(record, "app-category", UNKNOWN);
    let department = field_or(record, "source-zone-name", UNKNOWN);
    let traffic_type = field_or(record, "active-probe-params", UNKNOWN);

    let key = dscp_key(ip_dscp, dscp_alias_code);
    let (alias, appname) = nested_appname_with_alias(record, &key);
    let key_prefix = format!("{traffic_type}({alias}:{appname}/{app_category})::{department}::");

    let mut username = field_or(record, "username", UNKNOWN);
    if username.eq_ignore_ascii_case("unknown") {
        username = field_or(record, "source-address", UNKNOWN);
    }

    let pkt_loss = record.int_field("pkt-loss", -1);
    let rtt = record.int_field("rtt", -1);
    let rtt_jitter = record.int_field("rtt-jitter", -1);
    let egress_jitter = record.int_field("egress-jitter", -1);
    let ingress_jitter = record.int_field("ingress-jitter", -1);

    let mut fields = std::collections::HashMap::new();
    if rtt != -1 && rtt != RTT_UNKNOWN {
        fields.insert("rtt".to_string(), FieldValue::Int(rtt));
    }
    if rtt_jitter != -1 && rtt_jitter != JITTER_UNKNOWN {
        fields.insert("rtt_jitter".to_string(), FieldValue::Int(rtt_jitter));
    }
    if egress_jitter != -1 && egress_jitter != JITTER_UNKNOWN {
        fields.insert("egress_jitter".to_string(), FieldValue::Int(egress_jitter));
    }
    if ingress_jitter != -1 && ingress_jitter != JITTER_UNKNOWN {
        fields.insert("ingress_jitter".to_string(), FieldValue::Int(ingress_jitter));
    }
    let mut clamped_loss = pkt_loss;
    if pkt_loss != -1 && pkt_loss != PACKET_LOSS_UNKNOWN {
        if clamped_loss > 100 {
            clamped_loss = 100;
        }
        fields.insert("pkt_loss".to_string(), FieldValue::Int(clamped_loss));
    }
    if rtt != -1 && rtt != RTT_UNKNOWN && rtt_jitter != -1 && rtt_jitter != JITTER_UNKNOWN && pkt_loss != -1 && pkt_loss != PACKET_LOSS_UNKNOWN {
        if let Some(score) = calculate_link_score(rtt / 2, clamped_loss, rtt_jitter, coefficients) {
            fields.insert("score".to_string(), FieldValue::Float(score));
        }
    }

    SlaDial {
        key_prefix,
        link_info: link_info(record, link_field),
        sla_profile,
        traffic_type,
        location,
        username,
        fields,
    }
}

fn emit_sla_dial(record: &SyslogRecord, sla: SlaDial, summarize_user: bool) -> Vec<MetricRecord> {
    let tenant = field_or(record, "tenant", UNKNOWN);
    let device = field_or(record, "device", UNKNOWN);
    let uvename = format!("{tenant}::{}::{device}", sla.location);

    let mut out = Vec::new();

    let mut sla_metric = MetricRecord::new(MetricGroup::AppMetricsSla, MetricKind::Dial, format!("{}{}", sla.key_prefix, sla.sla_profile));
    sla_metric.fields = sla.fields.clone();
    out.push(sla_metric);

    if summarize_user {
        let mut user_metric = MetricRecord::new(MetricGroup::AppMetricsUser, MetricKind::Dial, format!("{}{}", sla.key_prefix, sla.username));
        user_metric.fields = sla.fields.clone();
        out.push(user_metric);
    }

    let mut link_metric = MetricRecord::new(MetricGroup::AppMetricsLink, MetricKind::Dial, format!("{}{}", sla.key_prefix, sla.link_info));
    link_metric.fields = sla.fields.clone();
    out.push(link_metric);

    let mut link_traffic_metric = MetricRecord::new(
        MetricGroup::LinkMetricsTrafficType,
        MetricKind::Dial,
        format!("{}::{}::{}", sla.link_info, sla.sla_profile, sla.traffic_type),
    );
    link_traffic_metric.fields = sla.fields.clone();
    out.push(link_traffic_metric);

    let mut tenant_metric = MetricRecord::new(
        MetricGroup::TenantMetricsSla,
        MetricKind::Dial,
        format!("{}::{}::{}", sla.location, sla.sla_profile, sla.traffic_type),
    );
    tenant_metric.fields = sla.fields;
    out.push(tenant_metric);

    let _ = uvename;
    out
}

/// `APPQOE_BEST_PATH_SELECTED`. Per the Open Question, the `ip_dscp` and
/// `dscp_alias_code` reads are intentionally swapped relative to PSMR,
/// reproducing the source's behavior rather than correcting it.
pub fn summarize_bps(record: &SyslogRecord, summarize_user: bool) -> Vec<MetricRecord> {
    let ip_dscp = field_or(record, "dscp-alias-code", UNKNOWN);
    let dscp_alias_code = field_or(record, "ip-dscp", UNKNOWN);
    let sla = build_sla_dial(record, "previous-interface", &ip_dscp, &dscp_alias_code);
    emit_sla_dial(record, sla, summarize_user)
}

/// `APPQOE_PASSIVE_SLA_METRIC_REPORT` / `APPQOE_APP_PASSIVE_SLA_METRIC_REPORT`.
pub fn summarize_psmr(record: &SyslogRecord, summarize_user: bool) -> Vec<MetricRecord> {
    let ip_dscp = field_or(record, "ip-dscp", UNKNOWN);
    let dscp_alias_code = field_or(record, "dscp-alias-code", UNKNOWN);
    let sla = build_sla_dial(record, "destination-interface-name", &ip_dscp, &dscp_alias_code);
    emit_sla_dial(record, sla, summarize_user)
}

/// `APPQOE_ACTIVE_SLA_METRIC_REPORT`.
pub fn summarize_asmr(record: &SyslogRecord, summarize_user: bool) -> Vec<MetricRecord> {
    let ip_dscp = field_or(record, "ip-dscp", UNKNOWN);
    let dscp_alias_code = field_or(record, "dscp-alias-code", UNKNOWN);
    let sla = build_sla_dial(record, "destination-interface-name", &ip_dscp, &dscp_alias_code);
    emit_sla_dial(record, sla, summarize_user)
}

/// `APPQOE_SLA_METRIC_VIOLATION`. Violation records carry a differential
/// count (or duration) rather than a gauge reading, so this emits
/// `MetricKind::Diff` records reusing the SLA-dial key composition.
pub fn summarize_smv(record: &SyslogRecord, summarize_user: bool) -> Vec<MetricRecord> {
    let violation_reason = record.int_field("violation-reason", -1);
    if violation_reason < 0 {
        return Vec::new();
    }

    let ip_dscp = field_or(record, "ip-dscp", UNKNOWN);
    let dscp_alias_code = field_or(record, "dscp-alias-code", UNKNOWN);
    let sla = build_sla_dial(record, "destination-interface-name", &ip_dscp, &dscp_alias_code);

    let mut fields = std::collections::HashMap::new();
    if violation_reason > 0 {
        fields.insert("sla_violation_count".to_string(), FieldValue::Int(1));
        if record.int_field("jitter-violation-count", 0) != 0 {
            fields.insert("jitter_violation_count".to_string(), FieldValue::Int(1));
        }
        if record.int_field("rtt-violation-count", 0) != 0 {
            fields.insert("rtt_violation_count".to_string(), FieldValue::Int(1));
        }
        if record.int_field("pkt-loss-violation-count", 0) != 0 {
            fields.insert("pkt_loss_violation_count".to_string(), FieldValue::Int(1));
        }
    } else {
        fields.insert("sla_violation_duration".to_string(), FieldValue::Int(record.int_field("violation-duration", 0)));
    }

    let sla = SlaDial { fields, ..sla };
    let mut out = emit_sla_dial(record, sla, summarize_user);
    for m in &mut out {
        m.kind = MetricKind::Diff;
    }
    out
}
