//! Pure decoration logic: enriches a [`SyslogRecord`] in place and stitches
//! the same key/value pairs into its `forward_buf`.

use collector_model::{FieldValue, SyslogRecord};

use crate::store::EnrichmentSnapshot;

/// Inserts `total-bytes = bytes-from-client + bytes-from-server`.
fn decorate_total_bytes(record: &mut SyslogRecord, forward: &mut ForwardBufWriter) {
    let client = record.int_field("bytes-from-client", 0);
    let server = record.int_field("bytes-from-server", 0);
    if record.fields.contains_key("bytes-from-client") || record.fields.contains_key("bytes-from-server") {
        set_field(record, forward, "total-bytes", FieldValue::Int(client + server));
    }
}

/// Computes `sla-profile`: prefer explicit `sla-rule`; else the substring
/// after the last `_` in `rule-name`; else `"DEFAULT"`.
fn decorate_sla_profile(record: &mut SyslogRecord, forward: &mut ForwardBufWriter) {
    let sla_profile = if !record.str_field("sla-rule").is_empty() {
        record.str_field("sla-rule").to_string()
    } else {
        let rule_name = record.str_field("rule-name");
        match rule_name.rsplit_once('_') {
            Some((_, suffix)) if !suffix.is_empty() => suffix.to_string(),
            _ => "DEFAULT".to_string(),
        }
    };
    set_field(record, forward, "sla-profile", FieldValue::Str(sla_profile));
}

const LINK_FIELDS: &[&str] = &[
    "destination-interface-name",
    "last-incoming-interface-name",
    "uplink-incoming-interface-name",
    "last-destination-interface-name",
];

/// Applies hostname enrichment: tenant/location/device, the free-form tag
/// blob, and the per-link-field linkmap split.
fn decorate_hostname(record: &mut SyslogRecord, snapshot: &EnrichmentSnapshot, forward: &mut ForwardBufWriter) {
    let Some(host) = snapshot.hostnames.get(&record.hostname) else {
        return;
    };

    set_field(record, forward, "tenant", FieldValue::Str(host.tenant.clone()));
    set_field(record, forward, "location", FieldValue::Str(host.location.clone()));
    set_field(record, forward, "device", FieldValue::Str(host.device.clone()));
    for (key, value) in &host.tags {
        set_field(record, forward, key, FieldValue::Str(value.clone()));
    }

    for field in LINK_FIELDS {
        let overlay = record.str_field(field).to_string();
        if overlay.is_empty() {
            continue;
        }
        if let Some(entry) = host.linkmap.get(&overlay) {
            set_field(record, forward, &format!("underlay-{field}"), FieldValue::Str(entry.underlay.clone()));
            set_field(record, forward, &format!("link-type-{field}"), FieldValue::Str(entry.link_type.clone()));
            set_field(
                record,
                forward,
                &format!("traffic-destination-{field}"),
                FieldValue::Str(entry.traffic_destination.clone()),
            );
            set_field(record, forward, &format!("metadata-{field}"), FieldValue::Str(entry.link_metadata.clone()));
        }
    }
}

/// Detects whether `destination-address` is an IPv6 literal (contains
/// `:`) vs. IPv4, for DSCP map selection.
fn is_ipv6(address: &str) -> bool {
    address.contains(':')
}

/// Applies tenant enrichment: `tenantaddr`, tag blob, and DSCP alias
/// resolution from the family-appropriate map.
fn decorate_tenant(record: &mut SyslogRecord, snapshot: &EnrichmentSnapshot, forward: &mut ForwardBufWriter) {
    let tenant_name = record.str_field("tenant").to_string();
    let Some(tenant) = snapshot.tenants.get(&tenant_name) else {
        return;
    };

    set_field(record, forward, "tenantaddr", FieldValue::Str(tenant.tenantaddr.clone()));
    for (key, value) in &tenant.tags {
        set_field(record, forward, key, FieldValue::Str(value.clone()));
    }

    let destination = record.str_field("destination-address");
    let dscp = record.str_field("dscp").to_string();
    let map = if is_ipv6(destination) { &tenant.dscpmap_ipv6 } else { &tenant.dscpmap_ipv4 };
    if let Some(alias) = map.get(&dscp) {
        set_field(record, forward, "dscp-alias-code", FieldValue::Str(alias.clone()));
    }
}

/// Applies the `(tenant, device, sla-profile)` SLA-profile tag blob.
fn decorate_sla(record: &mut SyslogRecord, snapshot: &EnrichmentSnapshot, forward: &mut ForwardBufWriter) {
    let key = collector_model::SlaProfileKey {
        tenant: record.str_field("tenant").to_string(),
        device: record.str_field("device").to_string(),
        sla_profile: record.str_field("sla-profile").to_string(),
    };
    let Some(sla) = snapshot.sla_profiles.get(&key) else {
        return;
    };
    for (field, value) in &sla.sla_params {
        set_field(record, forward, field, FieldValue::Str(value.clone()));
    }
}

/// Runs every decoration rule against `record`, also stitching each
/// inserted key/value pair into its `forward_buf`. Idempotent: re-running
/// on an already-decorated record is a no-op (every value it would insert
/// is already present and non-empty, so `set_field_if_non_empty` skips the
/// replacement and the forward-buffer splice is never triggered).
pub fn decorate(record: &mut SyslogRecord, snapshot: &EnrichmentSnapshot) {
    let mut forward = ForwardBufWriter::new(std::mem::take(&mut record.forward_buf));

    decorate_total_bytes(record, &mut forward);
    decorate_sla_profile(record, &mut forward);
    decorate_hostname(record, snapshot, &mut forward);
    decorate_tenant(record, snapshot, &mut forward);
    decorate_sla(record, snapshot, &mut forward);

    record.forward_buf = forward.finish();
}

fn set_field(record: &mut SyslogRecord, forward: &mut ForwardBufWriter, key: &str, value: FieldValue) {
    let is_empty = matches!(&value, FieldValue::Str(s) if s.is_empty());
    let already_present = record.fields.contains_key(key);
    record.set_field_if_non_empty(key, value.clone());
    if !is_empty && !already_present {
        forward.insert_pair(key, &value.as_str_lossy());
    }
}

/// Stitches ` key="value"` pairs into a frame buffer immediately before its
/// final `]`, keeping the leading `"<L> "` octet-count prefix in sync as
/// the frame grows.
struct ForwardBufWriter {
    buf: Vec<u8>,
}

impl ForwardBufWriter {
    fn new(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    fn insert_pair(&mut self, key: &str, value: &str) {
        let Some(close) = self.buf.iter().rposition(|&b| b == b']') else {
            return;
        };
        let insertion = format!(" {key}=\"{value}\"");
        self.buf.splice(close..close, insertion.into_bytes());
    }

    fn finish(self) -> Vec<u8> {
        let Some(space) = self.buf.iter().position(|&b| b == b' ') else {
            return self.buf;
        };
        let Ok(prefix) = std::str::from_utf8(&self.buf[..space]) else {
            return self.buf;
        };
        let Ok(old_len) = prefix.trim_start_matches('<').trim_end_matches('>').parse::<usize>() else {
            return self.buf;
        };
        let payload_len = self.buf.len() - space - 1;
        if payload_len == old_len {
            return self.buf;
        }
        let mut out = format!("<{payload_len}> ").into_bytes();
        out.extend_from_slice(&self.buf[space + 1..]);
        out
    }
}

#[cfg(test)]
mod test {
    use collector_model::{HostnameRecord, LinkMapEntry, SlaProfileKey, SlaProfileRecord, TenantRecord};

    use super::*;

    fn frame_record(body: &str) -> SyslogRecord {
        let raw = format!("<14>1 2023-01-01T00:00:00Z h TAG [{body}]");
        let mut record = SyslogRecord::new(0, "h", "TAG");
        for pair in body.split_whitespace() {
            if let Some((k, v)) = pair.split_once('=') {
                let _ = record.fields.insert(k.to_string(), FieldValue::Str(v.trim_matches('"').to_string()));
            }
        }
        record.forward_buf = format!("<{}> {}", raw.len(), raw).into_bytes();
        record
    }

    #[test]
    fn total_bytes_is_the_sum_of_client_and_server() {
        let mut record = frame_record("bytes-from-client=\"100\" bytes-from-server=\"50\"");
        let _ = record.fields.insert("bytes-from-client".into(), FieldValue::Int(100));
        let _ = record.fields.insert("bytes-from-server".into(), FieldValue::Int(50));
        decorate(&mut record, &EnrichmentSnapshot::default());
        assert_eq!(record.int_field("total-bytes", -1), 150);
    }

    #[test]
    fn sla_profile_prefers_explicit_rule() {
        let mut record = frame_record("sla-rule=\"gold\"");
        decorate(&mut record, &EnrichmentSnapshot::default());
        assert_eq!(record.str_field("sla-profile"), "gold");
    }

    #[test]
    fn sla_profile_falls_back_to_rule_name_suffix() {
        let mut record = frame_record("rule-name=\"policy_silver\"");
        decorate(&mut record, &EnrichmentSnapshot::default());
        assert_eq!(record.str_field("sla-profile"), "silver");
    }

    #[test]
    fn sla_profile_defaults_when_nothing_present() {
        let mut record = frame_record("k=\"v\"");
        decorate(&mut record, &EnrichmentSnapshot::default());
        assert_eq!(record.str_field("sla-profile"), "DEFAULT");
    }

    #[test]
    fn hostname_lookup_applies_tenant_location_device_and_linkmap() {
        let mut snapshot = EnrichmentSnapshot::default();
        let mut host = HostnameRecord {
            tenant: "acme".into(),
            location: "east".into(),
            device: "dev1".into(),
            ..Default::default()
        };
        let _ = host
            .linkmap
            .insert("ge-0/0/0".into(), LinkMapEntry::parse("mpls1@MPLS@internal@meta").unwrap());
        let _ = snapshot.hostnames.insert("h".into(), host);

        let mut record = frame_record("destination-interface-name=\"ge-0/0/0\"");
        decorate(&mut record, &snapshot);

        assert_eq!(record.str_field("tenant"), "acme");
        assert_eq!(record.str_field("underlay-destination-interface-name"), "mpls1");
        assert_eq!(record.str_field("link-type-destination-interface-name"), "MPLS");
    }

    #[test]
    fn dscp_alias_resolved_from_ipv4_or_ipv6_map_by_destination_family() {
        let mut snapshot = EnrichmentSnapshot::default();
        let mut tenant = TenantRecord::default();
        let _ = tenant.dscpmap_ipv4.insert("46".into(), "EF".into());
        let _ = tenant.dscpmap_ipv6.insert("46".into(), "EF-v6".into());
        let _ = snapshot.tenants.insert("acme".into(), tenant);

        let mut record = frame_record("tenant=\"acme\" destination-address=\"10.0.0.1\" dscp=\"46\"");
        decorate(&mut record, &snapshot);
        assert_eq!(record.str_field("dscp-alias-code"), "EF");

        let mut record_v6 = frame_record("tenant=\"acme\" destination-address=\"::1\" dscp=\"46\"");
        decorate(&mut record_v6, &snapshot);
        assert_eq!(record_v6.str_field("dscp-alias-code"), "EF-v6");
    }

    #[test]
    fn sla_profile_params_applied_from_composite_key_lookup() {
        let mut snapshot = EnrichmentSnapshot::default();
        let mut sla = SlaProfileRecord::default();
        let _ = sla.sla_params.insert("latency-threshold".into(), "100".into());
        let _ = snapshot.sla_profiles.insert(
            SlaProfileKey {
                tenant: "acme".into(),
                device: "dev1".into(),
                sla_profile: "gold".into(),
            },
            sla,
        );

        let mut record = frame_record("tenant=\"acme\" device=\"dev1\" sla-rule=\"gold\"");
        decorate(&mut record, &snapshot);
        assert_eq!(record.str_field("latency-threshold"), "100");
    }

    #[test]
    fn decoration_is_idempotent() {
        let mut snapshot = EnrichmentSnapshot::default();
        let _ = snapshot.hostnames.insert(
            "h".into(),
            HostnameRecord {
                tenant: "acme".into(),
                ..Default::default()
            },
        );
        let mut record = frame_record("k=\"v\"");
        decorate(&mut record, &snapshot);
        let once = record.clone();
        decorate(&mut record, &snapshot);
        assert_eq!(record, once);
    }
}
