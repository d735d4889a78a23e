//! The four discard rules applied before aggregation; a discarded record
//! still reaches the table writer, it just never reaches `summarize`.

use collector_model::record::SyslogRecord;

/// Returns `true` if `record` matches one of the known UVE discard rules
/// and should be dropped before summarization.
pub fn should_discard(record: &SyslogRecord) -> bool {
    match record.tag.as_str() {
        "APPTRACK_SESSION_CLOSE" => record.str_field("routing-instance").starts_with("LAN-"),
        "APPTRACK_SESSION_VOL_UPDATE" => {
            let zone = record.str_field("source-zone-name");
            zone.starts_with("trust") || zone.starts_with("untrust")
        }
        "APPQOE_BEST_PATH_SELECTED" => {
            let reason = record.str_field("reason");
            reason == "session close" || reason == "app detected"
        }
        "SNMP_TRAP_LINK_UP" | "SNMP_TRAP_LINK_DOWN" => {
            record.str_field("role") == "HUB" && !record.str_field("interface").starts_with("st")
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record_with(tag: &str, fields: &[(&str, &str)]) -> SyslogRecord {
        let mut r = SyslogRecord::new(0, "h", tag);
        for (k, v) in fields {
            r.fields.insert((*k).to_string(), collector_model::value::FieldValue::Str((*v).to_string()));
        }
        r
    }

    #[test]
    fn incoming_traffic_mirror_is_discarded() {
        let r = record_with("APPTRACK_SESSION_CLOSE", &[("routing-instance", "LAN-Blue")]);
        assert!(should_discard(&r));
    }

    #[test]
    fn non_mirror_close_is_kept() {
        let r = record_with("APPTRACK_SESSION_CLOSE", &[("routing-instance", "WAN-Blue")]);
        assert!(!should_discard(&r));
    }

    #[test]
    fn trust_zone_vol_update_is_discarded() {
        let r = record_with("APPTRACK_SESSION_VOL_UPDATE", &[("source-zone-name", "untrusted-dmz")]);
        assert!(should_discard(&r));
    }

    #[test]
    fn best_path_selected_reason_filter() {
        let discarded = record_with("APPQOE_BEST_PATH_SELECTED", &[("reason", "app detected")]);
        let kept = record_with("APPQOE_BEST_PATH_SELECTED", &[("reason", "link down")]);
        assert!(should_discard(&discarded));
        assert!(!should_discard(&kept));
    }

    #[test]
    fn hub_snmp_trap_non_st_interface_is_discarded() {
        let discarded = record_with("SNMP_TRAP_LINK_DOWN", &[("role", "HUB"), ("interface", "ge-0/0/1")]);
        let kept_st = record_with("SNMP_TRAP_LINK_DOWN", &[("role", "HUB"), ("interface", "st0.1")]);
        let kept_non_hub = record_with("SNMP_TRAP_LINK_UP", &[("role", "SPOKE"), ("interface", "ge-0/0/1")]);
        assert!(should_discard(&discarded));
        assert!(!should_discard(&kept_st));
        assert!(!should_discard(&kept_non_hub));
    }
}
