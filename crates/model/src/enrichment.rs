//! Enrichment lookup record shapes (hostname / tenant / SLA profile).

use std::collections::HashMap;

/// A link-map entry: an overlay interface name mapped to the tuple
/// `(underlay, link-type, traffic-destination, link-metadata)`, split on
/// `@` from the raw config value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMapEntry {
    /// The underlying transport link.
    pub underlay: String,
    /// The type of the link (e.g. `INTERNET`, `MPLS`).
    pub link_type: String,
    /// The class of traffic this link carries.
    pub traffic_destination: String,
    /// Free-form metadata describing the link.
    pub link_metadata: String,
}

impl LinkMapEntry {
    /// Parses a raw `underlay@type@destination@metadata` config value.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(4, '@');
        Some(Self {
            underlay: parts.next()?.to_string(),
            link_type: parts.next().unwrap_or_default().to_string(),
            traffic_destination: parts.next().unwrap_or_default().to_string(),
            link_metadata: parts.next().unwrap_or_default().to_string(),
        })
    }
}

/// Enrichment record keyed by `hostname`.
#[derive(Debug, Clone, Default)]
pub struct HostnameRecord {
    /// The owning tenant.
    pub tenant: String,
    /// The device's location.
    pub location: String,
    /// The device identifier.
    pub device: String,
    /// Additional key/value pairs parsed from the record's free-form `tags`
    /// blob.
    pub tags: HashMap<String, String>,
    /// Overlay interface name -> link-map entry.
    pub linkmap: HashMap<String, LinkMapEntry>,
}

/// Enrichment record keyed by `tenant`.
#[derive(Debug, Clone, Default)]
pub struct TenantRecord {
    /// The tenant's address block, applied to the `tenantaddr` field.
    pub tenantaddr: String,
    /// Additional key/value pairs parsed from the record's free-form `tags`
    /// blob.
    pub tags: HashMap<String, String>,
    /// DSCP code point -> alias, for IPv4 destinations.
    pub dscpmap_ipv4: HashMap<String, String>,
    /// DSCP code point -> alias, for IPv6 destinations.
    pub dscpmap_ipv6: HashMap<String, String>,
}

/// Enrichment record keyed by `(tenant, device, sla-profile)`.
#[derive(Debug, Clone, Default)]
pub struct SlaProfileRecord {
    /// Key/value SLA parameters (latency/jitter/loss targets, etc.) parsed
    /// from the record's free-form `sla_params` blob.
    pub sla_params: HashMap<String, String>,
}

/// Composite key for the `SlaProfileRecord` lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlaProfileKey {
    /// The tenant.
    pub tenant: String,
    /// The device.
    pub device: String,
    /// The SLA profile name.
    pub sla_profile: String,
}
