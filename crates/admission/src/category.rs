//! Per-message classification used to decide which messages participate in
//! the watermark drop check at all.

use collector_model::CollectorEvent;

/// The message categories the admission controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Flow ingestion, handled by a separate path; always dropped here.
    Flow,
    /// A generic system log message; participates in the severity check.
    System,
    /// An object-trace message; participates in the severity check.
    Object,
    /// A UVE metric; participates in the severity check.
    Uve,
    /// A session-table message; participates in the severity check.
    Session,
    /// Anything else; bypasses the severity check entirely.
    Other,
}

impl Category {
    /// Whether this category is subject to the watermark severity check at
    /// all (`FLOW` is a hard drop, `Other` always bypasses).
    pub fn participates_in_severity_check(self) -> bool {
        matches!(self, Category::System | Category::Object | Category::Uve | Category::Session)
    }
}

/// Classifies an event by its `type` field (for syslog records) or its
/// variant (a [`CollectorEvent::Metric`] is always [`Category::Uve`]).
pub fn classify(event: &CollectorEvent) -> Category {
    match event {
        CollectorEvent::Metric(_) => Category::Uve,
        CollectorEvent::Syslog(record) => {
            if record.tag == "FLOW" {
                return Category::Flow;
            }
            if record.tag.starts_with("APPTRACK_SESSION") {
                return Category::Session;
            }
            match record.str_field("type") {
                "SYSTEM" => Category::System,
                "OBJECT" => Category::Object,
                "UVE" => Category::Uve,
                _ => Category::Other,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use collector_model::SyslogRecord;

    use super::*;

    #[test]
    fn flow_tag_classifies_as_flow_regardless_of_type_field() {
        let record = SyslogRecord::new(0, "h", "FLOW");
        assert_eq!(classify(&CollectorEvent::Syslog(record)), Category::Flow);
    }

    #[test]
    fn unrecognized_type_field_bypasses_the_check() {
        let record = SyslogRecord::new(0, "h", "SomeTag");
        let category = classify(&CollectorEvent::Syslog(record));
        assert_eq!(category, Category::Other);
        assert!(!category.participates_in_severity_check());
    }
}
