//! UUID generation for table rows: random for ordinary rows, deterministic
//! (name-based) for `field_names` index rows so re-observing the same field
//! value doesn't churn the index.

use uuid::Uuid;

/// The fixed namespace every `field_names` row UUID is derived from.
const FIELD_NAMES_NAMESPACE: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";

/// Returns a random row UUID, used by every table except `field_names`.
pub fn random_row_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the deterministic UUID for a `field_names` row: a name-based
/// (v5) UUID seeded by the fixed all-`f` namespace and the field's value.
pub fn field_names_uuid(field_value: &str) -> Uuid {
    let namespace = Uuid::parse_str(FIELD_NAMES_NAMESPACE).expect("namespace UUID literal is valid");
    Uuid::new_v5(&namespace, field_value.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_names_uuid_is_deterministic_for_the_same_value() {
        assert_eq!(field_names_uuid("APPTRACK_SESSION_CLOSE"), field_names_uuid("APPTRACK_SESSION_CLOSE"));
    }

    #[test]
    fn field_names_uuid_differs_across_values() {
        assert_ne!(field_names_uuid("APPTRACK_SESSION_CLOSE"), field_names_uuid("RT_FLOW_NEXTHOP_CHANGE"));
    }

    #[test]
    fn random_row_uuids_are_not_equal() {
        assert_ne!(random_row_uuid(), random_row_uuid());
    }
}
