//! DJB2 hashing and the four-way tag-group bucketing used by the stats
//! table's clustering columns.

/// The classic DJB2 string hash (`5381` seed, `hash*33 + byte`).
pub fn djb2(s: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(byte as u32);
    }
    hash
}

/// Which of the four hash-grouped clustering columns a non-reserved tag
/// name lands in.
pub fn tag_group(tag_name: &str, num_groups: u32) -> u32 {
    djb2(tag_name) % num_groups
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn djb2_matches_the_reference_seed_and_recurrence() {
        // hash = 5381, then hash = hash*33 + byte for each byte of "a".
        assert_eq!(djb2("a"), 5381u32.wrapping_mul(33).wrapping_add(b'a' as u32));
    }

    #[test]
    fn same_name_always_lands_in_the_same_group() {
        let g1 = tag_group("app-category", 4);
        let g2 = tag_group("app-category", 4);
        assert_eq!(g1, g2);
        assert!(g1 < 4);
    }

    #[test]
    fn different_names_can_collide_or_not_but_stay_bounded() {
        for name in ["a", "bb", "ccc", "dddd", "sla-profile", "tenant"] {
            assert!(tag_group(name, 4) < 4);
        }
    }
}
