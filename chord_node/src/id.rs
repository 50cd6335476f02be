//! Identifier arithmetic on the m-bit Chord ring.
//!
//! Ids are big-endian byte strings (the wire type is `Vec<u8>`, to
//! keep the width a runtime parameter per spec). `[u8]`'s
//! lexicographic `Ord` already matches unsigned big-endian
//! comparison, so these are free functions over slices rather than a
//! wrapper newtype.

pub use chord_proto::hash_key;

/// True iff `x` lies strictly clockwise between `a` and `b` on the ring.
pub fn between(x: &[u8], a: &[u8], b: &[u8]) -> bool {
    use std::cmp::Ordering::*;
    match a.cmp(b) {
        Less => a < x && x < b,
        Greater => x > a || x < b,
        Equal => x != a,
    }
}

/// `between` plus `x == b`.
pub fn between_right_incl(x: &[u8], a: &[u8], b: &[u8]) -> bool {
    between(x, a, b) || x == b
}

/// Lowercase hex rendering of an id, for log lines.
pub fn hex_id(id: &[u8]) -> String {
    id.iter().map(|b| format!("{:02x}", b)).collect()
}

/// `(a - b) mod 2^m`, big-endian, same-length inputs.
fn sub_mod(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; a.len()];
    let mut borrow: i16 = 0;
    for i in (0..a.len()).rev() {
        let mut diff = a[i] as i16 - b[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result[i] = diff as u8;
    }
    result
}

/// Shortest ring distance between `a` and `b`: `min(a-b, b-a) mod 2^m`.
/// Used to pick the farthest existing replica-group membership to
/// evict when a new member needs room.
pub fn ring_distance(a: &[u8], b: &[u8]) -> Vec<u8> {
    let d1 = sub_mod(a, b);
    let d2 = sub_mod(b, a);
    if d1 <= d2 {
        d1
    } else {
        d2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_normal_range() {
        assert!(between(&[50], &[10], &[100]));
        assert!(!between(&[5], &[10], &[100]));
        assert!(!between(&[100], &[10], &[100]));
    }

    #[test]
    fn between_wraps_around() {
        assert!(between(&[250], &[200], &[10]));
        assert!(between(&[5], &[200], &[10]));
        assert!(!between(&[100], &[200], &[10]));
    }

    #[test]
    fn between_equal_bounds_is_whole_ring_except_a() {
        for x in 0u8..=255 {
            if x == 42 {
                assert!(!between(&[x], &[42], &[42]));
            } else {
                assert!(between(&[x], &[42], &[42]));
            }
        }
    }

    #[test]
    fn right_inclusive_adds_the_boundary() {
        assert!(!between(&[100], &[10], &[100]));
        assert!(between_right_incl(&[100], &[10], &[100]));
    }

    #[test]
    fn find_successor_boundaries_scenario() {
        // Wraparound case: node A(118), successor C(19).
        // find_successor(119) should land in (118, 19] -> true.
        assert!(between_right_incl(&[119], &[118], &[19]));
        assert!(between_right_incl(&[19], &[118], &[19]));
        assert!(!between_right_incl(&[118], &[118], &[19]));
    }

    #[test]
    fn ring_distance_picks_shorter_direction() {
        // 8-bit ring: distance(10, 250) should go the short way through 0.
        assert_eq!(ring_distance(&[10], &[250]), vec![16]);
        assert_eq!(ring_distance(&[10], &[20]), vec![10]);
        assert_eq!(ring_distance(&[5], &[5]), vec![0]);
    }

    #[test]
    fn solo_node_between_right_incl_is_always_true() {
        // successor == self: the degenerate a == b case used by
        // find_successor on a solo ring.
        for x in 0u8..=255 {
            assert!(between_right_incl(&[x], &[7], &[7]));
        }
    }
}
