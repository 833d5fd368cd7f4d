//! String hashing for BLO string tables.
//!
//! String table entries carry a 16-bit hash of their string under a
//! multiply-add scheme (base 3, 16-bit wraparound). The game only uses it
//! as a lookup hint; offsets are authoritative. It is emitted for format
//! compliance and never relied on when reading.

/// Hash a string into the 16-bit value stored next to its table offset.
///
/// Characters are hashed by Unicode codepoint, which coincides with the
/// byte value for the ASCII names game data uses.
pub fn hash_string(s: &str) -> u16 {
    let mut hash: u32 = 0;
    for c in s.chars() {
        hash = hash.wrapping_mul(3).wrapping_add(c as u32) & 0xFFFF;
    }
    hash as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(hash_string(""), 0);
        assert_eq!(hash_string("a"), 97);
        // 'a'*3 + 'b' = 291 + 98
        assert_eq!(hash_string("ab"), 389);
    }

    #[test]
    fn test_deterministic() {
        let a = hash_string("mat_dummy1");
        let b = hash_string("mat_dummy1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_wraparound() {
        // Long strings must stay within 16 bits.
        let s = "x".repeat(64);
        let _ = hash_string(&s);
    }
}
