pub mod chord {
    tonic::include_proto!("chord");
}

/// SHA-1(s) truncated to the first `m_bits` bits, big-endian. `m_bits`
/// must be a multiple of 8; callers are expected to have validated
/// this against `Config::key_size` already.
pub fn hash_key(s: &str, m_bits: u32) -> Vec<u8> {
    use sha1::{Digest, Sha1};
    debug_assert_eq!(m_bits % 8, 0, "key size must be a multiple of 8 bits");
    let mut hasher = Sha1::new();
    hasher.update(s.as_bytes());
    let digest = hasher.finalize();
    let n_bytes = (m_bits / 8) as usize;
    digest[..n_bytes].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_requested_width() {
        let id8 = hash_key("key1", 8);
        let id160 = hash_key("key1", 160);
        assert_eq!(id8.len(), 1);
        assert_eq!(id160.len(), 20);
        assert_eq!(id8[0], id160[0]);
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(hash_key("abc", 8), hash_key("abc", 8));
    }
}
