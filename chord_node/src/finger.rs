use chord_proto::chord::NodeInfo;

/// One entry of the finger table: `start = (self.id + 2^i) mod 2^m`,
/// paired with the node currently believed to be its successor.
#[derive(Debug, Clone)]
pub struct FingerEntry {
    pub start: Vec<u8>,
    pub node: NodeInfo,
}

/// `(self.id + 2^i) mod 2^m`, computed as a big-endian byte add with
/// wraparound over `m_bits` bits.
pub fn finger_start(self_id: &[u8], i: usize, m_bits: u32) -> Vec<u8> {
    let n_bytes = (m_bits / 8) as usize;
    let mut acc = vec![0u8; n_bytes];
    acc.copy_from_slice(&self_id[..n_bytes]);

    // add 2^i as a big-endian carry starting at the byte holding bit i
    let byte_index_from_end = i / 8;
    let bit_in_byte = i % 8;
    if byte_index_from_end >= n_bytes {
        // 2^i wraps to 0 modulo 2^m when i >= m
        return acc;
    }
    let idx = n_bytes - 1 - byte_index_from_end;
    let mut carry: u16 = 1u16 << bit_in_byte;
    let mut pos = idx as isize;
    while carry != 0 && pos >= 0 {
        let sum = acc[pos as usize] as u16 + (carry & 0xff);
        acc[pos as usize] = (sum & 0xff) as u8;
        carry = (carry >> 8) + (sum >> 8);
        pos -= 1;
    }
    // overflow past the most significant byte wraps modulo 2^m: drop it
    acc
}

/// Build a length-`m_bits` finger table, every entry initially
/// pointing at `self_node`.
pub fn new_finger_table(self_node: &NodeInfo, m_bits: u32) -> Vec<FingerEntry> {
    (0..m_bits as usize)
        .map(|i| FingerEntry {
            start: finger_start(&self_node.id, i, m_bits),
            node: self_node.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finger_start_wraps_at_8_bits() {
        // self.id = 250, m = 8 -> start(i) = (250 + 2^i) mod 256
        let self_id = vec![250u8];
        assert_eq!(finger_start(&self_id, 0, 8), vec![251]);
        assert_eq!(finger_start(&self_id, 1, 8), vec![252]);
        assert_eq!(finger_start(&self_id, 3, 8), vec![2]); // 250+8=258 mod 256 = 2
        assert_eq!(finger_start(&self_id, 7, 8), vec![122]); // 250+128=378 mod 256=122
    }

    #[test]
    fn table_has_m_entries_all_pointing_at_self() {
        let self_node = NodeInfo {
            id: vec![42],
            address: "127.0.0.1:5000".to_string(),
        };
        let table = new_finger_table(&self_node, 8);
        assert_eq!(table.len(), 8);
        assert!(table.iter().all(|e| e.node.id == self_node.id));
    }
}
