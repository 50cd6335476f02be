use std::collections::HashMap;

/// A replica group this node currently holds a copy of: either its
/// own (it is the leader) or one it follows because it is in the
/// leader's successor list. `leader_id` is the big-endian id bytes of
/// the leader.
#[derive(Debug, Clone)]
pub struct ReplicaGroup {
    pub leader_id: Vec<u8>,
    pub data: HashMap<String, Vec<u8>>,
}

impl ReplicaGroup {
    pub fn new(leader_id: Vec<u8>) -> Self {
        ReplicaGroup {
            leader_id,
            data: HashMap::new(),
        }
    }
}
