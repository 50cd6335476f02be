use chord_proto::chord::NodeInfo;

/// Reconcile our successor list against the list we just pulled from
/// our successor: prepend the successor, drop the surplus tail so the
/// result stays at `size` entries. Builds a fresh `Vec` rather than
/// mutating a caller-supplied buffer in place.
pub fn reconcile(successor: &NodeInfo, successors_of_successor: &[NodeInfo], size: usize) -> Vec<NodeInfo> {
    let mut new_list = Vec::with_capacity(size);
    new_list.push(successor.clone());
    for node in successors_of_successor {
        if new_list.len() >= size {
            break;
        }
        new_list.push(node.clone());
    }
    new_list
}

/// True iff the two lists name the same nodes, by id, in the same
/// order.
pub fn same_members(a: &[NodeInfo], b: &[NodeInfo]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.id == y.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> NodeInfo {
        NodeInfo {
            id: vec![id],
            address: format!("127.0.0.1:{}", 5000 + id as u16),
        }
    }

    #[test]
    fn prepends_and_truncates() {
        let successor = node(10);
        let their_list = vec![node(20), node(30), node(40)];
        let result = reconcile(&successor, &their_list, 3);
        assert_eq!(
            result.iter().map(|n| n.id[0]).collect::<Vec<_>>(),
            vec![10, 20, 30]
        );
    }

    #[test]
    fn degenerate_single_entry_list_does_not_double_index() {
        // r = 1: reconcile should yield exactly [successor], never
        // touching successors_of_successor at all.
        let successor = node(10);
        let their_list = vec![node(20)];
        let result = reconcile(&successor, &their_list, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id[0], 10);
    }

    #[test]
    fn same_members_compares_by_id_order() {
        let a = vec![node(1), node(2)];
        let b = vec![node(1), node(2)];
        let c = vec![node(2), node(1)];
        assert!(same_members(&a, &b));
        assert!(!same_members(&a, &c));
    }
}
