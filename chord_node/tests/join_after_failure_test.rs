use std::time::Duration;

mod common;
use common::{stabilize_ring, start_node};

/// A node can join through an address whose owner has since failed,
/// as long as at least one ring member still answers at that address's
/// logical position — here node1 joins via node0 while node0 is still
/// alive, then node0 dies and a fresh node4 must still be able to join
/// the surviving ring through node1.
#[tokio::test]
async fn join_succeeds_after_entry_point_departs() {
    let (node0, addr0, _h0) = start_node(8).await;
    let (node1, _addr1, h1) = start_node(8).await;
    let (node2, _addr2, _h2) = start_node(8).await;

    node1.join(addr0.clone()).await.expect("node1 join");
    node2.join(addr0.clone()).await.expect("node2 join");

    let nodes = vec![node0.clone(), node1.clone(), node2.clone()];
    stabilize_ring(&nodes, 8).await;

    h1.abort();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let survivors = vec![node0.clone(), node2.clone()];
    stabilize_ring(&survivors, 8).await;

    let (node3, _addr3, _h3) = start_node(8).await;
    node3
        .join(addr0.clone())
        .await
        .expect("node3 should join the surviving ring through node0");

    stabilize_ring(&[node0, node2, node3.clone()], 8).await;
    assert!(!node3.successor_list().await.is_empty());
}
