use chord_proto::chord::chord_client::ChordClient;
use chord_proto::chord::{GetRequest, PutRequest};
use tonic::Request;

mod common;
use common::{stabilize_ring, start_node};

/// A wider ring than the other tests use, on the full 160-bit (SHA-1)
/// identifier space so port-derived ids don't collide across members.
#[tokio::test]
async fn twelve_node_ring_routes_correctly() {
    const NUM_NODES: usize = 12;

    let mut members = Vec::with_capacity(NUM_NODES);
    for _ in 0..NUM_NODES {
        members.push(start_node(160).await);
    }

    let entry_addr = members[0].1.clone();
    for (node, _, _) in members.iter().skip(1) {
        node.join(entry_addr.clone()).await.expect("join");
    }

    let nodes: Vec<_> = members.iter().map(|(n, _, _)| n.clone()).collect();
    stabilize_ring(&nodes, 30).await;

    for node in &nodes {
        let successor = node.successor_list().await;
        assert!(!successor.is_empty());
        assert_ne!(successor[0].id, node.id, "ring of {} should have no self-successor", NUM_NODES);
    }

    for i in 0..NUM_NODES {
        let key = format!("key-{i}");
        let value = format!("value-{i}").into_bytes();
        let addr = members[i % members.len()].1.clone();
        let mut client = ChordClient::connect(format!("http://{}", addr)).await.unwrap();
        client
            .put(Request::new(PutRequest { key: key.clone(), value: value.clone() }))
            .await
            .unwrap_or_else(|e| panic!("put {key} failed: {e}"));

        let reader_addr = members[(i + NUM_NODES / 2) % members.len()].1.clone();
        let mut reader = ChordClient::connect(format!("http://{}", reader_addr)).await.unwrap();
        let resp = reader
            .get(Request::new(GetRequest { key: key.clone() }))
            .await
            .unwrap_or_else(|e| panic!("get {key} failed: {e}"));
        assert_eq!(resp.into_inner().value, value);
    }
}
