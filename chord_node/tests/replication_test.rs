use chord_proto::chord::chord_client::ChordClient;
use chord_proto::chord::{GetRequest, PutRequest};
use std::time::Duration;
use tonic::Request;

mod common;
use common::{stabilize_ring, start_node};

#[tokio::test]
async fn put_replicates_to_successors_and_survives_leader_failure() {
    let (node0, addr0, handle0) = start_node(8).await;
    let (node1, addr1, h1) = start_node(8).await;
    let (node2, addr2, h2) = start_node(8).await;

    node1.join(addr0.clone()).await.unwrap();
    node2.join(addr0.clone()).await.unwrap();

    let mut members = vec![(node0, addr0, handle0), (node1, addr1, h1), (node2, addr2, h2)];
    let nodes: Vec<_> = members.iter().map(|(n, _, _)| n.clone()).collect();
    stabilize_ring(&nodes, 12).await;

    let key = "replication_key";
    let value = b"replication_value".to_vec();

    let leader_addr = members[0].1.clone();
    let mut client = ChordClient::connect(format!("http://{}", leader_addr)).await.unwrap();
    client
        .put(Request::new(PutRequest {
            key: key.to_string(),
            value: value.clone(),
        }))
        .await
        .expect("put");

    // Let the leader's send_replicas fan-out land.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let mut owner_index = None;
    for (i, (node, _, _)) in members.iter().enumerate() {
        if node.local_value(key).await.as_deref() == Some(value.as_slice()) {
            owner_index = Some(i);
            break;
        }
    }
    let owner_index = owner_index.expect("some node must own the key");
    let owner_id = members[owner_index].0.id.clone();

    let mut replicated_elsewhere = false;
    for (node, _, _) in &members {
        if node.id != owner_id && node.is_replica_holder(&owner_id, key).await {
            replicated_elsewhere = true;
        }
    }
    assert!(replicated_elsewhere, "key was never replicated off the leader");

    // Kill the owner and confirm a survivor still serves the key.
    let (owner_node, _, owner_handle) = members.remove(owner_index);
    owner_handle.abort();
    let survivors: Vec<_> = members.iter().map(|(n, _, _)| n.clone()).collect();
    stabilize_ring(&survivors, 12).await;

    let survivor_addr = members[0].1.clone();
    let mut client = ChordClient::connect(format!("http://{}", survivor_addr)).await.unwrap();
    let resp = client
        .get(Request::new(GetRequest { key: key.to_string() }))
        .await
        .expect("get after leader failure");
    assert_eq!(resp.into_inner().value, value);
    assert_ne!(owner_node.id, members[0].0.id);
}
