use chord_proto::chord::chord_client::ChordClient;
use chord_proto::chord::{GetRequest, PutRequest};
use tonic::Request;

mod common;
use common::{stabilize_ring, start_node};

#[tokio::test]
async fn ring_forms_and_routes_put_get() {
    let (node1, addr1, _h1) = start_node(8).await;
    let (node2, addr2, _h2) = start_node(8).await;
    let (node3, addr3, _h3) = start_node(8).await;

    node2.join(addr1.clone()).await.expect("node2 join");
    node3.join(addr1.clone()).await.expect("node3 join");

    let nodes = vec![node1.clone(), node2.clone(), node3.clone()];
    stabilize_ring(&nodes, 10).await;

    // Every node's successor list should now agree on a 3-cycle.
    for node in &nodes {
        let successor = node.successor_list().await;
        assert!(!successor.is_empty());
        assert_ne!(successor[0].id, node.id, "a 3-node ring has no self-successors");
    }

    let key = "test_key";
    let value = b"test_value".to_vec();

    let mut client1 = ChordClient::connect(format!("http://{}", addr1)).await.unwrap();
    client1
        .put(Request::new(PutRequest {
            key: key.to_string(),
            value: value.clone(),
        }))
        .await
        .expect("put");

    let mut client3 = ChordClient::connect(format!("http://{}", addr3)).await.unwrap();
    let resp = client3
        .get(Request::new(GetRequest { key: key.to_string() }))
        .await
        .expect("get");
    assert_eq!(resp.into_inner().value, value);
}

#[tokio::test]
async fn get_of_missing_key_is_not_found() {
    let (_node, addr, _h) = start_node(8).await;
    let mut client = ChordClient::connect(format!("http://{}", addr)).await.unwrap();
    let status = client
        .get(Request::new(GetRequest { key: "nope".to_string() }))
        .await
        .expect_err("missing key should fail");
    assert_eq!(status.code(), tonic::Code::NotFound);
}
