use std::net::SocketAddr;
use std::time::Duration;

use chord_node::{Config, Node};
use chord_proto::chord::chord_server::ChordServer;
use tokio::net::TcpListener;
use tonic::transport::Server;

/// Starts a node bound to an OS-assigned port on `127.0.0.1`, with an
/// 8-bit identifier space unless `key_size` says otherwise. Returns
/// the running `Node` handle, its bound address, and the server
/// task's `JoinHandle` so a test can `.abort()` it to simulate a
/// crash.
pub async fn start_node(key_size: u32) -> (Node, String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local_addr: SocketAddr = listener.local_addr().unwrap();
    let addr_str = local_addr.to_string();

    let config = Config {
        key_size,
        addr: "127.0.0.1".to_string(),
        port: local_addr.port(),
        join: None,
        monitor: None,
        timeout_ms: 5000,
        stabilize_interval_ms: 250,
        fix_finger_interval_ms: 50,
        check_predecessor_interval_ms: 150,
        successor_list_size: 2,
        logging: false,
    };

    let node = Node::create(config);
    let serving = node.clone();
    let handle = tokio::spawn(async move {
        Server::builder()
            .add_service(ChordServer::new(serving))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (node, addr_str, handle)
}

pub async fn stabilize_ring(nodes: &[Node], rounds: usize) {
    for _ in 0..rounds {
        for node in nodes {
            node.stabilize().await;
            node.fix_finger().await;
            node.check_predecessor().await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
}
