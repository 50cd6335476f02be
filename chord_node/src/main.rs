use std::net::SocketAddr;

use clap::Parser;
use tokio::time::{interval, Duration};
use tonic::transport::Server;

use chord_node::id::hex_id;
use chord_node::{Config, Node};
use chord_proto::chord::chord_server::ChordServer;

/// Spawns one of the periodic tasks on its own ticker, exiting as
/// soon as the node's shutdown signal fires rather than chaining
/// sleeps into one sequential loop the way a single-threaded
/// scheduler would.
fn spawn_periodic<F, Fut>(node: Node, interval_ms: u64, mut tick: F)
where
    F: FnMut(Node) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let mut shutdown = node.shutdown_rx();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(interval_ms));
        loop {
            tokio::select! {
                _ = ticker.tick() => tick(node.clone()).await,
                _ = shutdown.changed() => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    config.validate()?;

    let addr_str = config.bind_addr_str();
    let socket_addr: SocketAddr = addr_str.parse()?;

    let node = Node::create(config.clone());
    tracing::info!(id = %hex_id(&node.id), addr = %node.addr, "node starting");

    if let Some(join_addr) = config.join.clone() {
        tracing::info!(via = %join_addr, "joining ring");
        node.join(join_addr).await?;
        tracing::info!("joined ring");
    }

    spawn_periodic(node.clone(), config.stabilize_interval_ms, |n| async move {
        n.stabilize().await;
    });
    spawn_periodic(node.clone(), config.fix_finger_interval_ms, |n| async move {
        n.fix_finger().await;
    });
    spawn_periodic(node.clone(), config.check_predecessor_interval_ms, |n| async move {
        n.check_predecessor().await;
    });

    if let Some(monitor_addr) = config.monitor.clone() {
        spawn_periodic(node.clone(), config.stabilize_interval_ms, move |n| {
            let monitor_addr = monitor_addr.clone();
            async move { n.report_to_monitor(&monitor_addr).await }
        });
    }

    if config.logging {
        spawn_periodic(node.clone(), 5 * config.stabilize_interval_ms, |n| async move {
            let snapshot = n.debug_snapshot().await;
            tracing::debug!(id = %hex_id(&n.id), "- node -");
            match &snapshot.predecessor {
                Some(p) => tracing::debug!(id = %hex_id(&p.id), addr = %p.address, "predecessor"),
                None => tracing::debug!("predecessor - nil"),
            }
            for (i, s) in snapshot.successor_list.iter().enumerate() {
                tracing::debug!(index = i, id = %hex_id(&s.id), addr = %s.address, "successor");
            }
            for (i, f) in snapshot.finger_table.iter().enumerate() {
                tracing::debug!(index = i, id = %hex_id(&f.id), addr = %f.address, "finger");
            }
            tracing::debug!("- replica group membership -");
            for (leader_id, num_keys) in &snapshot.replica_group_members {
                tracing::debug!(leader_id = %hex_id(leader_id), num_keys, "replica group");
            }
        });
    }

    tracing::info!(addr = %socket_addr, "serving");
    let shutdown_handle = node.clone();
    Server::builder()
        .add_service(ChordServer::new(node))
        .serve_with_shutdown(socket_addr, async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown_handle.shutdown().await;
        })
        .await?;

    Ok(())
}
