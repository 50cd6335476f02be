use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tonic::transport::Channel;

use crate::error::{ChordError, ChordResult};

/// Connection pool keyed by `"addr:port"`. A single lock guards the
/// map; eviction is safe against concurrent lookups for the same
/// address because both paths take the same lock. Every channel is
/// built with the configured per-RPC timeout so a hung peer fails a
/// call instead of blocking the caller forever.
#[derive(Debug)]
pub struct ConnectionPool {
    channels: Mutex<HashMap<String, Channel>>,
    timeout: Duration,
}

impl ConnectionPool {
    pub fn new(timeout_ms: u64) -> Self {
        ConnectionPool {
            channels: Mutex::new(HashMap::new()),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub async fn get(&self, addr: &str) -> ChordResult<Channel> {
        {
            let guard = self.channels.lock().await;
            if let Some(channel) = guard.get(addr) {
                return Ok(channel.clone());
            }
        }

        let endpoint = format!("http://{}", addr);
        let channel = Channel::from_shared(endpoint)
            .map_err(|e| ChordError::PeerUnreachable(e.to_string()))?
            .timeout(self.timeout)
            .connect()
            .await
            .map_err(|e| ChordError::PeerUnreachable(e.to_string()))?;

        let mut guard = self.channels.lock().await;
        guard.insert(addr.to_string(), channel.clone());
        Ok(channel)
    }

    /// Called when a peer is suspected dead so the next call redials.
    pub async fn evict(&self, addr: &str) {
        self.channels.lock().await.remove(addr);
    }

    pub async fn clear(&self) {
        self.channels.lock().await.clear();
    }
}
