use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, RwLock};
use tonic::{Request, Response, Status};

use chord_proto::chord::chord_client::ChordClient;
use chord_proto::chord::chord_monitor_client::ChordMonitorClient;
use chord_proto::chord::chord_server::Chord;
use chord_proto::chord::{
    CoordinatorRequest, Empty, FindSuccessorRequest, GetKeysRequest, GetRequest, GetResponse,
    KeyValue, KeyValueList, LocateRequest, NodeInfo, PutRequest, PutResponse, ReplicaMessage,
    SuccessorList,
};
use chord_proto::hash_key;

use crate::config::Config;
use crate::error::{ChordError, ChordResult};
use crate::finger::{finger_start, new_finger_table, FingerEntry};
use crate::id::{between, between_right_incl, hex_id, ring_distance};
use crate::metrics::{MetricsSink, TracingMetrics};
use crate::pool::ConnectionPool;
use crate::replica::ReplicaGroup;
use crate::successor_list::{reconcile, same_members};

fn empty_node() -> NodeInfo {
    NodeInfo {
        id: Vec::new(),
        address: String::new(),
    }
}

fn is_empty_node(n: &NodeInfo) -> bool {
    n.id.is_empty() && n.address.is_empty()
}

/// Everything that mutates: predecessor, successor list, finger table,
/// and the replica groups this node currently holds a copy of. Guarded
/// by a single `RwLock` rather than the six independent mutexes the
/// original source uses per field — no RPC is ever issued while the
/// lock is held.
struct NodeState {
    predecessor: Option<NodeInfo>,
    successor_list: Vec<NodeInfo>,
    finger_table: Vec<FingerEntry>,
    replica_groups: HashMap<Vec<u8>, ReplicaGroup>,
    /// True until this node has completed its first successful
    /// successor-list reconciliation; gates the initial Coordinator
    /// broadcast on join (old_leader_id left empty on the first send).
    rg_flag: bool,
    /// Rolling cursor into the finger table for fix_finger.
    finger_cursor: usize,
}

/// Snapshot handed to the periodic debug logger.
pub struct DebugSnapshot {
    pub predecessor: Option<NodeInfo>,
    pub successor_list: Vec<NodeInfo>,
    pub finger_table: Vec<NodeInfo>,
    /// (leader_id, number of keys held) per replica group this node is a member of.
    pub replica_group_members: Vec<(Vec<u8>, usize)>,
}

/// A Chord ring member: ring-membership state machine, O(log N) lookup
/// engine, and leader-per-key-range replica group, all riding one gRPC
/// endpoint. Cheap to clone — every field is an `Arc`.
#[derive(Clone)]
pub struct Node {
    pub id: Vec<u8>,
    pub addr: String,
    config: Config,
    state: Arc<RwLock<NodeState>>,
    pool: Arc<ConnectionPool>,
    metrics: Arc<dyn MetricsSink>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl Node {
    /// Forms a new one-node ring: no predecessor, successor is self.
    pub fn create(config: Config) -> Self {
        let addr = config.bind_addr_str();
        let id = hash_key(&addr, config.key_size);
        let self_info = NodeInfo {
            id: id.clone(),
            address: addr.clone(),
        };
        let finger_table = new_finger_table(&self_info, config.key_size);
        let mut replica_groups = HashMap::new();
        replica_groups.insert(id.clone(), ReplicaGroup::new(id.clone()));
        let (shutdown_tx, _) = watch::channel(false);

        Node {
            id,
            addr,
            config: config.clone(),
            state: Arc::new(RwLock::new(NodeState {
                predecessor: None,
                successor_list: vec![self_info; config.successor_list_size],
                finger_table,
                replica_groups,
                rg_flag: true,
                finger_cursor: 0,
            })),
            pool: Arc::new(ConnectionPool::new(config.timeout_ms)),
            metrics: Arc::new(TracingMetrics),
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        self.pool.clear().await;
    }

    fn self_info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id.clone(),
            address: self.addr.clone(),
        }
    }

    // ---- introspection (used by the CLI wrappers and by tests) --------

    pub async fn predecessor(&self) -> Option<NodeInfo> {
        self.state.read().await.predecessor.clone()
    }

    pub async fn successor_list(&self) -> Vec<NodeInfo> {
        self.state.read().await.successor_list.clone()
    }

    pub async fn local_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .await
            .replica_groups
            .get(&self.id)
            .and_then(|g| g.data.get(key).cloned())
    }

    pub async fn is_replica_holder(&self, leader_id: &[u8], key: &str) -> bool {
        self.state
            .read()
            .await
            .replica_groups
            .get(leader_id)
            .map(|g| g.data.contains_key(key))
            .unwrap_or(false)
    }

    /// A full point-in-time dump for the periodic debug logger: mirrors
    /// PrintNode/PrintSuccessorList/PrintReplicaGroupMembership.
    pub async fn debug_snapshot(&self) -> DebugSnapshot {
        let state = self.state.read().await;
        DebugSnapshot {
            predecessor: state.predecessor.clone(),
            successor_list: state.successor_list.clone(),
            finger_table: state.finger_table.iter().map(|f| f.node.clone()).collect(),
            replica_group_members: state
                .replica_groups
                .iter()
                .map(|(leader_id, group)| (leader_id.clone(), group.data.len()))
                .collect(),
        }
    }

    // ---- RPC client helpers --------------------------------------------

    async fn client(&self, addr: &str) -> ChordResult<ChordClient<tonic::transport::Channel>> {
        let channel = self.pool.get(addr).await?;
        Ok(ChordClient::new(channel))
    }

    async fn fail(&self, addr: &str, status: Status) -> ChordError {
        if crate::error::is_transport_failure(&status) {
            self.pool.evict(addr).await;
            ChordError::PeerUnreachable(status.to_string())
        } else {
            ChordError::from_status(&status)
        }
    }

    async fn find_successor_rpc(&self, addr: &str, id: &[u8]) -> ChordResult<NodeInfo> {
        let mut c = self.client(addr).await?;
        match c
            .find_successor(Request::new(FindSuccessorRequest { id: id.to_vec() }))
            .await
        {
            Ok(r) => Ok(r.into_inner()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn get_predecessor_rpc(&self, addr: &str) -> ChordResult<NodeInfo> {
        let mut c = self.client(addr).await?;
        match c.get_predecessor(Request::new(Empty {})).await {
            Ok(r) => Ok(r.into_inner()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn notify_rpc(&self, addr: &str, node: NodeInfo) -> ChordResult<()> {
        let mut c = self.client(addr).await?;
        match c.notify(Request::new(node)).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn check_predecessor_rpc(&self, addr: &str) -> ChordResult<()> {
        let mut c = self.client(addr).await?;
        match c.check_predecessor(Request::new(Empty {})).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn get_successor_list_rpc(&self, addr: &str) -> ChordResult<Vec<NodeInfo>> {
        let mut c = self.client(addr).await?;
        match c.get_successor_list(Request::new(Empty {})).await {
            Ok(r) => Ok(r.into_inner().successors),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn coordinator_rpc(&self, addr: &str, new_leader_id: &[u8], old_leader_id: &[u8]) -> ChordResult<()> {
        let mut c = self.client(addr).await?;
        let req = CoordinatorRequest {
            new_leader_id: new_leader_id.to_vec(),
            old_leader_id: old_leader_id.to_vec(),
        };
        match c.coordinator(Request::new(req)).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn get_keys_rpc(&self, addr: &str, id: &[u8]) -> ChordResult<Vec<KeyValue>> {
        let mut c = self.client(addr).await?;
        match c.get_keys(Request::new(GetKeysRequest { id: id.to_vec() })).await {
            Ok(r) => Ok(r.into_inner().items),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn send_replicas_rpc(&self, addr: &str, leader_id: &[u8], items: Vec<KeyValue>) -> ChordResult<()> {
        let mut c = self.client(addr).await?;
        let req = ReplicaMessage {
            leader_id: leader_id.to_vec(),
            items,
        };
        match c.send_replicas(Request::new(req)).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    async fn remove_replicas_rpc(&self, addr: &str, leader_id: &[u8], items: Vec<KeyValue>) -> ChordResult<()> {
        let mut c = self.client(addr).await?;
        let req = ReplicaMessage {
            leader_id: leader_id.to_vec(),
            items,
        };
        match c.remove_replicas(Request::new(req)).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.fail(addr, status).await),
        }
    }

    /// Best-effort push of a periodic state snapshot to an external
    /// monitor. Failures are logged and otherwise ignored.
    pub async fn report_to_monitor(&self, monitor_addr: &str) {
        let channel = match self.pool.get(monitor_addr).await {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, monitor_addr, "monitor unreachable");
                return;
            }
        };
        let mut client = ChordMonitorClient::new(channel);
        let state = self.state.read().await;
        let stored_keys = state
            .replica_groups
            .get(&self.id)
            .map(|g| g.data.keys().cloned().collect())
            .unwrap_or_default();
        let report = chord_proto::chord::NodeState {
            id: self.id.clone(),
            address: self.addr.clone(),
            predecessor: state.predecessor.clone(),
            successors: state.successor_list.clone(),
            finger_table: state.finger_table.iter().map(|f| f.node.clone()).collect(),
            stored_keys,
        };
        drop(state);
        if let Err(status) = client.report_state(Request::new(report)).await {
            tracing::debug!(error = %status, monitor_addr, "monitor report failed");
        }
    }

    // ---- lookup engine ---------------------------------------------------

    fn closest_preceding_node(
        &self,
        self_info: &NodeInfo,
        finger_table: &[FingerEntry],
        successor_list: &[NodeInfo],
        id: &[u8],
        exclude: &[Vec<u8>],
    ) -> NodeInfo {
        let finger_hit = finger_table
            .iter()
            .rev()
            .map(|e| &e.node)
            .find(|n| !exclude.iter().any(|e| e == &n.id) && between(&n.id, &self_info.id, id));
        let successor_hit = successor_list
            .iter()
            .rev()
            .find(|n| !exclude.iter().any(|e| e == &n.id) && between(&n.id, &self_info.id, id));
        match (finger_hit, successor_hit) {
            (None, None) => self_info.clone(),
            (Some(f), None) => f.clone(),
            (None, Some(s)) => s.clone(),
            (Some(f), Some(s)) => {
                if between(&f.id, &s.id, id) {
                    f.clone()
                } else {
                    s.clone()
                }
            }
        }
    }

    /// Finds the node responsible for `id`: a finger lookup bounded to
    /// one retry on RPC failure.
    pub async fn find_successor_internal(&self, id: &[u8]) -> ChordResult<NodeInfo> {
        let self_info = self.self_info();
        let successor = {
            let state = self.state.read().await;
            state.successor_list.first().cloned().unwrap_or_else(|| self_info.clone())
        };
        if between_right_incl(id, &self_info.id, &successor.id) {
            return Ok(successor);
        }

        let mut exclude: Vec<Vec<u8>> = Vec::new();
        for attempt in 0..2 {
            let candidate = {
                let state = self.state.read().await;
                self.closest_preceding_node(&self_info, &state.finger_table, &state.successor_list, id, &exclude)
            };
            if candidate.id == self_info.id {
                return Ok(successor);
            }
            match self.find_successor_rpc(&candidate.address, id).await {
                Ok(found) => return Ok(found),
                Err(_) if attempt == 0 => {
                    exclude.push(candidate.id);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(ChordError::PeerUnreachable(
            "find_successor exhausted its retry budget".to_string(),
        ))
    }

    // ---- lifecycle --------------------------------------------------------

    /// Joins the ring through `known_addr`: locates our successor,
    /// pulls the keys we now own, and lets the next stabilize pass
    /// discover our predecessor. There is no explicit leave; a node
    /// that stops responding is recovered by check_predecessor on its
    /// predecessor and by stabilize on everyone else.
    pub async fn join(&self, known_addr: String) -> ChordResult<()> {
        let successor = self.find_successor_rpc(&known_addr, &self.id).await?;
        let pulled = self.get_keys_rpc(&successor.address, &self.id).await?;

        let mut state = self.state.write().await;
        {
            let group = state
                .replica_groups
                .entry(self.id.clone())
                .or_insert_with(|| ReplicaGroup::new(self.id.clone()));
            for kv in pulled {
                group.data.insert(kv.key, kv.value);
            }
        }
        state.successor_list = vec![successor; self.config.successor_list_size];
        state.predecessor = None;
        state.rg_flag = true;
        Ok(())
    }

    // ---- periodic tasks -----------------------------------------------

    /// Refreshes the successor list and, on a change of membership,
    /// broadcasts the new leadership via Coordinator and resends this
    /// node's own replica data.
    async fn update_successor_list(&self) {
        let r = self.config.successor_list_size;
        let Some(mut candidate) = ({ self.state.read().await.successor_list.first().cloned() }) else {
            return;
        };
        let mut index = 0usize;
        loop {
            match self.get_successor_list_rpc(&candidate.address).await {
                Ok(their_list) => {
                    let old_list = { self.state.read().await.successor_list.clone() };
                    let new_list = reconcile(&candidate, &their_list, r);
                    let (changed, old_leader_id) = {
                        let mut state = self.state.write().await;
                        state.successor_list = new_list.clone();
                        let changed = !same_members(&old_list, &new_list);
                        let old_leader_id = if changed {
                            let old_leader_id = if state.rg_flag { Vec::new() } else { self.id.clone() };
                            state.rg_flag = false;
                            old_leader_id
                        } else {
                            Vec::new()
                        };
                        (changed, old_leader_id)
                    };
                    if changed {
                        self.announce_leadership(&new_list, &old_leader_id).await;
                    }
                    return;
                }
                Err(_) => {
                    self.pool.evict(&candidate.address).await;
                    if index == r - 1 {
                        return;
                    }
                    let next = { self.state.read().await.successor_list.get(index + 1).cloned() };
                    match next {
                        Some(n) => {
                            candidate = n;
                            index += 1;
                        }
                        None => return,
                    }
                }
            }
        }
    }

    /// Tells every other member of `successor_list` that this node now
    /// leads, then resends the data this node is leader for so the new
    /// group has a copy.
    async fn announce_leadership(&self, successor_list: &[NodeInfo], old_leader_id: &[u8]) {
        for node in successor_list {
            if node.id == self.id {
                continue;
            }
            let _ = self.coordinator_rpc(&node.address, &self.id, old_leader_id).await;
        }
        self.resend_self_led_replicas(successor_list).await;
    }

    async fn resend_self_led_replicas(&self, successor_list: &[NodeInfo]) {
        let data = {
            let state = self.state.read().await;
            state.replica_groups.get(&self.id).map(|g| g.data.clone()).unwrap_or_default()
        };
        if data.is_empty() {
            return;
        }
        let items: Vec<KeyValue> = data.into_iter().map(|(key, value)| KeyValue { key, value }).collect();
        for node in successor_list {
            if node.id == self.id {
                continue;
            }
            let _ = self.send_replicas_rpc(&node.address, &self.id, items.clone()).await;
        }
    }

    /// The six-step stabilization pass: refresh the successor list,
    /// ask the successor for its predecessor, adopt it if it falls
    /// strictly between us and our current successor, then notify
    /// whichever node ends up as our successor.
    pub async fn stabilize(&self) {
        let has_successor = { self.state.read().await.successor_list.first().is_some() };
        if !has_successor {
            return;
        }
        self.update_successor_list().await;

        let successor = { self.state.read().await.successor_list.first().cloned() };
        let Some(successor) = successor else { return };

        match self.get_predecessor_rpc(&successor.address).await {
            Ok(candidate) => {
                if !is_empty_node(&candidate) && between(&candidate.id, &self.id, &successor.id) {
                    let mut state = self.state.write().await;
                    if !state.successor_list.is_empty() {
                        state.successor_list[0] = candidate;
                    }
                }
            }
            Err(_) => {
                self.pool.evict(&successor.address).await;
                return;
            }
        }

        let current_successor = { self.state.read().await.successor_list.first().cloned() };
        if let Some(current_successor) = current_successor {
            let _ = self.notify_rpc(&current_successor.address, self.self_info()).await;
        }
    }

    /// Advances the rolling finger-table cursor by one entry per tick.
    pub async fn fix_finger(&self) {
        let (cursor, len) = {
            let state = self.state.read().await;
            (state.finger_cursor, state.finger_table.len())
        };
        if len == 0 {
            return;
        }
        let target = finger_start(&self.id, cursor, self.config.key_size);
        match self.find_successor_internal(&target).await {
            Ok(node) => {
                let mut state = self.state.write().await;
                if cursor < state.finger_table.len() {
                    state.finger_table[cursor].node = node;
                }
                state.finger_cursor = (cursor + 1) % len;
            }
            Err(e) => {
                tracing::debug!(error = %e, cursor, "fix_finger lookup failed, leaving entry stale");
                let mut state = self.state.write().await;
                state.finger_cursor = (cursor + 1) % len;
            }
        }
    }

    /// Pings the predecessor; on failure, absorbs its replica group,
    /// clears the predecessor pointer, and announces the new
    /// leadership to the successor list.
    pub async fn check_predecessor(&self) {
        let predecessor = { self.state.read().await.predecessor.clone() };
        let Some(pred) = predecessor else { return };

        if self.check_predecessor_rpc(&pred.address).await.is_ok() {
            return;
        }
        tracing::warn!(peer = %pred.address, "predecessor unreachable, absorbing its replica group");

        let successor_list = {
            let mut state = self.state.write().await;
            if let Some(failed_group) = state.replica_groups.remove(&pred.id) {
                let local = state
                    .replica_groups
                    .entry(self.id.clone())
                    .or_insert_with(|| ReplicaGroup::new(self.id.clone()));
                local.data.extend(failed_group.data);
            }
            state.predecessor = None;
            state.successor_list.clone()
        };
        self.announce_leadership(&successor_list, &pred.id).await;
        self.pool.evict(&pred.address).await;
    }
}

#[tonic::async_trait]
impl Chord for Node {
    async fn find_successor(&self, request: Request<FindSuccessorRequest>) -> Result<Response<NodeInfo>, Status> {
        let req = request.into_inner();
        let start = Instant::now();
        let result = self.find_successor_internal(&req.id).await?;
        self.metrics.record_lookup(start.elapsed().as_secs_f64() * 1000.0);
        self.metrics.increment_messages();
        Ok(Response::new(result))
    }

    async fn get_predecessor(&self, _request: Request<Empty>) -> Result<Response<NodeInfo>, Status> {
        let state = self.state.read().await;
        Ok(Response::new(state.predecessor.clone().unwrap_or_else(empty_node)))
    }

    async fn notify(&self, request: Request<NodeInfo>) -> Result<Response<Empty>, Status> {
        let candidate = request.into_inner();
        let mut state = self.state.write().await;
        let should_adopt = match &state.predecessor {
            None => true,
            Some(p) => between(&candidate.id, &p.id, &self.id),
        };
        if should_adopt {
            state.predecessor = Some(candidate);
        }
        Ok(Response::new(Empty {}))
    }

    async fn check_predecessor(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        Ok(Response::new(Empty {}))
    }

    async fn get_successor_list(&self, _request: Request<Empty>) -> Result<Response<SuccessorList>, Status> {
        let state = self.state.read().await;
        Ok(Response::new(SuccessorList {
            successors: state.successor_list.clone(),
        }))
    }

    async fn coordinator(&self, request: Request<CoordinatorRequest>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let new_id = req.new_leader_id;
        let old_id = req.old_leader_id;

        if new_id == self.id {
            return Ok(Response::new(Empty {}));
        }

        if old_id.is_empty() {
            let outcome = {
                let mut state = self.state.write().await;
                if state.replica_groups.contains_key(&new_id) {
                    None
                } else {
                    let r = self.config.successor_list_size;
                    let self_id = self.id.clone();
                    let peer_ids: Vec<Vec<u8>> = state
                        .replica_groups
                        .keys()
                        .filter(|k| k.as_slice() != self_id.as_slice())
                        .cloned()
                        .collect();
                    if peer_ids.len() >= r {
                        if let Some(farthest) = peer_ids.iter().max_by_key(|k| ring_distance(&self_id, k)) {
                            state.replica_groups.remove(farthest);
                        }
                    }
                    state.replica_groups.insert(new_id.clone(), ReplicaGroup::new(new_id.clone()));

                    let should_transfer = match &state.predecessor {
                        None => true,
                        Some(p) => between(&new_id, &p.id, &self_id) || new_id == p.id,
                    };
                    let transferred = if should_transfer {
                        let m_bits = self.config.key_size;
                        match state.replica_groups.get_mut(&self_id) {
                            Some(group) => {
                                let to_remove: Vec<String> = group
                                    .data
                                    .keys()
                                    .filter(|k| !between_right_incl(&hash_key(k, m_bits), &new_id, &self_id))
                                    .cloned()
                                    .collect();
                                to_remove
                                    .into_iter()
                                    .filter_map(|k| group.data.remove(&k).map(|v| (k, v)))
                                    .collect()
                            }
                            None => Vec::new(),
                        }
                    } else {
                        Vec::new()
                    };
                    let successor_list = state.successor_list.clone();
                    Some((transferred, successor_list))
                }
            };

            match outcome {
                None => return Err(ChordError::Duplicate(hex_id(&new_id)).into()),
                Some((transferred, successor_list)) => {
                    if !transferred.is_empty() {
                        let items: Vec<KeyValue> = transferred
                            .into_iter()
                            .map(|(key, value)| KeyValue { key, value })
                            .collect();
                        for node in &successor_list {
                            if node.id == self.id {
                                continue;
                            }
                            let _ = self.remove_replicas_rpc(&node.address, &self.id, items.clone()).await;
                        }
                    }
                }
            }
        } else {
            let mut state = self.state.write().await;
            let new_exists = state.replica_groups.contains_key(&new_id);
            let old_exists = state.replica_groups.contains_key(&old_id);
            if new_exists {
                if old_exists && new_id != old_id {
                    state.replica_groups.remove(&old_id);
                }
            } else {
                if old_exists {
                    state.replica_groups.remove(&old_id);
                }
                state.replica_groups.insert(new_id.clone(), ReplicaGroup::new(new_id));
            }
        }

        Ok(Response::new(Empty {}))
    }

    async fn get_keys(&self, request: Request<GetKeysRequest>) -> Result<Response<KeyValueList>, Status> {
        let req = request.into_inner();
        let m_bits = self.config.key_size;
        let state = self.state.read().await;
        let items = state
            .replica_groups
            .get(&self.id)
            .map(|group| {
                group
                    .data
                    .iter()
                    .filter(|(k, _)| !between_right_incl(&hash_key(k, m_bits), &req.id, &self.id))
                    .map(|(k, v)| KeyValue { key: k.clone(), value: v.clone() })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Response::new(KeyValueList { items }))
    }

    async fn send_replicas(&self, request: Request<ReplicaMessage>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let mut state = self.state.write().await;
        let group = state
            .replica_groups
            .get_mut(&req.leader_id)
            .ok_or_else(|| ChordError::Membership(hex_id(&req.leader_id)))?;
        for kv in req.items {
            group.data.insert(kv.key, kv.value);
        }
        Ok(Response::new(Empty {}))
    }

    async fn remove_replicas(&self, request: Request<ReplicaMessage>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let mut state = self.state.write().await;
        let group = state
            .replica_groups
            .get_mut(&req.leader_id)
            .ok_or_else(|| ChordError::Membership(hex_id(&req.leader_id)))?;
        for kv in req.items {
            group.data.remove(&kv.key);
        }
        Ok(Response::new(Empty {}))
    }

    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let req = request.into_inner();
        self.metrics.increment_messages();
        let key_id = hash_key(&req.key, self.config.key_size);
        let owner = self.find_successor_internal(&key_id).await?;

        if owner.id == self.id {
            let state = self.state.read().await;
            let value = state
                .replica_groups
                .get(&self.id)
                .and_then(|g| g.data.get(&req.key).cloned());
            match value {
                Some(value) => Ok(Response::new(GetResponse { value })),
                None => Err(ChordError::NotFound.into()),
            }
        } else {
            let mut client = self.client(&owner.address).await?;
            let resp = client.get(Request::new(req)).await?;
            Ok(resp)
        }
    }

    async fn put(&self, request: Request<PutRequest>) -> Result<Response<PutResponse>, Status> {
        let req = request.into_inner();
        self.metrics.increment_messages();
        let key_id = hash_key(&req.key, self.config.key_size);
        let owner = self.find_successor_internal(&key_id).await?;

        if owner.id == self.id {
            let (item, successor_list) = {
                let mut state = self.state.write().await;
                let group = state
                    .replica_groups
                    .entry(self.id.clone())
                    .or_insert_with(|| ReplicaGroup::new(self.id.clone()));
                group.data.insert(req.key.clone(), req.value.clone());
                (
                    KeyValue { key: req.key, value: req.value },
                    state.successor_list.clone(),
                )
            };
            for node in &successor_list {
                if node.id == self.id {
                    continue;
                }
                let _ = self.send_replicas_rpc(&node.address, &self.id, vec![item.clone()]).await;
            }
            Ok(Response::new(PutResponse { success: true }))
        } else {
            let mut client = self.client(&owner.address).await?;
            let resp = client.put(Request::new(req)).await?;
            Ok(resp)
        }
    }

    async fn locate(&self, request: Request<LocateRequest>) -> Result<Response<NodeInfo>, Status> {
        let req = request.into_inner();
        let start = Instant::now();
        let key_id = hash_key(&req.key, self.config.key_size);
        let result = self.find_successor_internal(&key_id).await?;
        self.metrics.record_lookup(start.elapsed().as_secs_f64() * 1000.0);
        self.metrics.increment_messages();
        Ok(Response::new(result))
    }
}
