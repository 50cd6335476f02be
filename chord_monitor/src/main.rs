use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chord_proto::chord::{
    chord_client::ChordClient,
    chord_monitor_server::{ChordMonitor, ChordMonitorServer},
    Empty, GetRequest, NodeState, PutRequest,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tonic::{transport::Server, Request, Response, Status};
use tower_http::cors::CorsLayer;

fn hex_id(id: &[u8]) -> String {
    id.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Every node reports in periodically; keyed by the hex rendering of
/// its id since protobuf ids are arbitrary-width byte strings. This
/// is purely a best-effort dashboard, not part of the ring protocol.
#[derive(Debug, Default)]
struct MonitorState {
    nodes: HashMap<String, NodeState>,
}

type SharedState = Arc<Mutex<MonitorState>>;

struct MonitorService {
    state: SharedState,
}

#[tonic::async_trait]
impl ChordMonitor for MonitorService {
    async fn report_state(&self, request: Request<NodeState>) -> Result<Response<Empty>, Status> {
        let node_state = request.into_inner();
        tracing::debug!(id = %hex_id(&node_state.id), "state report received");
        let mut state = self.state.lock().unwrap();
        state.nodes.insert(hex_id(&node_state.id), node_state);
        Ok(Response::new(Empty {}))
    }
}

#[derive(Deserialize)]
struct ApiPutRequest {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct ApiGetRequest {
    key: String,
}

#[derive(Serialize)]
struct ApiGetResponse {
    found: bool,
    value: String,
}

#[derive(Serialize)]
struct ApiStatusResponse {
    success: bool,
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let state: SharedState = Arc::new(Mutex::new(MonitorState::default()));

    let grpc_state = state.clone();
    tokio::spawn(async move {
        let addr = "0.0.0.0:50051".parse().unwrap();
        tracing::info!(%addr, "monitor gRPC listening");
        Server::builder()
            .add_service(ChordMonitorServer::new(MonitorService { state: grpc_state }))
            .serve(addr)
            .await
            .unwrap();
    });

    let app = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/put", post(handle_put))
        .route("/api/get", post(handle_get))
        .nest_service("/", tower_http::services::ServeDir::new("frontend/dist"))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!(%addr, "monitor web listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize, Clone)]
struct NodeInfoDto {
    id: String,
    address: String,
}

impl From<chord_proto::chord::NodeInfo> for NodeInfoDto {
    fn from(info: chord_proto::chord::NodeInfo) -> Self {
        Self {
            id: hex_id(&info.id),
            address: info.address,
        }
    }
}

#[derive(Serialize, Clone)]
struct NodeStateDto {
    id: String,
    address: String,
    predecessor: Option<NodeInfoDto>,
    successors: Vec<NodeInfoDto>,
    finger_table: Vec<NodeInfoDto>,
    stored_keys: Vec<String>,
}

impl From<NodeState> for NodeStateDto {
    fn from(state: NodeState) -> Self {
        Self {
            id: hex_id(&state.id),
            address: state.address,
            predecessor: state.predecessor.map(Into::into),
            successors: state.successors.into_iter().map(Into::into).collect(),
            finger_table: state.finger_table.into_iter().map(Into::into).collect(),
            stored_keys: state.stored_keys,
        }
    }
}

async fn get_state(State(state): State<SharedState>) -> Json<Vec<NodeStateDto>> {
    let state = state.lock().unwrap();
    let nodes: Vec<NodeStateDto> = state.nodes.values().cloned().map(Into::into).collect();
    Json(nodes)
}

fn get_any_node_address(state: &SharedState) -> Option<String> {
    let state = state.lock().unwrap();
    state.nodes.values().next().map(|n| n.address.clone())
}

async fn connect_to_node(addr: String) -> Result<ChordClient<tonic::transport::Channel>, String> {
    let endpoint = format!("http://{}", addr);
    ChordClient::connect(endpoint)
        .await
        .map_err(|e| format!("connection error: {}", e))
}

async fn handle_put(
    State(state): State<SharedState>,
    Json(payload): Json<ApiPutRequest>,
) -> Json<ApiStatusResponse> {
    let node_addr = match get_any_node_address(&state) {
        Some(addr) => addr,
        None => {
            return Json(ApiStatusResponse {
                success: false,
                message: "no nodes available".into(),
            })
        }
    };

    match connect_to_node(node_addr).await {
        Ok(mut client) => {
            let request = Request::new(PutRequest {
                key: payload.key,
                value: payload.value.into_bytes(),
            });
            match client.put(request).await {
                Ok(response) => {
                    let resp = response.into_inner();
                    Json(ApiStatusResponse {
                        success: resp.success,
                        message: if resp.success { "put successful".into() } else { "put failed".into() },
                    })
                }
                Err(e) => Json(ApiStatusResponse {
                    success: false,
                    message: format!("rpc error: {}", e),
                }),
            }
        }
        Err(e) => Json(ApiStatusResponse { success: false, message: e }),
    }
}

async fn handle_get(
    State(state): State<SharedState>,
    Json(payload): Json<ApiGetRequest>,
) -> Json<ApiGetResponse> {
    let node_addr = match get_any_node_address(&state) {
        Some(addr) => addr,
        None => {
            return Json(ApiGetResponse {
                found: false,
                value: "no nodes available".into(),
            })
        }
    };

    match connect_to_node(node_addr).await {
        Ok(mut client) => {
            let request = Request::new(GetRequest { key: payload.key });
            match client.get(request).await {
                Ok(response) => Json(ApiGetResponse {
                    found: true,
                    value: String::from_utf8_lossy(&response.into_inner().value).into_owned(),
                }),
                Err(status) if status.code() == tonic::Code::NotFound => {
                    Json(ApiGetResponse { found: false, value: String::new() })
                }
                Err(e) => Json(ApiGetResponse {
                    found: false,
                    value: format!("rpc error: {}", e),
                }),
            }
        }
        Err(e) => Json(ApiGetResponse { found: false, value: e }),
    }
}
