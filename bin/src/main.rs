use std::sync::Arc;

use alloy_primitives::{Address, B256};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use solidwill_contract::SEPOLIA_CHAIN_ID;
use solidwill_watch::{
    BlockFollower, ChainProvider, CreateWillForm, DashboardView, RpcProvider, WatchError,
    WillBoard, WillBoardConfig,
};

#[derive(Parser)]
#[command(name = "solidwill-dashboard")]
#[command(about = "Dashboard server for the SolidWill dead-man's-switch contract")]
struct Args {
    /// Ethereum JSON-RPC URL (ws:// or http://)
    #[arg(long, env = "ETH_RPC_URL")]
    rpc_url: String,

    /// Deployed SolidWill contract address
    #[arg(long, env = "SOLIDWILL_ADDRESS")]
    contract: Address,

    /// Account used for writes; reads work without one
    #[arg(long, env = "ACCOUNT_ADDRESS")]
    account: Option<Address>,

    /// HTTP server port
    #[arg(long, default_value = "8080")]
    port: u16,
}

#[derive(Clone)]
struct AppState {
    board: Arc<WillBoard<RpcProvider>>,
}

#[derive(Deserialize)]
struct CreateWillRequest {
    frequency: String,
}

#[derive(Serialize)]
struct TxResponse {
    tx: B256,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,solidwill_watch=debug")),
        )
        .init();

    let args = Args::parse();

    info!("Starting SolidWill dashboard...");
    info!("RPC: {}", &args.rpc_url);
    info!("Contract: {}", args.contract);
    match &args.account {
        Some(account) => info!("Account: {}", account),
        None => info!("No account connected; write actions disabled"),
    }

    let provider = Arc::new(RpcProvider::new(&args.rpc_url, args.account));

    // Single target network; a mismatched node only gets a warning so the
    // read side still renders.
    match provider.chain_id().await {
        Ok(id) if id != SEPOLIA_CHAIN_ID => {
            warn!("node reports chain id {}, expected Sepolia ({})", id, SEPOLIA_CHAIN_ID);
        }
        Ok(id) => debug!("connected to chain {}", id),
        Err(e) => warn!("could not verify chain id: {}", e),
    }

    let board = Arc::new(WillBoard::new(
        provider,
        WillBoardConfig::builder().contract(args.contract).build(),
    ));

    // Spawn the reconciliation loop over the newHeads subscription.
    let board_clone = board.clone();
    let rpc_url = args.rpc_url.clone();
    tokio::spawn(async move {
        let heads = match BlockFollower::new(rpc_url).subscribe().await {
            Ok(heads) => heads,
            Err(e) => {
                error!("head subscription failed: {}", e);
                return;
            }
        };
        if let Err(e) = board_clone.run(heads).await {
            error!("reconciliation loop ended: {}", e);
        }
    });

    let state = AppState { board };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/ws", get(ws_handler))
        .route("/wills", post(create_will_handler))
        .route("/wills/{id}/confirm", post(confirm_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> &'static str {
    "ok"
}

/// The derived view; `null` until both counter and chain head are available.
async fn dashboard_handler(State(state): State<AppState>) -> Json<Option<DashboardView>> {
    Json(state.board.view().await)
}

async fn create_will_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateWillRequest>,
) -> Result<Json<TxResponse>, (StatusCode, String)> {
    let mut form = CreateWillForm::new(req.frequency);
    match state.board.submit_create_will(&mut form).await {
        Ok(tx) => Ok(Json(TxResponse { tx })),
        Err(e) => Err(error_response(e)),
    }
}

async fn confirm_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TxResponse>, (StatusCode, String)> {
    match state.board.submit_heartbeat(id).await {
        Ok(tx) => Ok(Json(TxResponse { tx })),
        Err(e) => Err(error_response(e)),
    }
}

fn error_response(e: WatchError) -> (StatusCode, String) {
    let status = match &e {
        WatchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WatchError::NoSigner => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forward board events to a WebSocket client as tagged JSON.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    info!("[WS] New client connected");

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to the SolidWill dashboard"
    });
    if sender.send(Message::Text(welcome.to_string().into())).await.is_err() {
        warn!("[WS] Failed to send welcome message");
        return;
    }

    let mut events = state.board.events();

    loop {
        tokio::select! {
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("[WS] Failed to serialize event: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            warn!("[WS] Failed to send to client, disconnecting");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("[WS] Client lagged, missed {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("[WS] Event channel closed");
                        break;
                    }
                }
            }
            Some(msg) = receiver.next() => {
                match msg {
                    Ok(Message::Close(_)) => {
                        info!("[WS] Client requested close");
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("[WS] Client error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
    info!("[WS] Client disconnected");
}
