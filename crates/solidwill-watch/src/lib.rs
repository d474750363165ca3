//! State reconciliation for the SolidWill dashboard.
//!
//! This crate keeps a rendered list of dead-man's-switch wills consistent
//! with the on-chain source of truth:
//! - Following chain heads via WebSocket subscription
//! - Re-fetching the will counter on every tick
//! - One independent watcher per rendered will id
//! - Deriving a read-only dashboard view plus write actions
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use solidwill_watch::{BlockFollower, RpcProvider, WillBoard, WillBoardConfig};
//!
//! let provider = Arc::new(RpcProvider::new("wss://rpc.sepolia.org", Some(account)));
//! let board = Arc::new(WillBoard::new(
//!     provider,
//!     WillBoardConfig::builder().contract(contract).build(),
//! ));
//!
//! let heads = BlockFollower::new("wss://rpc.sepolia.org").subscribe().await?;
//! tokio::spawn({
//!     let board = board.clone();
//!     async move { board.run(heads).await }
//! });
//!
//! if let Some(view) = board.view().await {
//!     println!("{} wills, head {}", view.rows.len(), view.chain_head);
//! }
//! ```

mod actions;
mod board;
mod error;
mod follower;
mod provider;


pub use actions::CreateWillForm;
pub use board::{BoardEvent, DashboardView, WillBoard, WillBoardConfig, WillRow};
pub use error::WatchError;
pub use follower::BlockFollower;
pub use provider::{ChainProvider, RpcProvider};
