//! The state reconciliation loop.
//!
//! Keeps the rendered list of wills consistent with on-chain state: every
//! new head tick re-fetches the counter, every rendered id has its own
//! watcher task re-fetching its record, and the derived view is computed
//! from the latest snapshots. Last-writer-wins per subscription; no
//! ordering across ids and no ordering between a write and the next read.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::Address;
use bon::Builder;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
};

use solidwill_contract::{counter_call, decode_counter, will_details_call, WillRecord};

use super::{ChainProvider, WatchError};

/// Events emitted by the board as chain state is reconciled.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    /// Chain head observed at startup.
    Head { number: u64 },
    /// Latest will counter (exclusive upper bound of ids).
    Counter { value: u64 },
    /// A will snapshot was replaced.
    Will { id: u64, record: WillRecord },
}

/// Board configuration.
#[derive(Builder)]
pub struct WillBoardConfig {
    /// Address of the deployed SolidWill contract.
    pub contract: Address,

    /// Capacity of the outbound event channel.
    #[builder(default = 256)]
    event_capacity: usize,

    /// Capacity of the per-row tick fan-out channel.
    #[builder(default = 64)]
    tick_capacity: usize,
}

/// One rendered row of the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WillRow {
    pub id: u64,
    /// Absent while the row's first fetch has not landed.
    pub record: Option<WillRecord>,
    /// `lastConfirmationBlock + frequency - chainHead`; negative when the
    /// cadence has already elapsed. Absent while the record is.
    pub blocks_remaining: Option<i64>,
}

/// Derived read-only view of the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub chain_head: u64,
    pub account: Option<Address>,
    pub rows: Vec<WillRow>,
}

#[derive(Default)]
struct BoardState {
    chain_head: Option<u64>,
    counter: Option<u64>,
    wills: HashMap<u64, WillRecord>,
}

/// Guard owning one row's watcher task. Dropping it releases the watch and
/// stops all further updates for that row.
struct RowSubscription {
    handle: JoinHandle<()>,
}

impl Drop for RowSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Watcher tasks for the currently rendered id range.
#[derive(Default)]
struct RowSet {
    watchers: HashMap<u64, RowSubscription>,
    /// High-water mark: ids below this were already mounted once and are
    /// never respawned (an unmounted row stays unmounted).
    next_id: u64,
}

/// The reconciliation loop for one SolidWill contract.
pub struct WillBoard<P: ChainProvider> {
    provider: Arc<P>,
    config: WillBoardConfig,
    state: Arc<RwLock<BoardState>>,
    event_tx: broadcast::Sender<BoardEvent>,
    tick_tx: broadcast::Sender<u64>,
    rows: Mutex<RowSet>,
}

impl<P: ChainProvider + 'static> WillBoard<P> {
    /// Create a board over the given provider.
    pub fn new(provider: Arc<P>, config: WillBoardConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        let (tick_tx, _) = broadcast::channel(config.tick_capacity);
        Self {
            provider,
            config,
            state: Arc::new(RwLock::new(BoardState::default())),
            event_tx,
            tick_tx,
            rows: Mutex::new(RowSet::default()),
        }
    }

    /// Subscribe to reconciliation events.
    pub fn events(&self) -> broadcast::Receiver<BoardEvent> {
        self.event_tx.subscribe()
    }

    /// Contract address this board watches.
    pub fn contract(&self) -> Address {
        self.config.contract
    }

    /// Connected account, if any.
    pub fn account(&self) -> Option<Address> {
        self.provider.address()
    }

    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Run the reconciliation loop over a stream of head numbers.
    ///
    /// The chain head is fetched once at startup and not watched; the
    /// resulting `blocks_remaining` values grow stale as the chain advances.
    /// Ends with [`WatchError::StreamEnded`] when the head stream closes.
    pub async fn run<S>(&self, heads: S) -> Result<(), WatchError>
    where
        S: Stream<Item = Result<u64, WatchError>> + Send,
    {
        futures::pin_mut!(heads);

        let head = self.provider.block_number().await?;
        self.state.write().await.chain_head = Some(head);
        let _ = self.event_tx.send(BoardEvent::Head { number: head });
        tracing::info!("chain head at mount: {}", head);

        while let Some(tick) = heads.next().await {
            let number = tick?;
            tracing::debug!("new head {}", number);
            self.refresh_counter().await;
            // Fan the tick out to every mounted row watcher.
            let _ = self.tick_tx.send(number);
        }

        Err(WatchError::StreamEnded)
    }

    /// Re-fetch the counter and expand the watched id range.
    async fn refresh_counter(&self) {
        let data = match self.provider.call(self.config.contract, counter_call()).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("counter read failed: {}", e);
                return;
            }
        };
        let counter = match decode_counter(&data) {
            Ok(counter) => counter,
            Err(e) => {
                tracing::warn!("counter decode failed: {}", e);
                return;
            }
        };

        let counter = {
            let mut state = self.state.write().await;
            // The on-chain counter is monotonic; keep the larger value if a
            // lagging provider reports an older one. Events carry the same
            // clamped value the view renders.
            let clamped = state.counter.map_or(counter, |c| c.max(counter));
            state.counter = Some(clamped);
            clamped
        };
        let _ = self.event_tx.send(BoardEvent::Counter { value: counter });

        self.sync_rows(counter).await;
    }

    /// Mount watcher tasks for ids that entered the range `[0, counter)`.
    async fn sync_rows(&self, counter: u64) {
        let mut rows = self.rows.lock().await;
        for id in rows.next_id..counter {
            rows.watchers.insert(id, self.spawn_row(id));
        }
        rows.next_id = rows.next_id.max(counter);
    }

    /// Spawn an independent watcher for one id: fetch once at mount, then
    /// re-fetch on every tick. A stalled or failing row never blocks others.
    fn spawn_row(&self, id: u64) -> RowSubscription {
        let provider = self.provider.clone();
        let contract = self.config.contract;
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        let mut tick_rx = self.tick_tx.subscribe();

        let handle = tokio::spawn(async move {
            refresh_row(&*provider, contract, id, &state, &event_tx).await;
            loop {
                match tick_rx.recv().await {
                    Ok(_) => refresh_row(&*provider, contract, id, &state, &event_tx).await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        RowSubscription { handle }
    }

    /// Release a row's watch. Returns false if the row was never mounted or
    /// was already unmounted. The id stays within the rendered range; only
    /// its updates stop.
    pub async fn unmount_row(&self, id: u64) -> bool {
        self.rows.lock().await.watchers.remove(&id).is_some()
    }

    /// Derive the rendered view.
    ///
    /// Returns `None` until both the counter and the chain head have been
    /// observed and are non-zero; the list is simply omitted until then.
    pub async fn view(&self) -> Option<DashboardView> {
        let state = self.state.read().await;
        let counter = state.counter.filter(|c| *c > 0)?;
        let head = state.chain_head.filter(|h| *h > 0)?;

        let rows = (0..counter)
            .map(|id| {
                let record = state.wills.get(&id).cloned();
                let blocks_remaining = record.as_ref().map(|r| r.blocks_remaining(head));
                WillRow { id, record, blocks_remaining }
            })
            .collect();

        Some(DashboardView { chain_head: head, account: self.provider.address(), rows })
    }
}

/// Fetch one will and replace its snapshot wholesale. On failure the
/// previous snapshot stays; rendering degrades to stale fields, not a crash.
async fn refresh_row<P: ChainProvider>(
    provider: &P,
    contract: Address,
    id: u64,
    state: &RwLock<BoardState>,
    event_tx: &broadcast::Sender<BoardEvent>,
) {
    let record = match provider.call(contract, will_details_call(id)).await {
        Ok(data) => match WillRecord::abi_decode(&data) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("will {} decode failed: {}", id, e);
                return;
            }
        },
        Err(e) => {
            tracing::warn!("will {} read failed: {}", id, e);
            return;
        }
    };

    state.write().await.wills.insert(id, record.clone());
    let _ = event_tx.send(BoardEvent::Will { id, record });
}
