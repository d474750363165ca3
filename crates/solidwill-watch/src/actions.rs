//! Write actions: create-will submission and the heartbeat.

use alloy_primitives::B256;

use solidwill_contract::{confirm_life_call, create_will_call};

use super::{board::WillBoard, ChainProvider, WatchError};

/// Input state of the create-will form. The frequency is kept as the raw
/// input string until submission, matching the single text field it mirrors.
#[derive(Debug, Clone, Default)]
pub struct CreateWillForm {
    pub frequency: String,
}

impl CreateWillForm {
    pub fn new(frequency: impl Into<String>) -> Self {
        Self { frequency: frequency.into() }
    }
}

impl<P: ChainProvider + 'static> WillBoard<P> {
    /// Validate and submit a create-will transaction.
    ///
    /// An empty or non-numeric frequency is rejected before any network
    /// attempt. On acceptance the input field is cleared immediately; the
    /// write is dispatched after, and a failed dispatch does not restore
    /// the field.
    pub async fn submit_create_will(
        &self,
        form: &mut CreateWillForm,
    ) -> Result<B256, WatchError> {
        let raw = form.frequency.trim();
        if raw.is_empty() {
            return Err(WatchError::Validation("frequency is required".to_string()));
        }
        let frequency: u64 = raw.parse().map_err(|_| {
            WatchError::Validation(format!("frequency must be a block count, got {:?}", raw))
        })?;
        let owner = self.account().ok_or(WatchError::NoSigner)?;

        form.frequency.clear();

        let hash =
            self.provider().send(self.contract(), create_will_call(owner, frequency)).await?;
        tracing::info!(
            "createWill submitted: owner={}, frequency={}, tx={}",
            owner,
            frequency,
            hash
        );
        Ok(hash)
    }

    /// Submit a heartbeat for one will.
    ///
    /// No optimistic local update: the row's snapshot refreshes only when
    /// the next watch emission arrives.
    pub async fn submit_heartbeat(&self, id: u64) -> Result<B256, WatchError> {
        if self.account().is_none() {
            return Err(WatchError::NoSigner);
        }
        let hash = self.provider().send(self.contract(), confirm_life_call(id)).await?;
        tracing::info!("confirmLife submitted: id={}, tx={}", id, hash);
        Ok(hash)
    }
}
