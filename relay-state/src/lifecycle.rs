use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{backend::StateBackend, error::RelayStateResult, keys::StateId, store::RelayStateStore};

/// A transaction as the gateway sees it once decoded: who sent it, which nonce
/// slot it occupies and its hash. Identifiers are kept normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaySubmission {
    pub sender: String,
    pub nonce: u64,
    pub tx_hash: String,
}

impl RelaySubmission {
    pub fn new(
        sender: &(impl StateId + ?Sized),
        nonce: u64,
        tx_hash: &(impl StateId + ?Sized),
    ) -> Self {
        Self {
            sender: sender.state_id(),
            nonce,
            tx_hash: tx_hash.state_id(),
        }
    }
}

/// Where a transaction stands from the relay state's point of view.
///
/// Expired records fall back to `NotSeen`. Confirmation is tracked by the node,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayStatus {
    NotSeen,
    #[serde(rename_all = "camelCase")]
    SentToRelay { sent_at: DateTime<Utc> },
    /// The sender's nonce slot now belongs to another hash. `sent_at` is set
    /// when this hash itself was forwarded before being superseded.
    #[serde(rename_all = "camelCase")]
    Replaced {
        current_tx_hash: String,
        sent_at: Option<DateTime<Utc>>,
    },
}

impl<B: StateBackend> RelayStateStore<B> {
    /// Record everything the gateway remembers about a transaction it just
    /// forwarded to the relay.
    ///
    /// The writes are independent: if one fails the error is returned and the
    /// indices written before it keep their new values.
    pub async fn record_relay_submission(&self, submission: &RelaySubmission) -> RelayStateResult<()> {
        let RelaySubmission {
            sender,
            nonce,
            tx_hash,
        } = submission;

        self.sent_to_relay().record(tx_hash).await?;
        self.tx_hash_for_sender_and_nonce()
            .record(sender, *nonce, tx_hash)
            .await?;
        self.sender_of_tx_hash().record(tx_hash, sender).await?;
        self.last_tx_hash_of_account().record(sender, tx_hash).await?;

        tracing::debug!(
            sender = %sender,
            nonce = nonce,
            tx_hash = %tx_hash,
            "Recorded relay submission"
        );
        Ok(())
    }

    /// Only `NotSeen` means the relay has never received this hash and its
    /// nonce slot is free for it. A replaced hash keeps its forward record.
    pub async fn relay_status(&self, submission: &RelaySubmission) -> RelayStateResult<RelayStatus> {
        let sent_at = self.sent_to_relay().lookup(&submission.tx_hash).await?;
        let slot_owner = self
            .tx_hash_for_sender_and_nonce()
            .lookup(&submission.sender, submission.nonce)
            .await?;

        Ok(match (slot_owner, sent_at) {
            (Some(current_tx_hash), sent_at) if current_tx_hash != submission.tx_hash => {
                RelayStatus::Replaced {
                    current_tx_hash,
                    sent_at,
                }
            }
            (_, Some(sent_at)) => RelayStatus::SentToRelay { sent_at },
            (_, None) => RelayStatus::NotSeen,
        })
    }
}
