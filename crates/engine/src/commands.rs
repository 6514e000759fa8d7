//! Command structs for engine operations.
//!
//! Besides the operation inputs, each command may carry a deadline. When it
//! does not, the engine applies its configured store timeout.

use tokio::time::Instant;

use crate::AccountId;

/// Move `amount` coins from `sender_id` to the account named `recipient`.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub sender_id: AccountId,
    pub recipient: String,
    pub amount: i64,
    pub deadline: Option<Instant>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(sender_id: AccountId, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender_id,
            recipient: recipient.into(),
            amount,
            deadline: None,
        }
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Buy one unit of the catalog item named `item`.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub buyer_id: AccountId,
    pub item: String,
    pub deadline: Option<Instant>,
}

impl PurchaseCmd {
    #[must_use]
    pub fn new(buyer_id: AccountId, item: impl Into<String>) -> Self {
        Self {
            buyer_id,
            item: item.into(),
            deadline: None,
        }
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
