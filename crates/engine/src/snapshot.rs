//! Point-in-time view of an account: coins, inventory and coin history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name shown for a counterparty that no longer resolves to an account.
pub const DELETED_ACCOUNT_NAME: &str = "deleted";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: i64,
}

/// One ledger row seen from the snapshot owner's side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub direction: Direction,
    /// The other party's name, or [`DELETED_ACCOUNT_NAME`].
    pub counterparty: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// All three parts are read from the same consistent point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub coins: i64,
    /// Ordered by item name.
    pub inventory: Vec<InventoryItem>,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
}

impl Snapshot {
    pub fn sent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history
            .iter()
            .filter(|entry| entry.direction == Direction::Sent)
    }

    pub fn received(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history
            .iter()
            .filter(|entry| entry.direction == Direction::Received)
    }

    /// Quantity owned of `item`, zero when absent.
    pub fn quantity_of(&self, item: &str) -> i64 {
        self.inventory
            .iter()
            .find(|owned| owned.name == item)
            .map_or(0, |owned| owned.quantity)
    }
}
