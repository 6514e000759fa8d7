//! In-process store used when no database is at hand.
//!
//! A single async mutex guards all state, so every call observes and
//! produces a consistent state: the balance check and the debit happen in the
//! same critical section, mirroring the check constraint of the SQL schema.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use tokio::sync::Mutex;

use crate::{
    Account, AccountId, AccountStore, CatalogItem, CatalogStore, DELETED_ACCOUNT_NAME, Direction,
    EngineError, HistoryEntry, INITIAL_BALANCE, InventoryItem, ItemId, LedgerEntry,
    LedgerEntryId, LedgerStore, ResultEngine, SHOP_ACCOUNT_ID, SHOP_ACCOUNT_NAME, Snapshot,
};

#[derive(Debug, Default)]
struct State {
    last_account_id: AccountId,
    accounts: BTreeMap<AccountId, Account>,
    names: HashMap<String, AccountId>,
    catalog: BTreeMap<ItemId, CatalogItem>,
    inventory: BTreeMap<(AccountId, ItemId), i64>,
    ledger: Vec<LedgerEntry>,
}

impl State {
    fn insert_account(&mut self, name: &str, credential_hash: &[u8], balance: i64) -> AccountId {
        self.last_account_id += 1;
        let id = self.last_account_id;
        self.accounts.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                credential_hash: credential_hash.to_vec(),
                balance,
            },
        );
        self.names.insert(name.to_string(), id);
        id
    }

    fn account_mut(&mut self, id: AccountId) -> ResultEngine<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))
    }

    /// Validate every account touched by `deltas` before changing any of them.
    fn apply_deltas(&mut self, deltas: &[(AccountId, i64)]) -> ResultEngine<()> {
        for (id, delta) in deltas {
            let account = self.account_mut(*id)?;
            if account.balance + delta < 0 {
                return Err(EngineError::InsufficientFunds(id.to_string()));
            }
        }
        for (id, delta) in deltas {
            self.account_mut(*id)?.balance += delta;
        }
        Ok(())
    }

    fn append(
        &mut self,
        id: LedgerEntryId,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id,
            sender,
            recipient,
            amount,
            created_at: Utc::now(),
        };
        self.ledger.push(entry.clone());
        entry
    }

    fn name_of(&self, id: AccountId) -> String {
        self.accounts
            .get(&id)
            .map_or_else(|| DELETED_ACCOUNT_NAME.to_string(), |a| a.name.clone())
    }
}

/// Id of the entry appended after `len` existing ones.
fn next_entry_id(len: usize) -> ResultEngine<LedgerEntryId> {
    len.checked_add(1)
        .and_then(|next| LedgerEntryId::try_from(next).ok())
        .ok_or_else(|| EngineError::Database(DbErr::Custom("ledger ids exhausted".to_string())))
}

/// Thread-safe in-memory implementation of every store capability.
///
/// Starts with the shop account (id 1) and, optionally, a catalog.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_catalog(std::iter::empty())
    }

    /// Seed the catalog with `(name, price)` pairs; ids are assigned in order.
    pub fn with_catalog<'a>(items: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut state = State::default();
        state.insert_account(SHOP_ACCOUNT_NAME, &[], 0);
        state.catalog = items
            .into_iter()
            .zip(1..)
            .map(|((name, price), id)| {
                (
                    id,
                    CatalogItem {
                        id,
                        name: name.to_string(),
                        price,
                    },
                )
            })
            .collect();
        Self {
            state: Mutex::new(state),
        }
    }

    /// Drop an account while keeping its ledger rows, so history shows the
    /// deleted-account placeholder.
    pub async fn remove_account(&self, id: AccountId) -> ResultEngine<()> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .remove(&id)
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))?;
        state.names.remove(&account.name);
        state.inventory.retain(|(owner, _), _| *owner != id);
        Ok(())
    }

    /// Every ledger row, oldest first.
    pub async fn ledger(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.ledger.clone()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn put(&self, name: &str, credential_hash: &[u8]) -> ResultEngine<AccountId> {
        let mut state = self.state.lock().await;
        if state.names.contains_key(name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(state.insert_account(name, credential_hash, INITIAL_BALANCE))
    }

    async fn get_by_id(&self, id: AccountId) -> ResultEngine<Account> {
        let state = self.state.lock().await;
        state
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))
    }

    async fn get_by_name(&self, name: &str) -> ResultEngine<Account> {
        let state = self.state.lock().await;
        state
            .names
            .get(name)
            .and_then(|id| state.accounts.get(id))
            .cloned()
            .ok_or_else(|| EngineError::UserNotFound(name.to_string()))
    }

    async fn snapshot(&self, id: AccountId) -> ResultEngine<Snapshot> {
        let state = self.state.lock().await;
        let coins = state
            .accounts
            .get(&id)
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))?
            .balance;

        let mut inventory: Vec<InventoryItem> = state
            .inventory
            .iter()
            .filter(|((owner, _), _)| *owner == id)
            .filter_map(|((_, item_id), quantity)| {
                state.catalog.get(item_id).map(|item| InventoryItem {
                    name: item.name.clone(),
                    quantity: *quantity,
                })
            })
            .collect();
        inventory.sort_by(|a, b| a.name.cmp(&b.name));

        // Ledger ids grow with time, so reverse order is newest first.
        let history = state
            .ledger
            .iter()
            .rev()
            .filter_map(|entry| {
                if entry.sender == id {
                    Some((Direction::Sent, entry.recipient, entry))
                } else if entry.recipient == id {
                    Some((Direction::Received, entry.sender, entry))
                } else {
                    None
                }
            })
            .map(|(direction, other, entry)| HistoryEntry {
                direction,
                counterparty: state.name_of(other),
                amount: entry.amount,
                created_at: entry.created_at,
            })
            .collect();

        Ok(Snapshot {
            coins,
            inventory,
            history,
        })
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> ResultEngine<CatalogItem> {
        let state = self.state.lock().await;
        state
            .catalog
            .values()
            .find(|item| item.name == name)
            .cloned()
            .ok_or_else(|| EngineError::ItemNotFound(name.to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> ResultEngine<LedgerEntry> {
        let mut state = self.state.lock().await;
        let id = next_entry_id(state.ledger.len())?;
        state.apply_deltas(&[(sender, -amount), (recipient, amount)])?;
        Ok(state.append(id, sender, recipient, amount))
    }

    async fn purchase(&self, buyer: AccountId, item: &CatalogItem) -> ResultEngine<LedgerEntry> {
        let mut state = self.state.lock().await;
        let id = next_entry_id(state.ledger.len())?;
        state.apply_deltas(&[(buyer, -item.price)])?;
        *state.inventory.entry((buyer, item.id)).or_insert(0) += 1;
        Ok(state.append(id, buyer, SHOP_ACCOUNT_ID, item.price))
    }
}
