//! Ledger primitives.
//!
//! A `LedgerEntry` records one completed coin movement. Rows are append-only:
//! they are inserted in the same relational transaction as the balance changes
//! they describe and never updated afterwards. A purchase is recorded as a
//! movement towards [`SHOP_ACCOUNT_ID`](crate::SHOP_ACCOUNT_ID).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::AccountId;

pub type LedgerEntryId = i32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// `sender` and `recipient` carry no foreign key: history must still render
// rows whose counterparty no longer resolves.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coin_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sender: i32,
    pub recipient: i32,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            sender: model.sender,
            recipient: model.recipient,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}

/// Build the row for a new entry; the id is assigned by the store.
pub(crate) fn new_entry(
    sender: AccountId,
    recipient: AccountId,
    amount: i64,
    created_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::NotSet,
        sender: ActiveValue::Set(sender),
        recipient: ActiveValue::Set(recipient),
        amount: ActiveValue::Set(amount),
        created_at: ActiveValue::Set(created_at),
    }
}
