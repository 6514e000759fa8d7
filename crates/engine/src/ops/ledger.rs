use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{
    AccountId, CatalogItem, EngineError, LedgerEntry, LedgerStore, ResultEngine,
    SHOP_ACCOUNT_ID, accounts, inventory, ledger, util::is_check_violation,
};

use super::{SqlStore, with_tx};

impl SqlStore {
    /// Add `delta` to the account balance in one statement.
    ///
    /// The `coins >= 0` check constraint is evaluated by this very update, so
    /// concurrent debits of the same account serialize on its row.
    async fn apply_delta(
        db_tx: &DatabaseTransaction,
        account_id: AccountId,
        delta: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Coins,
                Expr::col(accounts::Column::Coins).add(delta),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .exec(db_tx)
            .await;
        match result {
            Ok(res) if res.rows_affected == 0 => {
                Err(EngineError::UserNotFound(account_id.to_string()))
            }
            Ok(_) => Ok(()),
            Err(err) if is_check_violation(&err) => {
                Err(EngineError::InsufficientFunds(account_id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> ResultEngine<LedgerEntry> {
        with_tx!(self, AccessMode::ReadWrite, |db_tx| {
            Self::apply_delta(&db_tx, sender, -amount).await?;
            Self::apply_delta(&db_tx, recipient, amount).await?;
            let entry = ledger::new_entry(sender, recipient, amount, Utc::now())
                .insert(&db_tx)
                .await?;
            Ok(LedgerEntry::from(entry))
        })
    }

    async fn purchase(&self, buyer: AccountId, item: &CatalogItem) -> ResultEngine<LedgerEntry> {
        with_tx!(self, AccessMode::ReadWrite, |db_tx| {
            Self::apply_delta(&db_tx, buyer, -item.price).await?;

            let owned = inventory::ActiveModel {
                account_id: ActiveValue::Set(buyer),
                merch_id: ActiveValue::Set(item.id),
                quantity: ActiveValue::Set(1),
            };
            inventory::Entity::insert(owned)
                .on_conflict(
                    OnConflict::columns([inventory::Column::AccountId, inventory::Column::MerchId])
                        .value(
                            inventory::Column::Quantity,
                            Expr::col((inventory::Entity, inventory::Column::Quantity)).add(1),
                        )
                        .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;

            // The shop balance is not credited; the row is the purchase record.
            let entry = ledger::new_entry(buyer, SHOP_ACCOUNT_ID, item.price, Utc::now())
                .insert(&db_tx)
                .await?;
            Ok(LedgerEntry::from(entry))
        })
    }
}
