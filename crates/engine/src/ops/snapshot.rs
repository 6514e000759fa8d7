use sea_orm::{
    AccessMode, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
    sea_query::{Alias, Condition, Expr, Func, Order, Query, SimpleExpr},
};

use crate::{
    AccountId, DELETED_ACCOUNT_NAME, Direction, EngineError, HistoryEntry, InventoryItem,
    ResultEngine, Snapshot, accounts, catalog, inventory, ledger,
};

use super::{SqlStore, with_tx};

#[derive(Debug, FromQueryResult)]
struct InventoryRow {
    name: String,
    quantity: i64,
}

#[derive(Debug, FromQueryResult)]
struct HistoryRow {
    sender: i32,
    amount: i64,
    created_at: DateTimeUtc,
    sender_name: String,
    recipient_name: String,
}

/// `COALESCE(<alias>.username, 'deleted')`
fn name_or_deleted(alias: &Alias) -> SimpleExpr {
    let args: [SimpleExpr; 2] = [
        Expr::col((alias.clone(), accounts::Column::Username)).into(),
        Expr::val(DELETED_ACCOUNT_NAME).into(),
    ];
    Func::coalesce(args).into()
}

impl SqlStore {
    pub(super) async fn read_snapshot(&self, id: AccountId) -> ResultEngine<Snapshot> {
        with_tx!(self, AccessMode::ReadOnly, |db_tx| {
            let coins = accounts::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::UserNotFound(id.to_string()))?
                .coins;

            let inventory = inventory::Entity::find()
                .select_only()
                .column_as(catalog::Column::Name, "name")
                .column(inventory::Column::Quantity)
                .join(JoinType::InnerJoin, inventory::Relation::Merch.def())
                .filter(inventory::Column::AccountId.eq(id))
                .order_by_asc(catalog::Column::Name)
                .into_model::<InventoryRow>()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|row| InventoryItem {
                    name: row.name,
                    quantity: row.quantity,
                })
                .collect();

            let from = Alias::new("e_from");
            let to = Alias::new("e_to");
            let query = Query::select()
                .column((ledger::Entity, ledger::Column::Sender))
                .column((ledger::Entity, ledger::Column::Amount))
                .column((ledger::Entity, ledger::Column::CreatedAt))
                .expr_as(name_or_deleted(&from), Alias::new("sender_name"))
                .expr_as(name_or_deleted(&to), Alias::new("recipient_name"))
                .from(ledger::Entity)
                .join_as(
                    JoinType::LeftJoin,
                    accounts::Entity,
                    from.clone(),
                    Expr::col((from.clone(), accounts::Column::Id))
                        .equals((ledger::Entity, ledger::Column::Sender)),
                )
                .join_as(
                    JoinType::LeftJoin,
                    accounts::Entity,
                    to.clone(),
                    Expr::col((to.clone(), accounts::Column::Id))
                        .equals((ledger::Entity, ledger::Column::Recipient)),
                )
                .cond_where(
                    Condition::any()
                        .add(Expr::col((ledger::Entity, ledger::Column::Sender)).eq(id))
                        .add(Expr::col((ledger::Entity, ledger::Column::Recipient)).eq(id)),
                )
                .order_by((ledger::Entity, ledger::Column::CreatedAt), Order::Desc)
                .order_by((ledger::Entity, ledger::Column::Id), Order::Desc)
                .to_owned();
            let stmt = db_tx.get_database_backend().build(&query);

            let history = HistoryRow::find_by_statement(stmt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|row| {
                    let (direction, counterparty) = if row.sender == id {
                        (Direction::Sent, row.recipient_name)
                    } else {
                        (Direction::Received, row.sender_name)
                    };
                    HistoryEntry {
                        direction,
                        counterparty,
                        amount: row.amount,
                        created_at: row.created_at,
                    }
                })
                .collect();

            Ok(Snapshot {
                coins,
                inventory,
                history,
            })
        })
    }
}
