//! Inventory rows: how many units of an item an account owns.
//!
//! Quantities only grow; a purchase upserts `(account_id, merch_id)`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub merch_id: i32,
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::catalog::Entity",
        from = "Column::MerchId",
        to = "super::catalog::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Merch,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::catalog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
