//! The module contains `Account` struct and the `accounts` table.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Numeric identity of an account.
pub type AccountId = i32;

/// Reserved account credited by every purchase.
pub const SHOP_ACCOUNT_ID: AccountId = 1;
/// Name the shop account is registered under.
pub const SHOP_ACCOUNT_NAME: &str = "shop";
/// Coins granted to a freshly registered account.
pub const INITIAL_BALANCE: i64 = 1000;

/// A user identity plus its coin balance.
///
/// The balance is only authoritative when read from the store inside a
/// transaction; copies served by a cache may lag behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub credential_hash: Vec<u8>,
    pub balance: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: Vec<u8>,
    pub coins: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.username,
            credential_hash: model.password_hash,
            balance: model.coins,
        }
    }
}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(value.name.clone()),
            password_hash: ActiveValue::Set(value.credential_hash.clone()),
            coins: ActiveValue::Set(value.balance),
        }
    }
}
