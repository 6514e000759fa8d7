use async_trait::async_trait;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    Account, AccountId, AccountStore, EngineError, INITIAL_BALANCE, ResultEngine, Snapshot,
    accounts, util::is_unique_violation,
};

use super::SqlStore;

#[async_trait]
impl AccountStore for SqlStore {
    async fn put(&self, name: &str, credential_hash: &[u8]) -> ResultEngine<AccountId> {
        let model = accounts::ActiveModel {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(name.to_string()),
            password_hash: ActiveValue::Set(credential_hash.to_vec()),
            coins: ActiveValue::Set(INITIAL_BALANCE),
        };
        match model.insert(&self.database).await {
            Ok(model) => {
                tracing::debug!(account_id = model.id, "account registered");
                Ok(model.id)
            }
            Err(err) if is_unique_violation(&err) => Err(EngineError::ExistingKey(name.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_by_id(&self, id: AccountId) -> ResultEngine<Account> {
        accounts::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Account::from)
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))
    }

    async fn get_by_name(&self, name: &str) -> ResultEngine<Account> {
        accounts::Entity::find()
            .filter(accounts::Column::Username.eq(name))
            .one(&self.database)
            .await?
            .map(Account::from)
            .ok_or_else(|| EngineError::UserNotFound(name.to_string()))
    }

    async fn snapshot(&self, id: AccountId) -> ResultEngine<Snapshot> {
        self.read_snapshot(id).await
    }
}
