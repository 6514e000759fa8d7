use async_trait::async_trait;
use sea_orm::{QueryFilter, prelude::*};

use crate::{CatalogItem, CatalogStore, EngineError, ResultEngine, catalog};

use super::SqlStore;

#[async_trait]
impl CatalogStore for SqlStore {
    async fn get_by_name(&self, name: &str) -> ResultEngine<CatalogItem> {
        catalog::Entity::find()
            .filter(catalog::Column::Name.eq(name))
            .one(&self.database)
            .await?
            .map(CatalogItem::from)
            .ok_or_else(|| EngineError::ItemNotFound(name.to_string()))
    }
}
