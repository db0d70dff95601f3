use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{decode, decode_all, RepoError};
use crate::models::ShoppingList;
use crate::store::{Direction, Filter, Query, RemoteError, RemoteStore, Table};
use crate::validation::require_name;

#[derive(Serialize)]
struct NewListRow<'a> {
    name: &'a str,
    user_id: Uuid,
}

pub struct ListRepository {
    store: Arc<dyn RemoteStore>,
}

impl ListRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Lists owned by `owner_id`, newest first.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<ShoppingList>, RemoteError> {
        let query = Query::from(Table::Lists)
            .eq("user_id", owner_id)
            .order("created_at", Direction::Descending);
        decode_all(self.store.select(&query).await?)
    }

    /// Creates a list. Blank names are rejected without contacting the store.
    pub async fn create(&self, name: &str, owner_id: Uuid) -> Result<ShoppingList, RepoError> {
        let name = require_name(name)?;
        let row = serde_json::to_value(NewListRow {
            name: &name,
            user_id: owner_id,
        })
        .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let created = self.store.insert(Table::Lists, row).await?;
        Ok(decode(created)?)
    }

    /// Deletes a list; the store removes its items.
    pub async fn delete(&self, list_id: Uuid) -> Result<(), RemoteError> {
        self.store
            .delete(Table::Lists, &[Filter::eq("id", list_id)])
            .await
    }
}
