use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::{decode, decode_all, RepoError};
use crate::models::{NewItem, ShoppingItem};
use crate::store::{Direction, Filter, Query, RemoteError, RemoteStore, Table};
use crate::validation::{parse_quantity, require_name};

#[derive(Serialize)]
struct NewItemRow<'a> {
    list_id: Uuid,
    name: &'a str,
    quantity: u32,
    unit: &'a str,
    category: &'a str,
}

pub struct ItemRepository {
    store: Arc<dyn RemoteStore>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Items of a list, oldest first.
    pub async fn list(&self, list_id: Uuid) -> Result<Vec<ShoppingItem>, RemoteError> {
        let query = Query::from(Table::Items)
            .eq("list_id", list_id)
            .order("created_at", Direction::Ascending);
        decode_all(self.store.select(&query).await?)
    }

    /// Adds an item to a list.
    ///
    /// The name must not be blank and the quantity text is coerced with
    /// [`parse_quantity`]; both checks run before the store is contacted.
    pub async fn create(&self, list_id: Uuid, item: &NewItem) -> Result<ShoppingItem, RepoError> {
        let name = require_name(&item.name)?;
        let quantity = parse_quantity(&item.quantity)?;

        let row = serde_json::to_value(NewItemRow {
            list_id,
            name: &name,
            quantity,
            unit: item.unit.label(),
            category: item.category.label(),
        })
        .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let created = self.store.insert(Table::Items, row).await?;
        Ok(decode(created)?)
    }

    /// Sets the purchased flag and returns the item as stored.
    ///
    /// Setting the current value again still makes the round trip.
    pub async fn set_purchased(
        &self,
        item_id: Uuid,
        purchased: bool,
    ) -> Result<ShoppingItem, RemoteError> {
        let updated = self
            .store
            .update(
                Table::Items,
                &[Filter::eq("id", item_id)],
                json!({ "purchased": purchased }),
            )
            .await?;

        match updated.into_iter().next() {
            Some(row) => decode(row),
            None => Err(RemoteError::NotFound(format!("item {}", item_id))),
        }
    }

    pub async fn delete(&self, item_id: Uuid) -> Result<(), RemoteError> {
        self.store
            .delete(Table::Items, &[Filter::eq("id", item_id)])
            .await
    }
}
