//! Access to the hosted relational store.
//!
//! The store exposes two collections, `shopping_lists` and `shopping_items`,
//! with filtered CRUD operations. Rows travel as JSON objects; the
//! repositories in [`crate::repo`] turn them into typed models.
//!
//! Two implementations exist:
//! - [`PostgrestStore`]: the hosted REST API
//! - [`MemoryStore`]: an in-process store with the same filtering, ordering
//!   and cascade behaviour, used by tests

mod error;
mod memory;
mod postgrest;

pub use error::RemoteError;
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

use async_trait::async_trait;
use serde_json::Value;

/// The collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Lists,
    Items,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Lists => "shopping_lists",
            Table::Items => "shopping_items",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// A select over one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }
}

/// Filtered CRUD over the store's collections.
///
/// Row-level access is decided by the store from the caller's credentials;
/// implementations do not scope rows themselves.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the rows matching `query`, in the requested order.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, RemoteError>;

    /// Inserts one row and returns it as stored (generated columns filled in).
    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError>;

    /// Applies `patch` to every matching row and returns the updated rows.
    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Deletes every matching row.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RemoteError>;
}
