//! In-process [`RemoteStore`] with the store's column defaults, foreign key
//! check and list → item cascade.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Direction, Filter, Query, RemoteError, RemoteStore, Table};

#[derive(Default)]
struct State {
    tables: HashMap<Table, Vec<Map<String, Value>>>,
    last_timestamp: Option<DateTime<Utc>>,
    failure: Option<RemoteError>,
    calls: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `error` until [`Self::recover`].
    pub fn fail_with(&self, error: RemoteError) {
        self.lock().failure = Some(error);
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        self.lock().tables.get(&table).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Counts the call and returns the injected failure, if any.
    fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>, RemoteError> {
        let mut state = self.lock();
        state.calls += 1;
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        Ok(state)
    }
}

impl State {
    /// Strictly increasing timestamps, so creation order is always visible.
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    fn rows(&mut self, table: Table) -> &mut Vec<Map<String, Value>> {
        self.tables.entry(table).or_default()
    }

    fn list_exists(&self, id: &str) -> bool {
        self.tables
            .get(&Table::Lists)
            .map(|rows| rows.iter().any(|r| r.get("id").and_then(Value::as_str) == Some(id)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, RemoteError> {
        let mut state = self.begin()?;
        let mut rows: Vec<Map<String, Value>> = state
            .rows(query.table)
            .iter()
            .filter(|row| matches_all(row, &query.filters))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError> {
        let mut state = self.begin()?;
        let Value::Object(mut row) = row else {
            return Err(RemoteError::Rejected {
                status: 400,
                code: Some("PGRST102".to_string()),
                message: "row must be a JSON object".to_string(),
            });
        };

        let defaults = match table {
            Table::Lists => json!({}),
            Table::Items => json!({
                "quantity": 1,
                "unit": "pièce(s)",
                "category": "Autres",
                "purchased": false,
            }),
        };
        if let Value::Object(defaults) = defaults {
            for (column, value) in defaults {
                row.entry(column).or_insert(value);
            }
        }

        if table == Table::Items {
            let list_id = row.get("list_id").and_then(Value::as_str).unwrap_or_default();
            if !state.list_exists(list_id) {
                return Err(RemoteError::Rejected {
                    status: 409,
                    code: Some("23503".to_string()),
                    message: format!("list {} does not exist", list_id),
                });
            }
        }

        let ts = state.next_timestamp();
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.insert("created_at".to_string(), Value::String(ts.clone()));
        row.insert("updated_at".to_string(), Value::String(ts));

        state.rows(table).push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError> {
        if filters.is_empty() {
            return Err(RemoteError::Unfiltered("update"));
        }
        let mut state = self.begin()?;
        let ts = state.next_timestamp();
        let patch = patch.as_object().cloned().unwrap_or_default();

        let mut updated = Vec::new();
        for row in state.rows(table).iter_mut() {
            if matches_all(row, filters) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                row.insert("updated_at".to_string(), Value::String(ts.clone()));
                updated.push(Value::Object(row.clone()));
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RemoteError> {
        if filters.is_empty() {
            return Err(RemoteError::Unfiltered("delete"));
        }
        let mut state = self.begin()?;

        let mut removed_ids = Vec::new();
        state.rows(table).retain(|row| {
            if matches_all(row, filters) {
                if let Some(id) = row.get("id").and_then(Value::as_str) {
                    removed_ids.push(id.to_string());
                }
                false
            } else {
                true
            }
        });

        // on delete cascade
        if table == Table::Lists && !removed_ids.is_empty() {
            state.rows(Table::Items).retain(|item| {
                let list_id = item.get("list_id").and_then(Value::as_str);
                !list_id.is_some_and(|id| removed_ids.iter().any(|r| r == id))
            });
        }
        Ok(())
    }
}

fn matches_all(row: &Map<String, Value>, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match row.get(f.column) {
        Some(Value::String(s)) => s == &f.value,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == f.value,
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        // nulls last
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn insert_list(store: &MemoryStore, name: &str, owner: &str) -> String {
        let row = store
            .insert(Table::Lists, json!({"name": name, "user_id": owner}))
            .await
            .unwrap();
        row["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_insert_fills_generated_columns_and_defaults() {
        let store = MemoryStore::new();
        let list_id = insert_list(&store, "Samedi", "u1").await;

        let item = store
            .insert(Table::Items, json!({"list_id": list_id, "name": "Lait"}))
            .await
            .unwrap();

        assert!(Uuid::parse_str(item["id"].as_str().unwrap()).is_ok());
        assert_eq!(item["quantity"], json!(1));
        assert_eq!(item["unit"], json!("pièce(s)"));
        assert_eq!(item["category"], json!("Autres"));
        assert_eq!(item["purchased"], json!(false));
        assert!(item["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_insert_item_requires_existing_list() {
        let store = MemoryStore::new();
        let err = store
            .insert(
                Table::Items,
                json!({"list_id": Uuid::new_v4().to_string(), "name": "Lait"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let store = MemoryStore::new();
        insert_list(&store, "first", "u1").await;
        insert_list(&store, "other", "u2").await;
        insert_list(&store, "second", "u1").await;

        let rows = store
            .select(
                &Query::from(Table::Lists)
                    .eq("user_id", "u1")
                    .order("created_at", Direction::Descending),
            )
            .await
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_matches_boolean_and_returns_rows() {
        let store = MemoryStore::new();
        let list_id = insert_list(&store, "Samedi", "u1").await;
        store
            .insert(Table::Items, json!({"list_id": list_id, "name": "Lait"}))
            .await
            .unwrap();

        let updated = store
            .update(
                Table::Items,
                &[Filter::eq("purchased", false)],
                json!({"purchased": true}),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["purchased"], json!(true));

        let none = store
            .update(
                Table::Items,
                &[Filter::eq("id", Uuid::new_v4())],
                json!({"purchased": true}),
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_list_cascades_to_items() {
        let store = MemoryStore::new();
        let keep = insert_list(&store, "keep", "u1").await;
        let drop = insert_list(&store, "drop", "u1").await;
        for list in [&keep, &drop, &drop] {
            store
                .insert(Table::Items, json!({"list_id": list, "name": "x"}))
                .await
                .unwrap();
        }

        store
            .delete(Table::Lists, &[Filter::eq("id", &drop)])
            .await
            .unwrap();

        assert_eq!(store.row_count(Table::Lists), 1);
        assert_eq!(store.row_count(Table::Items), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_and_call_count() {
        let store = MemoryStore::new();
        store.fail_with(RemoteError::Transport("offline".into()));

        let result = store.select(&Query::from(Table::Lists)).await;
        assert_eq!(result, Err(RemoteError::Transport("offline".into())));
        assert_eq!(store.calls(), 1);

        store.recover();
        assert!(store.select(&Query::from(Table::Lists)).await.is_ok());
        assert_eq!(store.calls(), 2);
    }
}
