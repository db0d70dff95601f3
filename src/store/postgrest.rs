//! REST implementation of [`RemoteStore`] against the project's data API.

use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{Direction, Filter, Query, RemoteError, RemoteStore, Table};
use crate::client::SupabaseClient;

const REST_PATH: &str = "rest/v1";

/// Error body returned by the data API.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

pub struct PostgrestStore {
    client: Arc<SupabaseClient>,
}

impl PostgrestStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn table_url(&self, table: Table) -> String {
        self.client
            .endpoint(&format!("{}/{}", REST_PATH, table.name()))
    }

    /// Full URL for a select.
    fn select_url(&self, query: &Query) -> String {
        let mut params = vec!["select=*".to_string()];
        params.extend(filter_params(&query.filters));
        if let Some(order) = &query.order {
            let dir = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(format!("order={}.{}", order.column, dir));
        }
        format!("{}?{}", self.table_url(query.table), params.join("&"))
    }

    /// Full URL for an update or delete.
    fn filtered_url(&self, table: Table, filters: &[Filter]) -> String {
        format!(
            "{}?{}",
            self.table_url(table),
            filter_params(filters).join("&")
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        prefer: Option<&str>,
    ) -> Result<Response, RemoteError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(rejection(response).await)
        }
    }

    async fn rows(response: Response) -> Result<Vec<Value>, RemoteError> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, RemoteError> {
        let url = self.select_url(query);
        let response = self.send(Method::GET, &url, None, None).await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError> {
        let url = self.table_url(table);
        let response = self
            .send(
                Method::POST,
                &url,
                Some(&row),
                Some("return=representation"),
            )
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Decode(format!("insert into {} returned no row", table)))
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
        let url = self.filtered_url(table, filters);
        let response = self
            .send(
                Method::PATCH,
                &url,
                Some(&patch),
                Some("return=representation"),
            )
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RemoteError> {
        if filters.is_empty() {
            return Err(RemoteError::Unfiltered("delete"));
        }
        let url = self.filtered_url(table, filters);
        self.send(Method::DELETE, &url, None, Some("return=minimal"))
            .await?;
        Ok(())
    }
}

fn filter_params(filters: &[Filter]) -> Vec<String> {
    filters
        .iter()
        .map(|f| format!("{}=eq.{}", f.column, urlencoding::encode(&f.value)))
        .collect()
}

async fn rejection(response: Response) -> RemoteError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    parse_rejection(status, &text)
}

fn parse_rejection(status: u16, text: &str) -> RemoteError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = match (body.message, body.details) {
        (Some(m), Some(d)) => format!("{} ({})", m, d),
        (Some(m), None) => m,
        (None, _) if !text.is_empty() => text.to_string(),
        (None, _) => "no details".to_string(),
    };
    RemoteError::Rejected {
        status,
        code: body.code,
        message,
    }
}
