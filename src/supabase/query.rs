use reqwest::header::HeaderValue;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

use super::{decode, ApiError, SupabaseClient};
use crate::error::{Result, ZapError};

/// PostgREST query against a table or view.
///
/// Filters are encoded as `column=op.value` query parameters, ordering as
/// `order=column.asc|desc`.
pub struct QueryBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(client: &'a SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value)));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn in_<V: Display>(self, column: &str, values: &[V]) -> Self {
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({})", list))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string parameters in the order PostgREST expects them
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    fn url(&self) -> String {
        self.client.rest_url(&self.table)
    }

    fn build(&self, method: Method, token: &str) -> RequestBuilder {
        self.client
            .request(method, &self.url(), token)
            .query(&self.params())
    }

    /// Run the query and return all rows
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        tracing::debug!("Querying {} {:?}", self.table, self.params());

        let rows: Vec<T> = self
            .client
            .retry_config()
            .execute(|| async {
                let response = self
                    .client
                    .send(|token| self.build(Method::GET, token))
                    .await?;
                decode(response).await
            })
            .await?;

        tracing::debug!("Fetched {} rows from {}", rows.len(), self.table);
        Ok(rows)
    }

    /// Exactly one row
    pub async fn single<T: DeserializeOwned>(self) -> Result<T> {
        let table = self.table.clone();
        match self.maybe_single().await? {
            Some(row) => Ok(row),
            None => Err(ZapError::NotFound(format!("No row in {}", table))),
        }
    }

    /// Zero or one row; more than one is an error
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let table = self.table.clone();
        let mut rows: Vec<T> = self.execute().await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(ApiError::BadRequest(format!(
                "Expected at most one row from {}, got {}",
                table, n
            ))
            .into()),
        }
    }

    /// Exact row count, read from the `Content-Range` header of a HEAD request
    pub async fn count(self) -> Result<u64> {
        self.client
            .retry_config()
            .execute(|| async {
                let response = self
                    .client
                    .send(|token| {
                        self.build(Method::HEAD, token)
                            .header("Prefer", "count=exact")
                    })
                    .await?;

                if !response.status().is_success() {
                    return Err(ZapError::from(ApiError::from_response(response).await));
                }

                response
                    .headers()
                    .get("content-range")
                    .and_then(parse_content_range_total)
                    .ok_or_else(|| {
                        ZapError::Serialization("Missing Content-Range total".to_string())
                    })
            })
            .await
    }

    /// Insert one row (or an array of rows) and return what was written
    pub async fn insert<B, T>(self, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("Inserting into {}", self.table);

        let response = self
            .client
            .send(|token| {
                self.build(Method::POST, token)
                    .header("Prefer", "return=representation")
                    .json(body)
            })
            .await?;
        decode(response).await
    }

    /// Insert or merge on `on_conflict` columns
    pub async fn upsert<B, T>(self, body: &B, on_conflict: &str) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("Upserting into {} on {}", self.table, on_conflict);

        let response = self
            .client
            .send(|token| {
                self.build(Method::POST, token)
                    .query(&[("on_conflict", on_conflict)])
                    .header("Prefer", "return=representation,resolution=merge-duplicates")
                    .json(body)
            })
            .await?;
        decode(response).await
    }

    /// Update filtered rows. Refuses to run without a filter.
    pub async fn update<B, T>(self, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require_filters("update")?;
        tracing::debug!("Updating {} {:?}", self.table, self.filters);

        let response = self
            .client
            .send(|token| {
                self.build(Method::PATCH, token)
                    .header("Prefer", "return=representation")
                    .json(body)
            })
            .await?;
        decode(response).await
    }

    /// Delete filtered rows. Refuses to run without a filter.
    pub async fn delete<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.require_filters("delete")?;
        tracing::debug!("Deleting from {} {:?}", self.table, self.filters);

        let response = self
            .client
            .send(|token| {
                self.build(Method::DELETE, token)
                    .header("Prefer", "return=representation")
            })
            .await?;
        decode(response).await
    }

    fn require_filters(&self, operation: &str) -> Result<()> {
        if self.filters.is_empty() {
            return Err(ZapError::Validation(format!(
                "Refusing to {} {} without a filter",
                operation, self.table
            )));
        }
        Ok(())
    }
}

fn parse_content_range_total(value: &HeaderValue) -> Option<u64> {
    value.to_str().ok()?.rsplit('/').next()?.parse().ok()
}
