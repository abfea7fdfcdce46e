//! Uniform query interface for tenant-scoped tables.
//!
//! Mirrors the data plane's filter syntax: every filter renders as `column=op.value`
//! query pairs, `select` picks columns, `order` and `limit` bound the result set.
//! Reads deserialize straight into the caller's row type.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{check_response, decode_json, PlatformClient};
use crate::error::{api::ApiError, Error};

pub struct TableQuery<'a> {
    client: &'a PlatformClient,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
    access_token: Option<String>,
}

impl<'a> TableQuery<'a> {
    pub(crate) fn new(client: &'a PlatformClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            access_token: None,
        }
    }

    /// Attach the caller's access token; tenant row policies are enforced server-side
    /// against it.
    pub fn bearer(mut self, access_token: &str) -> Self {
        self.access_token = Some(access_token.to_string());
        self
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Equality filter: `column = value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn endpoint(&self) -> String {
        format!("/rest/v1/{}", self.table)
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .http()
            .request(method, url)
            .header("apikey", self.client.api_key())
            .query(&self.query_pairs());

        // Anonymous reads still authenticate with the public key.
        request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request.bearer_auth(self.client.api_key()),
        };

        request
    }

    /// Fetch all rows matching the query.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let endpoint = self.endpoint();
        let url = self.client.endpoint(&endpoint);

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let response = check_response(&endpoint, response).await?;

        decode_json(&endpoint, response).await
    }

    /// Fetch exactly one row, failing with [`ApiError::RowNotFound`] when the filter
    /// matches nothing.
    pub async fn single<T: DeserializeOwned>(self) -> Result<T, Error> {
        let endpoint = self.endpoint();
        let url = self.client.endpoint(&endpoint);
        let table = self.table.clone();

        let response = self
            .request(reqwest::Method::GET, &url)
            .header("accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;

        // The data plane answers 406 when the filter doesn't match exactly one row.
        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Err(ApiError::RowNotFound { table }.into());
        }

        let response = check_response(&endpoint, response).await?;

        decode_json(&endpoint, response).await
    }

    /// Fetch at most one row, tolerating an empty result.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let mut rows: Vec<T> = self.limit(1).fetch().await?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(self, row: &T) -> Result<R, Error> {
        let endpoint = self.endpoint();
        let url = self.client.endpoint(&endpoint);
        let table = self.table.clone();

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let response = check_response(&endpoint, response).await?;
        let mut rows: Vec<R> = decode_json(&endpoint, response).await?;

        if rows.is_empty() {
            return Err(ApiError::RowNotFound { table }.into());
        }

        Ok(rows.swap_remove(0))
    }

    /// Patch all rows matching the current filters.
    pub async fn update<T: Serialize>(self, patch: &T) -> Result<(), Error> {
        let endpoint = self.endpoint();
        let url = self.client.endpoint(&endpoint);

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(patch)
            .send()
            .await?;

        check_response(&endpoint, response).await?;

        Ok(())
    }

    /// Delete all rows matching the current filters.
    pub async fn delete(self) -> Result<(), Error> {
        let endpoint = self.endpoint();
        let url = self.client.endpoint(&endpoint);

        let response = self.request(reqwest::Method::DELETE, &url).send().await?;

        check_response(&endpoint, response).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    mod query_pairs_tests {
        use crate::api::PlatformClient;

        #[test]
        /// Expect filters to render in the column=op.value form with bounds appended
        fn test_query_pair_rendering() {
            let client = PlatformClient::new("http://localhost", "anon-key").unwrap();
            let query = client
                .table("service_orders")
                .select("id,status")
                .eq("tenant_id", "t-1")
                .eq("status", "open")
                .order("created_at", true)
                .limit(50);

            let pairs = query.query_pairs();

            assert_eq!(
                pairs,
                vec![
                    ("select".to_string(), "id,status".to_string()),
                    ("tenant_id".to_string(), "eq.t-1".to_string()),
                    ("status".to_string(), "eq.open".to_string()),
                    ("order".to_string(), "created_at.desc".to_string()),
                    ("limit".to_string(), "50".to_string()),
                ]
            );
        }
    }
}
