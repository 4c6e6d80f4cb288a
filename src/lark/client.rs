use super::LarkOperations;
use super::auth::fetch_tenant_access_token;
use super::types::{
    ApiStatus, AppendValuesRequest, CreateRecordRequest, QuerySheetsResponse, SheetMeta,
    ValueRange,
};
use crate::error::{Result, SheetDbError};
use crate::models::{FieldValue, Record};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::instrument;
use url::Url;

/// Production host of the Lark open platform.
pub const FEISHU_BASE_URL: &str = "https://open.feishu.cn";

#[derive(Debug)]
pub struct LarkClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl LarkClient {
    /// Create a client against the production Feishu host.
    pub fn new(app_id: &str, app_secret: &str) -> Result<Self> {
        Self::with_base_url(app_id, app_secret, FEISHU_BASE_URL)
    }

    /// Create a client against a different host, e.g. a test server.
    pub fn with_base_url(app_id: &str, app_secret: &str, base_url: &str) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| SheetDbError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        // No idle connections are kept, so every call uses a connection
        // scoped to its own request/response cycle.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| SheetDbError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
        })
    }
}

#[async_trait]
impl LarkOperations for LarkClient {
    #[instrument(name = "Fetching tenant access token", skip_all)]
    async fn tenant_access_token(&self) -> Result<String> {
        fetch_tenant_access_token(&self.http, &self.base_url, &self.app_id, &self.app_secret).await
    }

    #[instrument(name = "Creating Bitable record", skip_all, fields(table_id = %table_id))]
    async fn create_record(
        &self,
        app_token: &str,
        table_id: &str,
        fields: &Record,
        access_token: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/open-apis/bitable/v1/apps/{}/tables/{}/records",
            self.base_url, app_token, table_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&CreateRecordRequest { fields })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetDbError::Insert(format!(
                "Failed to insert into Bitable: {} - {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        let status = ApiStatus::of(&body);
        if status.code != 0 {
            return Err(SheetDbError::Insert(format!(
                "Failed to insert into Bitable: {}",
                status.msg
            )));
        }

        Ok(body)
    }

    #[instrument(name = "Appending spreadsheet values", skip_all, fields(range = %range))]
    async fn append_values(
        &self,
        spreadsheet_token: &str,
        range: &str,
        rows: Vec<Vec<FieldValue>>,
        access_token: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/open-apis/sheets/v2/spreadsheets/{}/values_append",
            self.base_url, spreadsheet_token
        );

        let request = AppendValuesRequest {
            value_range: ValueRange {
                range: range.to_string(),
                values: rows,
            },
        };

        let response = self
            .http
            .post(&url)
            .query(&[("insertDataOption", "OVERWRITE")])
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;

        // The append endpoint signals failure through the HTTP status alone.
        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetDbError::Insert(format!(
                "Failed to insert into spreadsheet: {} - {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    #[instrument(name = "Querying spreadsheet sheets", skip_all)]
    async fn query_sheets(
        &self,
        spreadsheet_token: &str,
        access_token: &str,
    ) -> Result<Vec<SheetMeta>> {
        let url = format!(
            "{}/open-apis/sheets/v3/spreadsheets/{}/sheets/query",
            self.base_url, spreadsheet_token
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetDbError::Api(format!(
                "Failed to query sheets: {} - {}",
                status, body
            )));
        }

        let parsed: QuerySheetsResponse = response.json().await?;
        if parsed.code != 0 {
            return Err(SheetDbError::Api(format!(
                "Failed to query sheets: {}",
                parsed.msg
            )));
        }

        Ok(parsed.data.map(|data| data.sheets).unwrap_or_default())
    }
}
