mod auth;
mod client;
pub mod types;

pub use client::{FEISHU_BASE_URL, LarkClient};

use crate::error::Result;
use crate::models::{FieldValue, Record};

use async_trait::async_trait;
use serde_json::Value;
use types::SheetMeta;

/// The Lark open platform operations this crate depends on.
///
/// [`LarkClient`] is the production implementation; tests substitute their
/// own.
#[async_trait]
pub trait LarkOperations {
    /// Request a tenant access token for the configured app.
    async fn tenant_access_token(&self) -> Result<String>;

    /// Create one record in a Bitable table.
    async fn create_record(
        &self,
        app_token: &str,
        table_id: &str,
        fields: &Record,
        access_token: &str,
    ) -> Result<Value>;

    /// Append rows of values to a spreadsheet range.
    async fn append_values(
        &self,
        spreadsheet_token: &str,
        range: &str,
        rows: Vec<Vec<FieldValue>>,
        access_token: &str,
    ) -> Result<Value>;

    /// List the sheets of a spreadsheet.
    async fn query_sheets(
        &self,
        spreadsheet_token: &str,
        access_token: &str,
    ) -> Result<Vec<SheetMeta>>;
}
