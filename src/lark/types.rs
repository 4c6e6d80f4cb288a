use crate::models::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{code, msg}` envelope carried by Lark JSON responses.
#[derive(Debug)]
pub(super) struct ApiStatus {
    pub(super) code: i64,
    pub(super) msg: String,
}

impl ApiStatus {
    /// Read the envelope out of an already-parsed response body.
    pub(super) fn of(body: &Value) -> Self {
        ApiStatus {
            code: body.get("code").and_then(Value::as_i64).unwrap_or(-1),
            msg: body
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

// https://open.feishu.cn/document/server-docs/docs/bitable-v1/app-table-record/create
#[derive(Debug, Serialize)]
pub(super) struct CreateRecordRequest<'a> {
    pub(super) fields: &'a Record,
}

// https://open.feishu.cn/document/server-docs/docs/sheets-v3/data-operation/append-data
#[derive(Debug, Serialize)]
pub(super) struct AppendValuesRequest {
    #[serde(rename = "valueRange")]
    pub(super) value_range: ValueRange,
}

#[derive(Debug, Serialize)]
pub(super) struct ValueRange {
    pub(super) range: String,
    pub(super) values: Vec<Vec<FieldValue>>,
}

// https://open.feishu.cn/document/server-docs/docs/sheets-v3/spreadsheet-sheet/query
#[derive(Debug, Deserialize)]
pub(super) struct QuerySheetsResponse {
    pub(super) code: i64,
    #[serde(default)]
    pub(super) msg: String,
    #[serde(default)]
    pub(super) data: Option<SheetList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SheetList {
    #[serde(default)]
    pub(super) sheets: Vec<SheetMeta>,
}

/// Metadata for one sheet inside a spreadsheet.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SheetMeta {
    pub sheet_id: String,
    pub title: String,
    #[serde(default)]
    pub index: Option<i64>,
}
