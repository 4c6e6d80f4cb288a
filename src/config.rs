use crate::error::{Result, SheetDbError};
use serde::{Deserialize, Serialize};

/// Selects which Lark backend an adapter writes to.
///
/// The variant is fixed when the adapter is constructed and never changes
/// for the lifetime of the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backend {
    Bitable(BitableTarget),
    Spreadsheet(SpreadsheetTarget),
}

/// A Bitable table, addressed by app token and table id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BitableTarget {
    pub app_id: String,
    pub app_secret: String,
    pub app_token: String,
    pub table_id: String,
}

/// A sheet range inside a spreadsheet, addressed by spreadsheet token.
///
/// `sheet_id` is passed through as the append range, e.g. a grid id or an
/// A1-style range such as `"Sheet1!A1"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpreadsheetTarget {
    pub app_id: String,
    pub app_secret: String,
    pub spreadsheet_token: String,
    pub sheet_id: String,
}

impl Backend {
    pub fn app_id(&self) -> &str {
        match self {
            Backend::Bitable(target) => &target.app_id,
            Backend::Spreadsheet(target) => &target.app_id,
        }
    }

    pub fn app_secret(&self) -> &str {
        match self {
            Backend::Bitable(target) => &target.app_secret,
            Backend::Spreadsheet(target) => &target.app_secret,
        }
    }

    /// Reject selectors with missing credential or identifier fields.
    ///
    /// Runs at adapter construction, before any network activity.
    pub(crate) fn validate(&self) -> Result<()> {
        let fields = match self {
            Backend::Bitable(target) => [
                ("app_id", target.app_id.as_str()),
                ("app_secret", target.app_secret.as_str()),
                ("app_token", target.app_token.as_str()),
                ("table_id", target.table_id.as_str()),
            ],
            Backend::Spreadsheet(target) => [
                ("app_id", target.app_id.as_str()),
                ("app_secret", target.app_secret.as_str()),
                ("spreadsheet_token", target.spreadsheet_token.as_str()),
                ("sheet_id", target.sheet_id.as_str()),
            ],
        };

        for (name, value) in fields {
            if value.is_empty() {
                return Err(SheetDbError::Config(format!("{} must be set", name)));
            }
        }

        Ok(())
    }
}
