//! Write structured records into Feishu/Lark spreadsheet backends behind a
//! single `insert` call.
//!
//! An application configures exactly one backend — a Bitable table
//! (record-oriented) or a Sheets spreadsheet (grid-oriented) — and hands
//! records to [`SheetDb::insert`]. The adapter fetches a tenant access token
//! lazily on the first write, caches it, and routes each record to the
//! backend-specific write path.
//!
//! ```no_run
//! use sheetdb::{Backend, Record, SheetDb, SpreadsheetTarget};
//!
//! # async fn run() -> sheetdb::Result<()> {
//! let mut db = SheetDb::new(Backend::Spreadsheet(SpreadsheetTarget {
//!     app_id: "cli_a1b2c3".into(),
//!     app_secret: "secret".into(),
//!     spreadsheet_token: "shtcnAbCdEf".into(),
//!     sheet_id: "Sheet1!A1".into(),
//! }))?;
//!
//! let mut record = Record::new();
//! record.insert("col1", "v1").insert("col2", 456);
//! db.insert(&record).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod db;
mod error;
mod lark;
mod models;

pub use config::{Backend, BitableTarget, SpreadsheetTarget};
pub use db::SheetDb;
pub use error::{Result, SheetDbError};
pub use lark::types::SheetMeta;
pub use lark::{FEISHU_BASE_URL, LarkClient, LarkOperations};
pub use models::{FieldValue, Record};
