use crate::config::Backend;
use crate::error::{Result, SheetDbError};
use crate::lark::types::SheetMeta;
use crate::lark::{LarkClient, LarkOperations};
use crate::models::Record;
use serde_json::Value;
use tracing::{debug, error};

/// A handle to one Lark backend, holding the cached tenant access token.
///
/// Writes go through [`SheetDb::insert`], which authenticates lazily on the
/// first call and dispatches on the backend variant chosen at construction.
/// Token-touching operations take `&mut self`, so overlapping calls on a
/// single adapter cannot race the token fetch; to share an adapter between
/// tasks, wrap it in a mutex that serializes whole calls.
#[derive(Debug)]
pub struct SheetDb<C = LarkClient> {
    backend: Backend,
    client: C,
    tenant_access_token: String,
}

impl SheetDb<LarkClient> {
    /// Create an adapter for the given backend against the production host.
    ///
    /// Fails with [`SheetDbError::Config`] if a required field of the
    /// selector is missing. No network call is made.
    pub fn new(backend: Backend) -> Result<Self> {
        backend.validate()?;
        let client = LarkClient::new(backend.app_id(), backend.app_secret())?;
        Ok(Self {
            backend,
            client,
            tenant_access_token: String::new(),
        })
    }
}

impl<C> SheetDb<C>
where
    C: LarkOperations + Send + Sync,
{
    /// Create an adapter with a caller-supplied collaborator.
    pub fn with_client(backend: Backend, client: C) -> Result<Self> {
        backend.validate()?;
        Ok(Self {
            backend,
            client,
            tenant_access_token: String::new(),
        })
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Whether a tenant access token has been fetched.
    pub fn is_authenticated(&self) -> bool {
        !self.tenant_access_token.is_empty()
    }

    /// Fetch a tenant access token and cache it.
    ///
    /// Always re-fetches and overwrites the cached token; the short-circuit
    /// lives in [`SheetDb::insert`]. A failed fetch leaves the cached token
    /// unchanged.
    pub async fn authenticate(&mut self) -> Result<()> {
        self.tenant_access_token = self.client.tenant_access_token().await?;
        debug!("Cached tenant access token");
        Ok(())
    }

    /// Insert one record into the configured backend.
    ///
    /// Returns the backend's parsed JSON response unmodified. An empty
    /// record is permitted and appends an empty row on the spreadsheet
    /// backend.
    pub async fn insert(&mut self, record: &Record) -> Result<Value> {
        self.ensure_token().await?;

        match &self.backend {
            Backend::Bitable(target) => {
                let result = self
                    .client
                    .create_record(
                        &target.app_token,
                        &target.table_id,
                        record,
                        &self.tenant_access_token,
                    )
                    .await;
                if let Err(e) = &result {
                    error!(error = %e, "Bitable insert failed");
                }
                result
            }
            Backend::Spreadsheet(target) => {
                self.client
                    .append_values(
                        &target.spreadsheet_token,
                        &target.sheet_id,
                        vec![record.row()],
                        &self.tenant_access_token,
                    )
                    .await
            }
        }
    }

    /// Resolve a sheet title to its metadata.
    ///
    /// Useful for building a [`crate::SpreadsheetTarget`] when a sheet is
    /// known by title rather than by grid id. Only available on the
    /// spreadsheet backend; authenticates lazily like [`SheetDb::insert`].
    pub async fn lookup_sheet(&mut self, title: &str) -> Result<Option<SheetMeta>> {
        let Backend::Spreadsheet(target) = &self.backend else {
            return Err(SheetDbError::Config(
                "Sheet lookup requires a spreadsheet backend".to_string(),
            ));
        };
        let spreadsheet_token = target.spreadsheet_token.clone();

        self.ensure_token().await?;

        let sheets = self
            .client
            .query_sheets(&spreadsheet_token, &self.tenant_access_token)
            .await?;
        Ok(sheets.into_iter().find(|sheet| sheet.title == title))
    }

    /// Authenticate if no token is cached yet.
    async fn ensure_token(&mut self) -> Result<()> {
        if self.tenant_access_token.is_empty() {
            debug!("No tenant access token cached, authenticating");
            self.authenticate().await?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockLarkClient;
    use super::*;
    use crate::config::{BitableTarget, SpreadsheetTarget};
    use serde_json::json;

    fn bitable_backend() -> Backend {
        Backend::Bitable(BitableTarget {
            app_id: "cli_a1b2c3".to_string(),
            app_secret: "secret".to_string(),
            app_token: "bascnAbCdEf".to_string(),
            table_id: "tblXyZ".to_string(),
        })
    }

    fn spreadsheet_backend() -> Backend {
        Backend::Spreadsheet(SpreadsheetTarget {
            app_id: "cli_a1b2c3".to_string(),
            app_secret: "secret".to_string(),
            spreadsheet_token: "shtcnAbCdEf".to_string(),
            sheet_id: "Sheet1!A1".to_string(),
        })
    }

    #[tokio::test]
    async fn test_insert_authenticates_once_before_write() {
        let mock = MockLarkClient::with_token("t-1");
        let mut db = SheetDb::with_client(bitable_backend(), mock.clone()).unwrap();

        let mut record = Record::new();
        record.insert("name", "v");
        db.insert(&record).await.unwrap();

        assert_eq!(*mock.auth_calls.lock().unwrap(), 1);
        let created = mock.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].access_token, "t-1");
        assert_eq!(created[0].app_token, "bascnAbCdEf");
        assert_eq!(created[0].table_id, "tblXyZ");

        // A second insert reuses the cached token; the mock would panic if
        // another token were requested.
        drop(created);
        db.insert(&record).await.unwrap();
        assert_eq!(*mock.auth_calls.lock().unwrap(), 1);
        assert_eq!(mock.created.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_dispatches_to_spreadsheet() {
        let mock = MockLarkClient::with_token("t-1");
        let mut db = SheetDb::with_client(spreadsheet_backend(), mock.clone()).unwrap();

        let mut record = Record::new();
        record.insert("col1", "v1").insert("col2", 456);
        db.insert(&record).await.unwrap();

        let appended = mock.appended.lock().unwrap();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].spreadsheet_token, "shtcnAbCdEf");
        assert_eq!(appended[0].range, "Sheet1!A1");
        assert_eq!(appended[0].values, json!([["v1", 456]]));
        assert_eq!(appended[0].access_token, "t-1");
        assert!(mock.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_record_appends_empty_row() {
        let mock = MockLarkClient::with_token("t-1");
        let mut db = SheetDb::with_client(spreadsheet_backend(), mock.clone()).unwrap();

        db.insert(&Record::new()).await.unwrap();

        let appended = mock.appended.lock().unwrap();
        assert_eq!(appended[0].values, json!([[]]));
    }

    #[tokio::test]
    async fn test_authenticate_overwrites_token() {
        let mock = MockLarkClient::default();
        {
            let mut tokens = mock.tokens.lock().unwrap();
            tokens.push(Ok("t-1".to_string()));
            tokens.push(Ok("t-2".to_string()));
        }
        let mut db = SheetDb::with_client(bitable_backend(), mock.clone()).unwrap();

        db.authenticate().await.unwrap();
        assert_eq!(db.tenant_access_token, "t-1");

        db.authenticate().await.unwrap();
        assert_eq!(db.tenant_access_token, "t-2");
        assert_eq!(*mock.auth_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_auth_leaves_token_empty() {
        let mock = MockLarkClient::with_auth_failure("bad creds");
        let mut db = SheetDb::with_client(bitable_backend(), mock.clone()).unwrap();

        let mut record = Record::new();
        record.insert("name", "v");
        let err = db.insert(&record).await.unwrap_err();

        assert!(matches!(err, SheetDbError::Auth(_)));
        assert!(err.to_string().contains("bad creds"));
        assert!(!db.is_authenticated());
        // The write was never attempted.
        assert!(mock.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_propagates() {
        let mock = MockLarkClient {
            insert_error: Some("no such table".to_string()),
            ..MockLarkClient::with_token("t-1")
        };
        let mut db = SheetDb::with_client(bitable_backend(), mock).unwrap();

        let mut record = Record::new();
        record.insert("name", "v");
        let err = db.insert(&record).await.unwrap_err();

        assert!(matches!(err, SheetDbError::Insert(_)));
        assert!(err.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_lookup_sheet_resolves_title() {
        let mock = MockLarkClient {
            sheets: vec![
                SheetMeta {
                    sheet_id: "g1AbCd".to_string(),
                    title: "Data".to_string(),
                    index: Some(0),
                },
                SheetMeta {
                    sheet_id: "g2EfGh".to_string(),
                    title: "Archive".to_string(),
                    index: Some(1),
                },
            ],
            ..MockLarkClient::with_token("t-1")
        };
        let mut db = SheetDb::with_client(spreadsheet_backend(), mock).unwrap();

        let sheet = db.lookup_sheet("Archive").await.unwrap().unwrap();
        assert_eq!(sheet.sheet_id, "g2EfGh");

        assert!(db.lookup_sheet("Missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_sheet_rejects_bitable_backend() {
        let mock = MockLarkClient::with_token("t-1");
        let mut db = SheetDb::with_client(bitable_backend(), mock.clone()).unwrap();

        let err = db.lookup_sheet("Data").await.unwrap_err();
        assert!(matches!(err, SheetDbError::Config(_)));
        // Rejected before any authentication.
        assert_eq!(*mock.auth_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_rejected_at_construction() {
        let backend = Backend::Spreadsheet(SpreadsheetTarget {
            app_id: "cli_a1b2c3".to_string(),
            app_secret: String::new(),
            spreadsheet_token: "shtcnAbCdEf".to_string(),
            sheet_id: "Sheet1!A1".to_string(),
        });

        let err = SheetDb::with_client(backend, MockLarkClient::default()).unwrap_err();
        assert!(matches!(err, SheetDbError::Config(_)));
        assert!(err.to_string().contains("app_secret"));
    }
}
