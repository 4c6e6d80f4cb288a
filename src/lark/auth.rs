use crate::error::{Result, SheetDbError};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct TenantTokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

// https://open.feishu.cn/document/server-docs/authentication-management/access-token/tenant_access_token_internal
#[derive(Debug, Deserialize)]
struct TenantTokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: Option<String>,
}

/// Request a tenant access token for an internal app.
///
/// The app credential pair travels in the request body; the token in the
/// response is valid for all subsequent write calls.
pub(super) async fn fetch_tenant_access_token(
    http: &reqwest::Client,
    base_url: &str,
    app_id: &str,
    app_secret: &str,
) -> Result<String> {
    let url = format!("{}/open-apis/auth/v3/tenant_access_token/internal", base_url);

    let response = http
        .post(&url)
        .json(&TenantTokenRequest { app_id, app_secret })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SheetDbError::Auth(format!(
            "Failed to get tenant access token: {} - {}",
            status, body
        )));
    }

    let token: TenantTokenResponse = response.json().await?;
    if token.code != 0 {
        return Err(SheetDbError::Auth(format!(
            "Failed to get tenant access token: {}",
            token.msg
        )));
    }

    debug!("Obtained tenant access token");

    token.tenant_access_token.ok_or_else(|| {
        SheetDbError::Auth("Token response missing tenant_access_token".to_string())
    })
}
