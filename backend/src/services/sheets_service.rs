use crate::config::SheetsConfig;
use crate::error::ProviderError;
use crate::services::providers::AppendOnlyLogSink;
use crate::services::youtube_service::{parse_base_url, read_json};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Appends rows to one fixed range of a Google spreadsheet using a service account.
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
    encoding_key: EncodingKey,
    append_url: Url,
    token: Mutex<Option<AccessToken>>,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, ProviderError> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|e| ProviderError::Auth(format!("invalid service account key: {e}")))?;
        let append_url = append_url(&config.api_url, &config.spreadsheet_id, &config.range)?;

        Ok(SheetsClient {
            client: Client::builder().timeout(config.timeout).build()?,
            config,
            encoding_key,
            append_url,
            token: Mutex::new(None),
        })
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, ProviderError> {
        let claims = service_account_claims(&self.config, now);
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| ProviderError::Auth(format!("failed to sign assertion: {e}")))
    }

    /// The cache lock is only held to read or store a token, never across the
    /// exchange, so a slow token endpoint does not stall concurrent runs.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let now = Utc::now();
        if let Some(token) = self.cached_token(now).await {
            return Ok(token);
        }

        debug!("Requesting Sheets access token for {}", self.config.client_email);
        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let body = read_json(response)
            .await
            .map_err(|e| ProviderError::Auth(format!("token exchange failed: {e}")))?;
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::Auth(format!("unexpected token response: {e}")))?;

        let fresh = AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        };
        *self.token.lock().await = Some(fresh.clone());
        Ok(fresh.value)
    }

    async fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.token
            .lock()
            .await
            .as_ref()
            .filter(|t| t.is_fresh(now))
            .map(|t| t.value.clone())
    }
}

fn service_account_claims(config: &SheetsConfig, now: DateTime<Utc>) -> Claims {
    let iat = now.timestamp();
    Claims {
        iss: config.client_email.clone(),
        scope: SPREADSHEETS_SCOPE.to_string(),
        aud: config.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    }
}

// Documentation: https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/append
fn append_url(api_url: &str, spreadsheet_id: &str, range: &str) -> Result<Url, ProviderError> {
    let mut url = parse_base_url(api_url)?;
    let target = format!("{range}:append");
    url.path_segments_mut()
        .map_err(|_| ProviderError::Malformed(format!("invalid sheets url {api_url}")))?
        .pop_if_empty()
        .extend(["spreadsheets", spreadsheet_id, "values", target.as_str()]);
    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED");
    Ok(url)
}

#[async_trait]
impl AppendOnlyLogSink for SheetsClient {
    async fn append_row(&self, values: Vec<Value>) -> Result<(), ProviderError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(self.append_url.clone())
            .bearer_auth(token)
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        let body = read_json(response).await?;

        info!(
            "Appended row to {}",
            body["updates"]["updatedRange"]
                .as_str()
                .unwrap_or(&self.config.range)
        );
        Ok(())
    }
}
