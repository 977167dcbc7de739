use crate::config::LookupConfig;
use crate::error::{Result, UnlockError};
use serde::Deserialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// DeviceLookupClient
// ---------------------------------------------------------------------------

/// Response shape of the third-party IMEI lookup service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LookupInfo {
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub blacklisted: bool,
}

/// Blocking HTTP client for `GET {base_url}/imei/{imei}`.
///
/// Callers on an async runtime go through `spawn_blocking`; the lookup is a
/// single small request on the registration path, not a hot loop.
pub struct DeviceLookupClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DeviceLookupClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| UnlockError::Lookup(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn lookup(&self, imei: &str) -> Result<LookupInfo> {
        let url = format!("{}/imei/{imei}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| UnlockError::Lookup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnlockError::Lookup(format!(
                "lookup service returned {status} for {imei}"
            )));
        }
        response
            .json::<LookupInfo>()
            .map_err(|e| UnlockError::Lookup(format!("bad lookup response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
