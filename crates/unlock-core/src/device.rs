use crate::error::{Result, UnlockError};
use crate::paths;
use crate::types::{IdentifierKind, RunOutcome};
use crate::user::UserAccount;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static SERIAL_RE: OnceLock<Regex> = OnceLock::new();

fn serial_re() -> &'static Regex {
    SERIAL_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{8,20}$").unwrap())
}

/// Luhn check over a digit string. IMEIs carry a Luhn check digit in
/// position 15.
fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        let mut d = if i % 2 == 1 { d * 2 } else { d };
        if d > 9 {
            d -= 9;
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Classify an identifier as a valid IMEI or serial number.
///
/// 15 digits are treated as an IMEI and must pass the Luhn check; anything
/// else falls through to the serial pattern (8-20 alphanumeric). An
/// all-digit string of IMEI length with a bad check digit is rejected rather
/// than reinterpreted as a serial.
pub fn classify_identifier(identifier: &str) -> Result<IdentifierKind> {
    if identifier.len() == 15 && identifier.chars().all(|c| c.is_ascii_digit()) {
        if luhn_valid(identifier) {
            return Ok(IdentifierKind::Imei);
        }
        return Err(UnlockError::InvalidIdentifier(identifier.to_string()));
    }
    if serial_re().is_match(identifier) {
        return Ok(IdentifierKind::Serial);
    }
    Err(UnlockError::InvalidIdentifier(identifier.to_string()))
}

// ---------------------------------------------------------------------------
// CatalogDevice
// ---------------------------------------------------------------------------

/// Admin-managed catalog entry: a supported model and its service price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDevice {
    pub slug: String,
    pub brand: String,
    pub model: String,
    pub credit_cost: u32,
    pub created_at: DateTime<Utc>,
}

impl CatalogDevice {
    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        credit_cost: u32,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        if paths::catalog_path(root, &slug).exists() {
            return Err(UnlockError::CatalogExists(slug));
        }
        let device = Self {
            slug,
            brand: brand.into(),
            model: model.into(),
            credit_cost,
            created_at: Utc::now(),
        };
        device.save(root)?;
        Ok(device)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let path = paths::catalog_path(root, slug);
        if !path.exists() {
            return Err(UnlockError::CatalogNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::catalog_path(root, &self.slug), data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::CATALOG_DIR);
        let mut devices = Vec::new();
        if !dir.exists() {
            return Ok(devices);
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                devices.push(serde_yaml::from_str::<CatalogDevice>(&data)?);
            }
        }
        devices.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(devices)
    }
}

// ---------------------------------------------------------------------------
// RegisteredDevice
// ---------------------------------------------------------------------------

/// A customer's device, registered against a catalog entry. Registration is
/// the credit-deduction point: the catalog price is taken once, up front, and
/// later runs on the same device spend nothing further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredDevice {
    pub identifier: String,
    pub kind: IdentifierKind,
    pub user_id: String,
    pub catalog_slug: String,
    pub model: String,
    pub credits_spent: u32,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<RunOutcome>,
}

/// Enrich an IMEI registration from the configured lookup service, if any.
/// Lookup failures fall back to the catalog model; the service is an
/// enrichment, not a gate.
fn lookup_model(root: &Path, imei: &str) -> Option<String> {
    let lookup_cfg = crate::config::Config::load(root).ok()?.lookup?;
    let client = match crate::lookup::DeviceLookupClient::new(&lookup_cfg) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("device lookup unavailable: {e}");
            return None;
        }
    };
    match client.lookup(imei) {
        Ok(info) => Some(format!("{} {}", info.brand, info.model)),
        Err(e) => {
            tracing::warn!("device lookup failed for {imei}: {e}");
            None
        }
    }
}

impl RegisteredDevice {
    /// Register a device: validate the identifier, deduct the catalog price
    /// from the user, and persist both records.
    pub fn register(
        root: &Path,
        identifier: impl Into<String>,
        user_id: &str,
        catalog_slug: &str,
    ) -> Result<Self> {
        let identifier = identifier.into();
        let kind = classify_identifier(&identifier)?;
        if paths::device_path(root, &identifier).exists() {
            return Err(UnlockError::DeviceExists(identifier));
        }

        let catalog = CatalogDevice::load(root, catalog_slug)?;
        let mut user = UserAccount::load(root, user_id)?;
        user.deduct_credits(catalog.credit_cost)?;

        let model = if kind == IdentifierKind::Imei {
            lookup_model(root, &identifier).unwrap_or_else(|| catalog.model.clone())
        } else {
            catalog.model.clone()
        };

        let device = Self {
            identifier,
            kind,
            user_id: user_id.to_string(),
            catalog_slug: catalog.slug.clone(),
            model,
            credits_spent: catalog.credit_cost,
            registered_at: Utc::now(),
            last_outcome: None,
        };
        device.save(root)?;
        user.save(root)?;
        Ok(device)
    }

    pub fn load(root: &Path, identifier: &str) -> Result<Self> {
        let path = paths::device_path(root, identifier);
        if !path.exists() {
            return Err(UnlockError::DeviceNotFound(identifier.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::device_path(root, &self.identifier), data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::DEVICES_DIR);
        let mut devices = Vec::new();
        if !dir.exists() {
            return Ok(devices);
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                devices.push(serde_yaml::from_str::<RegisteredDevice>(&data)?);
            }
        }
        devices.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(devices)
    }

    pub fn record_outcome(&mut self, root: &Path, outcome: RunOutcome) -> Result<()> {
        self.last_outcome = Some(outcome);
        self.save(root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
