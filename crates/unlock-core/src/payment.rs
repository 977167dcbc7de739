use crate::error::{Result, UnlockError};
use crate::paths;
use crate::types::{PaymentMethod, PaymentStatus};
use crate::user::UserAccount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PaymentRequest
// ---------------------------------------------------------------------------

/// A manually-confirmed credit purchase. The customer sends crypto or a
/// Ko-fi donation and files the transaction reference; an operator confirms
/// or rejects it from the admin surface. Confirmation is the only path that
/// mints credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: String,
    pub user_id: String,
    pub method: PaymentMethod,
    /// Transaction hash, Ko-fi receipt id, or whatever the customer pasted.
    pub reference: String,
    pub amount_usd: f64,
    pub credits: u32,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PaymentRequest {
    pub fn create(
        root: &Path,
        user_id: &str,
        method: PaymentMethod,
        reference: impl Into<String>,
        amount_usd: f64,
        credits: u32,
    ) -> Result<Self> {
        // The user must exist before money is claimed against their account.
        UserAccount::load(root, user_id)?;

        let payment = Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            method,
            reference: reference.into(),
            amount_usd,
            credits,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };
        payment.save(root)?;
        Ok(payment)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::payment_path(root, id);
        if !path.exists() {
            return Err(UnlockError::PaymentNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::payment_path(root, &self.id), data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::PAYMENTS_DIR);
        let mut payments = Vec::new();
        if !dir.exists() {
            return Ok(payments);
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                payments.push(serde_yaml::from_str::<PaymentRequest>(&data)?);
            }
        }
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(payments)
    }

    // ---------------------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------------------

    /// Confirm the payment and credit the user. Resolving twice is an error,
    /// which is what keeps a double-confirm from minting credits twice.
    pub fn confirm(&mut self, root: &Path) -> Result<()> {
        if self.status.is_resolved() {
            return Err(UnlockError::PaymentAlreadyResolved(self.id.clone()));
        }
        let mut user = UserAccount::load(root, &self.user_id)?;
        user.grant_credits(self.credits);

        self.status = PaymentStatus::Confirmed;
        self.resolved_at = Some(Utc::now());
        self.save(root)?;
        user.save(root)?;
        Ok(())
    }

    pub fn reject(&mut self, root: &Path) -> Result<()> {
        if self.status.is_resolved() {
            return Err(UnlockError::PaymentAlreadyResolved(self.id.clone()));
        }
        self.status = PaymentStatus::Rejected;
        self.resolved_at = Some(Utc::now());
        self.save(root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_user() -> TempDir {
        let dir = TempDir::new().unwrap();
        UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        dir
    }

    #[test]
    fn confirm_credits_user_exactly_once() {
        let dir = with_user();
        let mut payment = PaymentRequest::create(
            dir.path(),
            "alice",
            PaymentMethod::Crypto,
            "0xdeadbeef",
            20.0,
            10,
        )
        .unwrap();

        payment.confirm(dir.path()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Confirmed);
        assert_eq!(UserAccount::load(dir.path(), "alice").unwrap().credits, 10);

        // Second confirm must not mint again.
        assert!(matches!(
            payment.confirm(dir.path()),
            Err(UnlockError::PaymentAlreadyResolved(_))
        ));
        assert_eq!(UserAccount::load(dir.path(), "alice").unwrap().credits, 10);
    }

    #[test]
    fn reject_grants_nothing() {
        let dir = with_user();
        let mut payment =
            PaymentRequest::create(dir.path(), "alice", PaymentMethod::Kofi, "kofi-123", 5.0, 3)
                .unwrap();
        payment.reject(dir.path()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Rejected);
        assert_eq!(UserAccount::load(dir.path(), "alice").unwrap().credits, 0);

        // A rejected payment cannot later be confirmed.
        assert!(payment.confirm(dir.path()).is_err());
    }

    #[test]
    fn create_requires_existing_user() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            PaymentRequest::create(dir.path(), "ghost", PaymentMethod::Crypto, "tx", 1.0, 1),
            Err(UnlockError::UserNotFound(_))
        ));
    }

    #[test]
    fn list_ordered_by_creation() {
        let dir = with_user();
        let first =
            PaymentRequest::create(dir.path(), "alice", PaymentMethod::Crypto, "tx-1", 1.0, 1)
                .unwrap();
        let second =
            PaymentRequest::create(dir.path(), "alice", PaymentMethod::Kofi, "tx-2", 2.0, 2)
                .unwrap();
        let list = PaymentRequest::list(dir.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, first.id);
        assert_eq!(list[1].id, second.id);
    }
}
