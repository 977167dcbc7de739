use crate::error::{Result, UnlockError};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// UserAccount
// ---------------------------------------------------------------------------

/// A storefront customer and their credit balance.
///
/// Authentication lives elsewhere; the id here is a slug chosen at creation
/// time and passed explicitly by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub credits: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn create(root: &Path, id: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let id = id.into();
        paths::validate_slug(&id)?;
        if paths::user_path(root, &id).exists() {
            return Err(UnlockError::UserExists(id));
        }
        let now = Utc::now();
        let user = Self {
            id,
            email: email.into(),
            credits: 0,
            created_at: now,
            updated_at: now,
        };
        user.save(root)?;
        Ok(user)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::user_path(root, id);
        if !path.exists() {
            return Err(UnlockError::UserNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::user_path(root, &self.id), data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::USERS_DIR);
        let mut users = Vec::new();
        if !dir.exists() {
            return Ok(users);
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                users.push(serde_yaml::from_str::<UserAccount>(&data)?);
            }
        }
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    // ---------------------------------------------------------------------------
    // Credit ledger
    // ---------------------------------------------------------------------------

    pub fn grant_credits(&mut self, amount: u32) {
        self.credits += amount;
        self.updated_at = Utc::now();
    }

    pub fn deduct_credits(&mut self, amount: u32) -> Result<()> {
        if self.credits < amount {
            return Err(UnlockError::InsufficientCredits {
                needed: amount,
                available: self.credits,
            });
        }
        self.credits -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
