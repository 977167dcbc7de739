use crate::error::{Result, UnlockError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STORE_DIR: &str = ".unlockhub";
pub const CATALOG_DIR: &str = ".unlockhub/catalog";
pub const DEVICES_DIR: &str = ".unlockhub/devices";
pub const USERS_DIR: &str = ".unlockhub/users";
pub const PAYMENTS_DIR: &str = ".unlockhub/payments";
pub const TICKETS_DIR: &str = ".unlockhub/tickets";

pub const CONFIG_FILE: &str = ".unlockhub/config.yaml";
pub const TIMING_FILE: &str = ".unlockhub/timing.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn store_dir(root: &Path) -> PathBuf {
    root.join(STORE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn timing_path(root: &Path) -> PathBuf {
    root.join(TIMING_FILE)
}

pub fn catalog_path(root: &Path, slug: &str) -> PathBuf {
    root.join(CATALOG_DIR).join(format!("{slug}.yaml"))
}

pub fn device_path(root: &Path, identifier: &str) -> PathBuf {
    root.join(DEVICES_DIR).join(format!("{identifier}.yaml"))
}

pub fn user_path(root: &Path, id: &str) -> PathBuf {
    root.join(USERS_DIR).join(format!("{id}.yaml"))
}

pub fn payment_path(root: &Path, id: &str) -> PathBuf {
    root.join(PAYMENTS_DIR).join(format!("{id}.yaml"))
}

pub fn ticket_path(root: &Path, id: &str) -> PathBuf {
    root.join(TICKETS_DIR).join(format!("{id}.yaml"))
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(UnlockError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
