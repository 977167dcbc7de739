use crate::device::RegisteredDevice;
use crate::error::{Result, UnlockError};
use crate::paths;
use crate::types::{TicketKind, TicketPriority, TicketStatus};
use crate::user::UserAccount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub kind: TicketKind,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        root: &Path,
        user_id: &str,
        kind: TicketKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TicketPriority,
        imei: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let user = UserAccount::load(root, user_id)?;
        let ticket = Self {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            user_email: user.email,
            kind,
            title: title.into(),
            description: description.into(),
            priority,
            imei,
            model,
            status: TicketStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        };
        ticket.save(root)?;
        Ok(ticket)
    }

    /// The outcome-presenter handoff: after a run ends in the scripted
    /// failure, the user files a complaint carrying the device identity.
    /// Always high priority, always `unlock_complaint`.
    pub fn file_complaint(
        root: &Path,
        identifier: &str,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let device = RegisteredDevice::load(root, identifier)?;
        Self::create(
            root,
            &device.user_id,
            TicketKind::UnlockComplaint,
            title,
            description,
            TicketPriority::High,
            Some(device.identifier.clone()),
            Some(device.model.clone()),
        )
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::ticket_path(root, id);
        if !path.exists() {
            return Err(UnlockError::TicketNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::ticket_path(root, &self.id), data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::TICKETS_DIR);
        let mut tickets = Vec::new();
        if !dir.exists() {
            return Ok(tickets);
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                tickets.push(serde_yaml::from_str::<Ticket>(&data)?);
            }
        }
        tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tickets)
    }

    pub fn close(&mut self, root: &Path) -> Result<()> {
        self.status = TicketStatus::Closed;
        self.closed_at = Some(Utc::now());
        self.save(root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::CatalogDevice;
    use tempfile::TempDir;

    const IMEI: &str = "356938035643809";

    fn with_registered_device() -> TempDir {
        let dir = TempDir::new().unwrap();
        CatalogDevice::create(dir.path(), "galaxy-s23", "Samsung", "Galaxy S23", 2).unwrap();
        let mut user = UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        user.grant_credits(5);
        user.save(dir.path()).unwrap();
        RegisteredDevice::register(dir.path(), IMEI, "alice", "galaxy-s23").unwrap();
        dir
    }

    #[test]
    fn complaint_carries_device_identity() {
        let dir = with_registered_device();
        let ticket = Ticket::file_complaint(
            dir.path(),
            IMEI,
            "Unlock failed",
            "The process ended in failure and no refund was offered.",
        )
        .unwrap();

        assert_eq!(ticket.kind, TicketKind::UnlockComplaint);
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.imei.as_deref(), Some(IMEI));
        assert_eq!(ticket.model.as_deref(), Some("Galaxy S23"));
        assert_eq!(ticket.user_email, "a@example.com");
        assert_eq!(ticket.status, TicketStatus::Open);
    }

    #[test]
    fn complaint_for_unknown_device_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Ticket::file_complaint(dir.path(), "490154203237518", "t", "d"),
            Err(UnlockError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn close_roundtrip() {
        let dir = with_registered_device();
        let mut ticket = Ticket::create(
            dir.path(),
            "alice",
            TicketKind::General,
            "Question",
            "Where are my credits?",
            TicketPriority::Normal,
            None,
            None,
        )
        .unwrap();
        ticket.close(dir.path()).unwrap();

        let loaded = Ticket::load(dir.path(), &ticket.id).unwrap();
        assert_eq!(loaded.status, TicketStatus::Closed);
        assert!(loaded.closed_at.is_some());
    }

    #[test]
    fn list_ordered_by_creation() {
        let dir = with_registered_device();
        let a = Ticket::file_complaint(dir.path(), IMEI, "first", "d").unwrap();
        let b = Ticket::file_complaint(dir.path(), IMEI, "second", "d").unwrap();
        let list = Ticket::list(dir.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
    }
}
