use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ProcessType
// ---------------------------------------------------------------------------

/// The two storefront services a registered device can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Unlock,
    Blacklist,
}

impl ProcessType {
    pub fn all() -> &'static [ProcessType] {
        &[ProcessType::Unlock, ProcessType::Blacklist]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessType::Unlock => "unlock",
            ProcessType::Blacklist => "blacklist",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessType {
    type Err = crate::error::UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unlock" => Ok(ProcessType::Unlock),
            "blacklist" => Ok(ProcessType::Blacklist),
            _ => Err(crate::error::UnlockError::InvalidProcessType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessPhase
// ---------------------------------------------------------------------------

/// Every run walks exactly two phases of four steps each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPhase {
    One,
    Two,
}

impl ProcessPhase {
    pub fn number(self) -> u8 {
        match self {
            ProcessPhase::One => 1,
            ProcessPhase::Two => 2,
        }
    }

    pub fn next(self) -> Option<ProcessPhase> {
        match self {
            ProcessPhase::One => Some(ProcessPhase::Two),
            ProcessPhase::Two => None,
        }
    }
}

impl fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// Terminal outcome recorded on a registered device after a run.
///
/// There is deliberately no success variant: the product flow always ends in
/// a scripted failure that routes the user toward a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Failed,
    Cancelled,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunOutcome::Failed => "failed",
            RunOutcome::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// IdentifierKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Imei,
    Serial,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierKind::Imei => "imei",
            IdentifierKind::Serial => "serial",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// PaymentMethod / PaymentStatus
// ---------------------------------------------------------------------------

/// Manual payment rails: a crypto transfer or a Ko-fi donation, both
/// confirmed by an operator rather than a payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Crypto,
    Kofi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Crypto => "crypto",
            PaymentMethod::Kofi => "kofi",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(PaymentMethod::Crypto),
            "kofi" | "ko-fi" => Ok(PaymentMethod::Kofi),
            _ => Err(crate::error::UnlockError::InvalidPaymentMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl PaymentStatus {
    pub fn is_resolved(self) -> bool {
        self != PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Ticket enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    UnlockComplaint,
    Billing,
    General,
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketKind::UnlockComplaint => "unlock_complaint",
            TicketKind::Billing => "billing",
            TicketKind::General => "general",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketPriority::Low => "low",
            TicketPriority::Normal => "normal",
            TicketPriority::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
