use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnlockError {
    #[error("not initialized: run 'unlockhub init'")]
    NotInitialized,

    #[error("catalog entry not found: {0}")]
    CatalogNotFound(String),

    #[error("catalog entry already exists: {0}")]
    CatalogExists(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device already registered: {0}")]
    DeviceExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("payment request not found: {0}")]
    PaymentNotFound(String),

    #[error("payment request {0} is already resolved")]
    PaymentAlreadyResolved(String),

    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid device identifier '{0}': expected a 15-digit IMEI or an 8-20 character serial")]
    InvalidIdentifier(String),

    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u32, available: u32 },

    #[error("invalid timing config: {0}")]
    InvalidTimingConfig(String),

    #[error("processing is disabled in the timing config")]
    TimingDisabled,

    #[error("invalid process type: {0}")]
    InvalidProcessType(String),

    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("device lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UnlockError>;
