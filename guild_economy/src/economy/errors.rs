//! Economy error types.

use crate::db::timeouts::TimeoutError;
use chrono::Duration;
use thiserror::Error;

/// Errors surfaced by every economy, market, game and settings operation.
///
/// All variants are reported back to the acting user. Only persistence faults
/// ([`EconomyError::Database`] and [`EconomyError::TransactionFailed`]) are
/// operator problems.
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Balance too low for the requested debit
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// Buyer already owns the property
    #[error("You cannot buy a property you already own")]
    SelfPurchase,

    /// The user already has a game in progress
    #[error("A game is already in progress")]
    SessionAlreadyActive,

    /// The user has no game in progress
    #[error("No game in progress")]
    NoActiveSession,

    /// Interest requires a minimum balance
    #[error("Balance {balance} is below the required minimum of {minimum}")]
    BelowMinimumBalance { balance: i64, minimum: i64 },

    /// A time-gated claim is not available yet
    #[error("Available again in {}", format_remaining(.remaining))]
    CooldownActive { remaining: Duration },

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Command not allowed in this channel, or caller lacks the role for it
    #[error("This command is not allowed here")]
    PermissionDenied,

    /// Persistence fault; the operation was rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl EconomyError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EconomyError::Database(_) | EconomyError::TransactionFailed(_) => "transaction_failed",
            EconomyError::InsufficientFunds { .. } => "insufficient_funds",
            EconomyError::SelfPurchase => "self_purchase",
            EconomyError::SessionAlreadyActive => "session_already_active",
            EconomyError::NoActiveSession => "no_active_session",
            EconomyError::BelowMinimumBalance { .. } => "below_minimum_balance",
            EconomyError::CooldownActive { .. } => "cooldown_active",
            EconomyError::InvalidAmount(_) => "invalid_amount",
            EconomyError::PermissionDenied => "permission_denied",
        }
    }

    /// Whether the error points at the persistence layer rather than user input.
    pub fn is_operator_fault(&self) -> bool {
        matches!(
            self,
            EconomyError::Database(_) | EconomyError::TransactionFailed(_)
        )
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized so SQL details never reach chat users.
    pub fn client_message(&self) -> String {
        match self {
            EconomyError::Database(_) | EconomyError::TransactionFailed(_) => {
                "The transaction could not be completed".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for EconomyError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Database(e) => EconomyError::Database(e),
            timeout @ TimeoutError::Timeout(_) => EconomyError::TransactionFailed(timeout.to_string()),
        }
    }
}

/// Renders a cooldown as `1h 02m 03s`, dropping leading zero units.
pub fn format_remaining(remaining: &Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// Log a failed operation. Persistence faults go to operators at error level;
/// user mistakes only at debug.
pub(crate) fn log_fault(operation: &str, user_id: i64, err: &EconomyError) {
    if err.is_operator_fault() {
        log::error!("{operation} failed for user {user_id}: {err}");
    } else {
        log::debug!("{operation} rejected for user {user_id}: {err}");
    }
}

/// Result type for economy operations
pub type EconomyResult<T> = Result<T, EconomyError>;
