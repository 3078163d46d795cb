//! Blackjack sessions: the in-memory session table and the coordinator that
//! settles finished hands against the ledger.

pub mod coordinator;
pub mod models;
pub mod table;

pub use coordinator::BlackjackCoordinator;
pub use models::{
    GameSession, HitOutcome, SessionStatus, SessionView, SettleReason, Settlement,
};
pub use table::{SessionTable, Step};
