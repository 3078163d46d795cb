//! # Guild Economy
//!
//! A virtual economy engine for multi-guild chat communities.
//!
//! Users hold one balance across every guild. Inside a guild they can buy
//! locations on a land market whose prices rise 1.2x with every change of
//! hands, and play blackjack or odd/even dice against that balance. The owner
//! of a guild's first location collects a 2% commission on blackjack winnings
//! there.
//!
//! ## Core Modules
//!
//! - [`economy`]: Ledger operations, hourly rewards and daily interest
//! - [`market`]: Land acquisition and ownership queries
//! - [`game`]: Cards, blackjack scoring and dice
//! - [`session`]: Blackjack session table and coordinator
//! - [`guild`]: Per-guild settings and the daily reminder schedule
//! - [`db`]: Repository traits with PostgreSQL and in-memory backends
//!
//! ## Example
//!
//! ```
//! use guild_economy::{EconomyEngine, SystemClock, economy::EconomyConfig};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), guild_economy::EconomyError> {
//! let engine = EconomyEngine::in_memory(Arc::new(SystemClock), EconomyConfig::default());
//! engine.economy.grant(1, 5_000).await?;
//! let receipt = engine.economy.transfer(1, 2, 1_500).await?;
//! assert_eq!(receipt.receiver_balance, 1_500);
//! # Ok(())
//! # }
//! ```

/// Injectable time sources.
pub mod clock;
/// Persistence layer.
pub mod db;
/// Ledger service.
pub mod economy;
/// Service wiring.
pub mod engine;
/// Pure game logic.
pub mod game;
/// Guild configuration.
pub mod guild;
/// Land market.
pub mod market;
/// Blackjack sessions.
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use economy::{EconomyError, EconomyResult};
pub use engine::EconomyEngine;
