//! Command gateway for the guild economy: HTTP API, configuration, logging,
//! metrics and background timers.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod scheduler;
