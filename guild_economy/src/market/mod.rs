//! Land marketplace: per-guild locations with escalating prices.

pub mod manager;
pub mod models;
pub mod rules;

pub use manager::{DEFAULT_RANKING_LIMIT, MarketManager};
pub use models::{
    Acquisition, AcquisitionRequest, Holdings, LocationId, OwnerRanking, Property, PropertyQuote,
    PropertyTransfer, TransferKind,
};
