//! Wiring of every service over one storage backend.

use std::{sync::Arc, time::Duration};

use crate::{
    clock::Clock,
    db::{
        Database, GuildSettingsRepository, LedgerRepository, MemoryRepository,
        PgEconomyRepository, PropertyRepository,
    },
    economy::{EconomyConfig, EconomyManager},
    guild::GuildSettingsManager,
    market::MarketManager,
    session::{BlackjackCoordinator, SessionTable},
};

/// All economy services sharing one repository, one clock and one session table
#[derive(Clone)]
pub struct EconomyEngine {
    pub economy: EconomyManager,
    pub market: MarketManager,
    pub blackjack: BlackjackCoordinator,
    pub guilds: GuildSettingsManager,
}

impl EconomyEngine {
    /// Build the services over any repository implementing all three traits
    pub fn with_repository<R>(repository: Arc<R>, clock: Arc<dyn Clock>, config: EconomyConfig) -> Self
    where
        R: LedgerRepository + PropertyRepository + GuildSettingsRepository + 'static,
    {
        let base_price = config.base_land_price;
        let economy = EconomyManager::new(repository.clone(), clock.clone(), config);
        let market = MarketManager::new(repository.clone(), clock.clone(), base_price);
        let blackjack = BlackjackCoordinator::new(
            economy.clone(),
            market.clone(),
            Arc::new(SessionTable::new()),
            clock,
        );
        let guilds = GuildSettingsManager::new(repository);

        Self {
            economy,
            market,
            blackjack,
            guilds,
        }
    }

    /// Engine over process memory; state is lost on exit
    pub fn in_memory(clock: Arc<dyn Clock>, config: EconomyConfig) -> Self {
        Self::with_repository(Arc::new(MemoryRepository::new()), clock, config)
    }

    /// Engine over PostgreSQL; each ledger or registry transaction must finish
    /// within `transaction_timeout`
    pub fn postgres(
        db: &Database,
        clock: Arc<dyn Clock>,
        config: EconomyConfig,
        transaction_timeout: Duration,
    ) -> Self {
        let repository = PgEconomyRepository::new(Arc::new(db.pool().clone()))
            .with_transaction_timeout(transaction_timeout);
        Self::with_repository(Arc::new(repository), clock, config)
    }
}
