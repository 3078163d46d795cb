//! Integration tests for the ledger: transfers, time-gated rewards and admin
//! adjustments over the in-memory repository.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use guild_economy::{
    EconomyEngine, EconomyError, ManualClock,
    db::MemoryRepository,
    economy::{EconomyConfig, EconomyManager},
};
use std::sync::Arc;

/// Local noon, so short clock advances never cross midnight
fn local_noon() -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

fn setup() -> (EconomyManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(local_noon()));
    let engine = EconomyEngine::in_memory(clock.clone(), EconomyConfig::default());
    (engine.economy, clock)
}

#[tokio::test]
async fn test_new_account_starts_at_zero() {
    let (economy, _) = setup();
    assert_eq!(economy.get_balance(42).await.unwrap(), 0);

    let account = economy.account(42).await.unwrap();
    assert_eq!(account.balance, 0);
    assert!(account.last_hourly_at.is_none());
    assert!(account.last_interest_at.is_none());
}

#[tokio::test]
async fn test_transfer_conserves_money() {
    let (economy, _) = setup();
    economy.grant(1, 10_000).await.unwrap();
    economy.grant(2, 3_000).await.unwrap();

    let receipt = economy.transfer(1, 2, 4_000).await.unwrap();
    assert_eq!(receipt.sender_balance, 6_000);
    assert_eq!(receipt.receiver_balance, 7_000);

    let total = economy.get_balance(1).await.unwrap() + economy.get_balance(2).await.unwrap();
    assert_eq!(total, 13_000);
}

#[tokio::test]
async fn test_transfer_of_entire_balance() {
    let (economy, _) = setup();
    economy.grant(1, 500).await.unwrap();

    let receipt = economy.transfer(1, 2, 500).await.unwrap();
    assert_eq!(receipt.sender_balance, 0);
    assert_eq!(receipt.receiver_balance, 500);
}

#[tokio::test]
async fn test_transfer_rejections_leave_balances_untouched() {
    let (economy, _) = setup();
    economy.grant(1, 1_000).await.unwrap();

    let result = economy.transfer(1, 2, 1_001).await;
    assert!(matches!(
        result,
        Err(EconomyError::InsufficientFunds {
            available: 1_000,
            required: 1_001
        })
    ));

    for amount in [0, -50] {
        let result = economy.transfer(1, 2, amount).await;
        assert!(matches!(result, Err(EconomyError::InvalidAmount(a)) if a == amount));
    }

    assert_eq!(economy.get_balance(1).await.unwrap(), 1_000);
    assert_eq!(economy.get_balance(2).await.unwrap(), 0);
}

#[tokio::test]
async fn test_self_transfer_keeps_balance() {
    let (economy, _) = setup();
    economy.grant(1, 700).await.unwrap();

    let receipt = economy.transfer(1, 1, 300).await.unwrap();
    assert_eq!(receipt.sender_balance, 700);
    assert_eq!(receipt.receiver_balance, 700);
}

#[tokio::test]
async fn test_hourly_reward_cooldown_boundary() {
    let (economy, clock) = setup();

    let first = economy.claim_hourly_reward(1).await.unwrap();
    assert!((1_000..=5_000).contains(&first.amount));
    assert_eq!(first.balance, first.amount);

    clock.advance(Duration::seconds(3_599));
    match economy.claim_hourly_reward(1).await {
        Err(EconomyError::CooldownActive { remaining }) => {
            assert_eq!(remaining, Duration::seconds(1));
        }
        other => panic!("expected cooldown, got {other:?}"),
    }

    clock.advance(Duration::seconds(1));
    let second = economy.claim_hourly_reward(1).await.unwrap();
    assert_eq!(second.balance, first.amount + second.amount);
}

#[tokio::test]
async fn test_hourly_reward_respects_configured_range() {
    let clock = Arc::new(ManualClock::new(local_noon()));
    let config = EconomyConfig {
        hourly_reward_min: 250,
        hourly_reward_max: 250,
        ..EconomyConfig::default()
    };
    let engine = EconomyEngine::in_memory(clock, config);

    let reward = engine.economy.claim_hourly_reward(5).await.unwrap();
    assert_eq!(reward.amount, 250);
}

#[tokio::test]
async fn test_interest_once_per_local_day() {
    let (economy, clock) = setup();
    economy.grant(1, 20_000).await.unwrap();

    let reward = economy.claim_daily_interest(1).await.unwrap();
    assert_eq!(reward.interest, 1_500);
    assert_eq!(reward.balance, 21_500);

    clock.advance(Duration::hours(2));
    assert!(matches!(
        economy.claim_daily_interest(1).await,
        Err(EconomyError::CooldownActive { .. })
    ));

    // Next local day
    clock.advance(Duration::hours(12));
    let reward = economy.claim_daily_interest(1).await.unwrap();
    assert_eq!(reward.interest, 21_500 * 750 / 10_000);
}

#[tokio::test]
async fn test_interest_requires_minimum_balance() {
    let (economy, _) = setup();
    economy.grant(1, 9_999).await.unwrap();

    let result = economy.claim_daily_interest(1).await;
    assert!(matches!(
        result,
        Err(EconomyError::BelowMinimumBalance {
            balance: 9_999,
            minimum: 10_000
        })
    ));

    // A rejected claim does not consume the day
    economy.grant(1, 1).await.unwrap();
    let reward = economy.claim_daily_interest(1).await.unwrap();
    assert_eq!(reward.interest, 750);
}

#[tokio::test]
async fn test_fine_may_drive_balance_negative() {
    let (economy, _) = setup();
    economy.grant(1, 100).await.unwrap();

    assert_eq!(economy.fine(1, 250).await.unwrap(), -150);
    assert!(matches!(
        economy.fine(1, 0).await,
        Err(EconomyError::InvalidAmount(0))
    ));
    assert!(matches!(
        economy.grant(1, -5).await,
        Err(EconomyError::InvalidAmount(-5))
    ));
}

#[tokio::test]
async fn test_storage_fault_rolls_back_transfer() {
    let clock = Arc::new(ManualClock::new(local_noon()));
    let repository = Arc::new(MemoryRepository::new());
    let engine = EconomyEngine::with_repository(repository.clone(), clock, EconomyConfig::default());
    engine.economy.grant(1, 1_000).await.unwrap();

    repository.inject_fault(1).await;
    let result = engine.economy.transfer(1, 2, 400).await;
    assert!(matches!(result, Err(EconomyError::TransactionFailed(_))));

    assert_eq!(engine.economy.get_balance(1).await.unwrap(), 1_000);
    assert_eq!(engine.economy.get_balance(2).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_transfers_never_overdraw() {
    let (economy, _) = setup();
    economy.grant(1, 1_000).await.unwrap();

    let mut handles = Vec::new();
    for receiver in 2..12 {
        let economy = economy.clone();
        handles.push(tokio::spawn(async move {
            economy.transfer(1, receiver, 300).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(economy.get_balance(1).await.unwrap(), 100);
}
