//! Pure ledger rules shared by every repository implementation.
//!
//! Repositories evaluate these while holding the account lock, so the check and
//! the write happen inside one transaction.

use super::{
    config::InterestPolicy,
    errors::{EconomyError, EconomyResult},
    models::{Commission, Payout, UserId},
};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};

/// Commission on game winnings, in basis points (2%)
pub const COMMISSION_BPS: i64 = 200;

/// Remaining hourly cooldown, or `None` when a reward may be granted.
///
/// A claim exactly `cooldown` after the previous one is allowed.
pub fn hourly_cooldown_remaining(
    last_claim: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<Duration> {
    let elapsed = now - last_claim?;
    if elapsed >= cooldown {
        None
    } else {
        Some(cooldown - elapsed)
    }
}

/// `balance * rate_bps / 10_000`, truncated toward zero.
pub fn interest_for(balance: i64, rate_bps: i64) -> i64 {
    let interest = i128::from(balance) * i128::from(rate_bps) / 10_000;
    i64::try_from(interest).unwrap_or(i64::MAX)
}

/// Decide whether daily interest can be paid right now.
///
/// Days are calendar days in the server's local time zone, so a claim at 23:59
/// and another at 00:01 are on different days.
pub fn check_interest(
    balance: i64,
    last_claim: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: &InterestPolicy,
) -> EconomyResult<i64> {
    check_interest_in(balance, last_claim, now.with_timezone(&Local), policy)
}

/// [`check_interest`] against an explicit time zone.
pub fn check_interest_in<Tz: TimeZone>(
    balance: i64,
    last_claim: Option<DateTime<Utc>>,
    now: DateTime<Tz>,
    policy: &InterestPolicy,
) -> EconomyResult<i64> {
    if balance < policy.min_balance {
        return Err(EconomyError::BelowMinimumBalance {
            balance,
            minimum: policy.min_balance,
        });
    }

    if let Some(last) = last_claim {
        let last_local = last.with_timezone(&now.timezone());
        if last_local.date_naive() == now.date_naive() {
            return Err(EconomyError::CooldownActive {
                remaining: until_next_midnight(&now),
            });
        }
    }

    Ok(interest_for(balance, policy.rate_bps))
}

/// Time left until the next local midnight.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0));
    let Some(next_midnight) = next_midnight else {
        return Duration::zero();
    };

    match now.timezone().from_local_datetime(&next_midnight).earliest() {
        Some(instant) => instant.signed_duration_since(now),
        // Midnight skipped by a DST change; fall back to wall-clock arithmetic
        None => next_midnight - now.naive_local(),
    }
}

/// Split positive winnings between the player and the guild's land owner.
///
/// Losses and pushes pass through untouched. A player who is the owner keeps
/// everything.
pub fn split_winnings(
    player_id: UserId,
    net: i64,
    owner: Option<UserId>,
) -> EconomyResult<Payout> {
    let commission = match owner {
        Some(owner_id) if net > 0 && owner_id != player_id => {
            let amount = i128::from(net) * i128::from(COMMISSION_BPS) / 10_000;
            let amount = i64::try_from(amount).map_err(|_| EconomyError::InvalidAmount(net))?;
            (amount > 0).then_some(Commission { owner_id, amount })
        }
        _ => None,
    };

    Ok(Payout {
        player_id,
        player_delta: net - commission.map_or(0, |c| c.amount),
        commission,
    })
}
