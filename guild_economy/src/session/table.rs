//! Process-wide table of active blackjack sessions.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::Mutex;

use super::models::{GameSession, SessionView, SettleReason};
use crate::economy::{EconomyError, EconomyResult, UserId};

/// Result of acting on a session
#[derive(Debug)]
pub enum Step {
    /// The hand goes on
    InProgress(SessionView),
    /// The hand finished and the session was removed from the table
    Finished(Box<GameSession>, SettleReason),
}

/// At most one session per user. Entries go only into vacant slots and are
/// removed at the moment a hand finishes.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: Mutex<HashMap<UserId, GameSession>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session unless the user already has one.
    pub async fn try_insert(&self, session: GameSession) -> EconomyResult<SessionView> {
        let mut sessions = self.sessions.lock().await;
        match sessions.entry(session.user_id) {
            Entry::Occupied(_) => Err(EconomyError::SessionAlreadyActive),
            Entry::Vacant(slot) => Ok(slot.insert(session).view()),
        }
    }

    /// Run `action` against the user's active session.
    ///
    /// When `action` reports a finish, the session leaves the table before the
    /// lock is released, so no second action can reach it.
    pub async fn act<F>(&self, user_id: UserId, action: F) -> EconomyResult<Step>
    where
        F: FnOnce(&mut GameSession) -> Option<SettleReason>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&user_id)
            .filter(|session| session.is_active())
            .ok_or(EconomyError::NoActiveSession)?;

        match action(session) {
            None => Ok(Step::InProgress(session.view())),
            Some(reason) => {
                let session = sessions
                    .remove(&user_id)
                    .ok_or(EconomyError::NoActiveSession)?;
                Ok(Step::Finished(Box::new(session), reason))
            }
        }
    }

    pub async fn view(&self, user_id: UserId) -> Option<SessionView> {
        self.sessions.lock().await.get(&user_id).map(GameSession::view)
    }

    /// Remove and return every session started before `cutoff`.
    pub async fn remove_started_before(&self, cutoff: DateTime<Utc>) -> Vec<GameSession> {
        let mut sessions = self.sessions.lock().await;
        let stale: Vec<UserId> = sessions
            .values()
            .filter(|session| session.started_at < cutoff)
            .map(|session| session.user_id)
            .collect();
        stale
            .into_iter()
            .filter_map(|user_id| sessions.remove(&user_id))
            .collect()
    }

    pub async fn contains(&self, user_id: UserId) -> bool {
        self.sessions.lock().await.contains_key(&user_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
