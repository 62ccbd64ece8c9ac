//! The abstract persistence contract the engine depends on. The engine
//! never touches a database directly — every mutation goes through
//! `conditional_update` or an insert-if-absent, wrapped in a
//! `transaction`, with the relevant `advisory_lock` held first.
//!
//! `Tx` is a small dyn-safe trait object the engine is generic over, so
//! a hosting application can plug in a real database adapter without the
//! engine knowing anything about SQL or network I/O.

pub mod memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ids::{LeagueId, MatchupId, MemberId, PlayoffId, UserId};
use crate::model::{League, Matchup, Member, Playoff, WeeklyScore};

/// Failure modes surfaced by the store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("transient: {0}")]
    Transient(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

/// A cooperative cancellation flag, cloneable and shareable across
/// threads. A real Store implementation checks this between its own I/O
/// steps; `MemoryStore` has nothing to interrupt, so it only checks it
/// once, before running the closure.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Named advisory-lock scopes used by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockScope {
    FinalizeWeek(LeagueId, u32),
    Playoffs(LeagueId),
    PlayoffMatch(PlayoffId),
    Matchups(LeagueId),
}

/// A store handle capable of running transactions. Implementors provide
/// serializable-or-equivalent isolation: on failure, all mutations and
/// advisory locks taken inside `f` revert.
///
/// `transaction` is generic over the closure's error type rather than
/// fixed to `StoreError`, so callers above the Store Port (the Engine
/// façade, the component modules) can return their own richer error type
/// — e.g. `EngineError::Precondition` — from inside the same atomic
/// section that also makes Store Port calls, without a manual
/// `StoreError -> EngineError -> StoreError` round trip at every call
/// site. `E: From<StoreError>` is all that is required.
pub trait Store: Send + Sync {
    fn transaction<T, E: From<StoreError>>(
        &self,
        f: impl FnOnce(&dyn Tx) -> Result<T, E>,
    ) -> Result<T, E>;

    /// Runs `transaction`, but refuses to even start `f` if `token` is
    /// already cancelled. A hosting application checks a deadline and
    /// cancels the token rather than plumbing a `Duration` through every
    /// call site.
    fn transaction_cancellable<T, E: From<StoreError>>(
        &self,
        token: &CancellationToken,
        f: impl FnOnce(&dyn Tx) -> Result<T, E>,
    ) -> Result<T, E> {
        if token.is_cancelled() {
            return Err(E::from(StoreError::Transient("cancelled".into())));
        }
        self.transaction(f)
    }
}

/// The operations available inside one transaction. Guard/patch closures
/// are taken by reference so this trait stays object-safe.
pub trait Tx {
    fn advisory_lock(&self, scope: LockScope) -> Result<(), StoreError>;

    fn get_league(&self, id: LeagueId) -> Result<League, StoreError>;
    fn find_league_by_join_code(&self, code: &str) -> Result<Option<League>, StoreError>;
    fn insert_league(&self, league: League) -> Result<(), StoreError>;
    fn conditional_update_league(
        &self,
        id: LeagueId,
        guard: &dyn Fn(&League) -> bool,
        patch: &dyn Fn(&mut League),
    ) -> Result<bool, StoreError>;
    fn delete_league(&self, id: LeagueId) -> Result<(), StoreError>;

    fn get_member(&self, id: MemberId) -> Result<Member, StoreError>;
    fn list_members(&self, league: LeagueId) -> Result<Vec<Member>, StoreError>;
    fn find_member_by_user(
        &self,
        league: LeagueId,
        user: UserId,
    ) -> Result<Option<Member>, StoreError>;
    /// Returns `false` without inserting if a member for `(league, user)`
    /// already exists.
    fn insert_member_if_absent(&self, member: Member) -> Result<bool, StoreError>;
    fn conditional_update_member(
        &self,
        id: MemberId,
        guard: &dyn Fn(&Member) -> bool,
        patch: &dyn Fn(&mut Member),
    ) -> Result<bool, StoreError>;
    fn delete_member(&self, id: MemberId) -> Result<(), StoreError>;

    fn list_matchups(&self, league: LeagueId, week: u32) -> Result<Vec<Matchup>, StoreError>;
    /// Returns `false` without inserting if a matchup already exists for
    /// `(league, week, {p1,p2})` as an unordered pair.
    fn insert_matchup_if_absent(&self, matchup: Matchup) -> Result<bool, StoreError>;
    fn conditional_update_matchup(
        &self,
        id: MatchupId,
        guard: &dyn Fn(&Matchup) -> bool,
        patch: &dyn Fn(&mut Matchup),
    ) -> Result<bool, StoreError>;
    fn write_matchup(&self, id: MatchupId, patch: &dyn Fn(&mut Matchup)) -> Result<(), StoreError>;

    fn get_weekly_score(
        &self,
        league: LeagueId,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeeklyScore>, StoreError>;
    fn upsert_weekly_score(&self, score: WeeklyScore) -> Result<(), StoreError>;

    fn list_playoffs(&self, league: LeagueId) -> Result<Vec<Playoff>, StoreError>;
    fn get_playoff(&self, id: PlayoffId) -> Result<Playoff, StoreError>;
    /// Returns `false` without inserting if a row already exists for
    /// `(league, round, match_number)`.
    fn insert_playoff_if_absent(&self, playoff: Playoff) -> Result<bool, StoreError>;
    fn write_playoff(&self, id: PlayoffId, patch: &dyn Fn(&mut Playoff)) -> Result<(), StoreError>;
}
