//! An in-memory `Store` implementation. Ships in the library (not
//! `cfg(test)`-gated) so the engine is exercisable without a real
//! database.
//!
//! The whole store is guarded by one `Mutex`, so `transaction` already
//! gives exclusive access for its duration; `advisory_lock` is a no-op
//! here. A real backend (Postgres, etc.) would implement per-scope
//! locking independently — this double exists to exercise the guard and
//! latch logic, not to demonstrate true cross-process concurrency.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ids::{LeagueId, MatchupId, MemberId, PlayoffId, UserId, WeeklyScoreId};
use crate::model::{League, Matchup, Member, Playoff, WeeklyScore};

use super::{LockScope, Store, StoreError, Tx};

#[derive(Default)]
struct Tables {
    leagues: HashMap<LeagueId, League>,
    members: HashMap<MemberId, Member>,
    matchups: HashMap<MatchupId, Matchup>,
    weekly_scores: HashMap<WeeklyScoreId, WeeklyScore>,
    playoffs: HashMap<PlayoffId, Playoff>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl Store for MemoryStore {
    fn transaction<T, E: From<StoreError>>(
        &self,
        f: impl FnOnce(&dyn Tx) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| E::from(StoreError::Transient("store mutex poisoned".into())))?;
        let tx = MemoryTx {
            tables: RefCell::new(&mut guard),
        };
        f(&tx)
    }
}

struct MemoryTx<'a> {
    tables: RefCell<&'a mut Tables>,
}

impl<'a> Tx for MemoryTx<'a> {
    fn advisory_lock(&self, _scope: LockScope) -> Result<(), StoreError> {
        Ok(())
    }

    fn get_league(&self, id: LeagueId) -> Result<League, StoreError> {
        self.tables
            .borrow()
            .leagues
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("league {id}")))
    }

    fn find_league_by_join_code(&self, code: &str) -> Result<Option<League>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .leagues
            .values()
            .find(|l| l.join_code == code)
            .cloned())
    }

    fn insert_league(&self, league: League) -> Result<(), StoreError> {
        self.tables.borrow_mut().leagues.insert(league.id, league);
        Ok(())
    }

    fn conditional_update_league(
        &self,
        id: LeagueId,
        guard: &dyn Fn(&League) -> bool,
        patch: &dyn Fn(&mut League),
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let league = tables
            .leagues
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("league {id}")))?;
        if !guard(league) {
            return Ok(false);
        }
        patch(league);
        Ok(true)
    }

    fn delete_league(&self, id: LeagueId) -> Result<(), StoreError> {
        let mut tables = self.tables.borrow_mut();
        tables.leagues.remove(&id);
        tables.members.retain(|_, m| m.league != id);
        tables.matchups.retain(|_, m| m.league != id);
        tables.weekly_scores.retain(|_, s| s.league != id);
        tables.playoffs.retain(|_, p| p.league != id);
        Ok(())
    }

    fn get_member(&self, id: MemberId) -> Result<Member, StoreError> {
        self.tables
            .borrow()
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("member {id}")))
    }

    fn list_members(&self, league: LeagueId) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .members
            .values()
            .filter(|m| m.league == league)
            .cloned()
            .collect())
    }

    fn find_member_by_user(
        &self,
        league: LeagueId,
        user: UserId,
    ) -> Result<Option<Member>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .members
            .values()
            .find(|m| m.league == league && m.user == user)
            .cloned())
    }

    fn insert_member_if_absent(&self, member: Member) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let exists = tables
            .members
            .values()
            .any(|m| m.league == member.league && m.user == member.user);
        if exists {
            return Ok(false);
        }
        tables.members.insert(member.id, member);
        Ok(true)
    }

    fn conditional_update_member(
        &self,
        id: MemberId,
        guard: &dyn Fn(&Member) -> bool,
        patch: &dyn Fn(&mut Member),
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let member = tables
            .members
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("member {id}")))?;
        if !guard(member) {
            return Ok(false);
        }
        patch(member);
        Ok(true)
    }

    fn delete_member(&self, id: MemberId) -> Result<(), StoreError> {
        self.tables.borrow_mut().members.remove(&id);
        Ok(())
    }

    fn list_matchups(&self, league: LeagueId, week: u32) -> Result<Vec<Matchup>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .matchups
            .values()
            .filter(|m| m.league == league && m.week == week)
            .cloned()
            .collect())
    }

    fn insert_matchup_if_absent(&self, matchup: Matchup) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let key = matchup.pair_key();
        let exists = tables
            .matchups
            .values()
            .any(|m| m.league == matchup.league && m.week == matchup.week && m.pair_key() == key);
        if exists {
            return Ok(false);
        }
        tables.matchups.insert(matchup.id, matchup);
        Ok(true)
    }

    fn conditional_update_matchup(
        &self,
        id: MatchupId,
        guard: &dyn Fn(&Matchup) -> bool,
        patch: &dyn Fn(&mut Matchup),
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let matchup = tables
            .matchups
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("matchup {id}")))?;
        if !guard(matchup) {
            return Ok(false);
        }
        patch(matchup);
        Ok(true)
    }

    fn write_matchup(&self, id: MatchupId, patch: &dyn Fn(&mut Matchup)) -> Result<(), StoreError> {
        let mut tables = self.tables.borrow_mut();
        let matchup = tables
            .matchups
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("matchup {id}")))?;
        patch(matchup);
        Ok(())
    }

    fn get_weekly_score(
        &self,
        league: LeagueId,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeeklyScore>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .weekly_scores
            .values()
            .find(|s| s.league == league && s.user == user && s.week == week)
            .cloned())
    }

    fn upsert_weekly_score(&self, score: WeeklyScore) -> Result<(), StoreError> {
        let mut tables = self.tables.borrow_mut();
        let existing_id = tables
            .weekly_scores
            .values()
            .find(|s| s.league == score.league && s.user == score.user && s.week == score.week)
            .map(|s| s.id);
        if let Some(id) = existing_id {
            tables.weekly_scores.remove(&id);
        }
        tables.weekly_scores.insert(score.id, score);
        Ok(())
    }

    fn list_playoffs(&self, league: LeagueId) -> Result<Vec<Playoff>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .playoffs
            .values()
            .filter(|p| p.league == league)
            .cloned()
            .collect())
    }

    fn get_playoff(&self, id: PlayoffId) -> Result<Playoff, StoreError> {
        self.tables
            .borrow()
            .playoffs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("playoff {id}")))
    }

    fn insert_playoff_if_absent(&self, playoff: Playoff) -> Result<bool, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let exists = tables.playoffs.values().any(|p| {
            p.league == playoff.league
                && p.round == playoff.round
                && p.match_number == playoff.match_number
        });
        if exists {
            return Ok(false);
        }
        tables.playoffs.insert(playoff.id, playoff);
        Ok(true)
    }

    fn write_playoff(&self, id: PlayoffId, patch: &dyn Fn(&mut Playoff)) -> Result<(), StoreError> {
        let mut tables = self.tables.borrow_mut();
        let playoff = tables
            .playoffs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("playoff {id}")))?;
        patch(playoff);
        Ok(())
    }
}
