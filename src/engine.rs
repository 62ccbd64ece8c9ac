//! The single façade hosting applications call. Every method opens one
//! `Store::transaction` and delegates to the relevant component; nothing
//! outside this module touches the Store Port directly.

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rand::rngs::ThreadRng;
use tracing::{info, instrument};

use crate::error::EngineError;
use crate::ids::{LeagueId, MemberId, PlayoffId, UserId};
use crate::join_code;
use crate::model::league::{ALLOWED_MAX_PLAYERS, ALLOWED_SEASON_LENGTHS};
use crate::model::{League, Member, Metrics, WeeklyScore};
use crate::playoff_finalizer;
use crate::playoff_generator;
use crate::schedule;
use crate::scoring::{self, ScoringConfig};
use crate::store::Store;
use crate::week_finalizer;

/// The League Engine. Generic over any `Store` implementation — the
/// in-memory reference store for tests and small deployments, or a real
/// database adapter in production.
pub struct Engine<S: Store> {
    store: S,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Engine { store }
    }

    /// Direct access to the underlying store, for callers that need to
    /// read entities the façade does not itself expose (standings
    /// displays, admin tooling).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a league and its creator membership. Retries join-code
    /// generation on collision, surfacing `Conflict` if it cannot find a
    /// free code after a bounded number of attempts.
    #[instrument(skip(self, rng))]
    pub fn create_league(
        &self,
        name: String,
        creator: UserId,
        season_length_weeks: u32,
        max_players: u32,
        config: ScoringConfig,
        rng: &mut ThreadRng,
    ) -> Result<LeagueId, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation(
                "league name must not be empty".into(),
            ));
        }
        if !ALLOWED_SEASON_LENGTHS.contains(&season_length_weeks) {
            return Err(EngineError::Validation(format!(
                "season_length_weeks must be one of {ALLOWED_SEASON_LENGTHS:?}"
            )));
        }
        if !ALLOWED_MAX_PLAYERS.contains(&max_players) {
            return Err(EngineError::Validation(format!(
                "max_players must be one of {ALLOWED_MAX_PLAYERS:?}"
            )));
        }

        const MAX_ATTEMPTS: u32 = 10;
        for _ in 0..MAX_ATTEMPTS {
            let code = join_code::generate(rng);
            let result: Result<Option<LeagueId>, EngineError> = self.store.transaction(|tx| {
                if tx.find_league_by_join_code(&code)?.is_some() {
                    return Ok(None);
                }
                let league = League::new(
                    name.clone(),
                    code.clone(),
                    creator,
                    season_length_weeks,
                    max_players,
                    config,
                );
                let league_id = league.id;
                tx.insert_league(league)?;
                let member = Member::new(league_id, creator, true, Utc::now());
                tx.insert_member_if_absent(member)?;
                Ok(Some(league_id))
            });
            if let Some(league_id) = result? {
                info!(league = %league_id, "created league");
                return Ok(league_id);
            }
        }
        Err(EngineError::Conflict(
            "could not allocate a unique join code".into(),
        ))
    }

    /// Joins a league by its (case-insensitive) join code.
    #[instrument(skip(self))]
    pub fn join_league_by_code(&self, code: &str, user: UserId) -> Result<MemberId, EngineError> {
        let normalized = join_code::normalize(code);
        self.store.transaction(|tx| {
            let league = tx
                .find_league_by_join_code(&normalized)?
                .ok_or_else(|| EngineError::NotFound(format!("join code {normalized}")))?;

            if tx.find_member_by_user(league.id, user)?.is_some() {
                return Err(EngineError::Precondition("user is already a member".into()));
            }
            if league.has_started() {
                return Err(EngineError::Precondition(
                    "league has already started".into(),
                ));
            }
            let current = tx.list_members(league.id)?;
            if current.len() as u32 >= league.max_players {
                return Err(EngineError::Precondition("league is full".into()));
            }

            let member = Member::new(league.id, user, false, Utc::now());
            let member_id = member.id;
            let inserted = tx.insert_member_if_absent(member)?;
            if !inserted {
                return Err(EngineError::Conflict(
                    "a concurrent join already took this membership".into(),
                ));
            }
            Ok(member_id)
        })
    }

    /// Starts a league: `admin_user` must be an admin member, `start_date`
    /// must fall on a Monday, and at least two members must have joined. Freezes
    /// `editable_config` into `frozen_config` and generates the
    /// regular-season schedule. Idempotent: calling this on an
    /// already-started league is a no-op.
    #[instrument(skip(self))]
    pub fn start_league(
        &self,
        league_id: LeagueId,
        admin_user: UserId,
        start_date: NaiveDate,
    ) -> Result<(), EngineError> {
        if start_date.weekday() != Weekday::Mon {
            return Err(EngineError::Validation(
                "start_date must be a Monday".into(),
            ));
        }

        self.store.transaction(|tx| {
            let league = tx.get_league(league_id)?;
            if league.has_started() {
                return Ok(());
            }

            let admin = tx
                .find_member_by_user(league_id, admin_user)?
                .ok_or_else(|| EngineError::PermissionDenied("caller is not a member".into()))?;
            if !admin.admin {
                return Err(EngineError::PermissionDenied(
                    "caller is not an admin".into(),
                ));
            }

            let members = tx.list_members(league_id)?;
            if members.len() < 2 {
                return Err(EngineError::Precondition(
                    "at least 2 members are required to start a league".into(),
                ));
            }

            let config = league.editable_config;
            tx.conditional_update_league(league_id, &|l| l.start_date.is_none(), &move |l| {
                l.start_date = Some(start_date);
                l.frozen_config = Some(config);
            })?;
            schedule::generate_matchups(tx, league_id)?;
            Ok(())
        })?;
        info!(league = %league_id, "started league");
        Ok(())
    }

    /// Records one member's raw metrics for a week, scoring them under
    /// the league's effective config. Upserts by
    /// `(league, user, week)` — callers may resubmit a corrected reading
    /// any time before the week is finalized.
    #[instrument(skip(self, metrics))]
    pub fn record_weekly_score(
        &self,
        league_id: LeagueId,
        user: UserId,
        week: u32,
        metrics: Metrics,
    ) -> Result<(), EngineError> {
        self.store.transaction(|tx| {
            let league = tx.get_league(league_id)?;
            if !league.has_started() {
                return Err(EngineError::Precondition("league has not started".into()));
            }
            if week < 1 || week > league.season_length_weeks {
                return Err(EngineError::Precondition(format!(
                    "week {week} is outside the regular season"
                )));
            }
            if tx.find_member_by_user(league_id, user)?.is_none() {
                return Err(EngineError::Precondition(
                    "user is not a member of this league".into(),
                ));
            }

            let config = league.effective_config();
            let points = scoring::score(&metrics, &config);
            tx.upsert_weekly_score(WeeklyScore {
                id: crate::ids::WeeklyScoreId::new(),
                league: league_id,
                user,
                week,
                metrics,
                total_points: points,
                last_synced_at: Utc::now(),
            })?;
            Ok(())
        })
    }

    /// Finalizes a league-week: see [`week_finalizer::finalize_week`].
    #[instrument(skip(self))]
    pub fn advance_week(&self, league_id: LeagueId, week: u32) -> Result<(), EngineError> {
        self.store
            .transaction(|tx| week_finalizer::finalize_week(tx, league_id, week))
    }

    /// Generates the playoff bracket: see
    /// [`playoff_generator::generate_playoffs`].
    #[instrument(skip(self))]
    pub fn run_playoffs(&self, league_id: LeagueId) -> Result<(), EngineError> {
        self.store
            .transaction(|tx| playoff_generator::generate_playoffs(tx, league_id))
    }

    /// Finalizes one playoff match: see
    /// [`playoff_finalizer::finalize_playoff_match`].
    #[instrument(skip(self))]
    pub fn finalize_playoff_match(
        &self,
        league_id: LeagueId,
        playoff_id: PlayoffId,
        player1_score: f64,
        player2_score: f64,
    ) -> Result<(), EngineError> {
        self.store.transaction(|tx| {
            playoff_finalizer::finalize_playoff_match(
                tx,
                league_id,
                playoff_id,
                player1_score,
                player2_score,
            )
        })
    }

    /// Deletes a league and all of its owned rows (members, matchups,
    /// weekly scores, playoffs). Only the league's creator may do this.
    #[instrument(skip(self))]
    pub fn delete_league(&self, league_id: LeagueId, creator: UserId) -> Result<(), EngineError> {
        self.store.transaction(|tx| {
            let league = tx.get_league(league_id)?;
            if league.creator != creator {
                return Err(EngineError::PermissionDenied(
                    "only the league creator may delete it".into(),
                ));
            }
            tx.delete_league(league_id)?;
            Ok(())
        })
    }

    /// Removes `target` from a league that has not yet started. `admin`
    /// must be an admin member and may not remove themself.
    #[instrument(skip(self))]
    pub fn remove_member(
        &self,
        league_id: LeagueId,
        admin: UserId,
        target: MemberId,
    ) -> Result<(), EngineError> {
        self.store.transaction(|tx| {
            let league = tx.get_league(league_id)?;
            if league.has_started() {
                return Err(EngineError::Precondition(
                    "cannot remove a member after the league has started".into(),
                ));
            }

            let admin_member = tx
                .find_member_by_user(league_id, admin)?
                .ok_or_else(|| EngineError::PermissionDenied("caller is not a member".into()))?;
            if !admin_member.admin {
                return Err(EngineError::PermissionDenied(
                    "caller is not an admin".into(),
                ));
            }
            if admin_member.id == target {
                return Err(EngineError::Precondition(
                    "an admin cannot remove themself".into(),
                ));
            }

            let member = tx.get_member(target)?;
            if member.league != league_id {
                return Err(EngineError::NotFound(format!(
                    "member {target} does not belong to league {league_id}"
                )));
            }
            tx.delete_member(target)?;
            Ok(())
        })
    }
}
