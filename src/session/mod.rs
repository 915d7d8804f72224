//! Session and progress bridge
//!
//! Owns everything that outlives a single run: the signed-in identity, the
//! persisted profile (coins, unlocks, upgrades, last run aggregates), the
//! leaderboard and the daily mission. Runs are started from here and their
//! results flushed back exactly once.

pub mod shop;

pub use shop::Purchase;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::COINS_PER_KILL;
use crate::highscores::{self, HighScores, MAX_HIGH_SCORES};
use crate::persistence::{LeaderboardStore, Profile, ProfileStore};
use crate::sim::{DailyMission, GamePhase, Player, World, WorldConfig};

/// Who is playing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User(String),
}

impl Identity {
    pub fn user(&self) -> Option<&str> {
        match self {
            Identity::User(name) => Some(name),
            Identity::Guest => None,
        }
    }
}

/// A guest result waiting for a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingScore {
    pub score: u64,
    pub kills: u32,
}

/// What the end-of-run flush did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub won: bool,
    pub score: u64,
    pub kills: u32,
    pub coins_earned: u64,
    /// Leaderboard rank when the result was submitted automatically
    pub rank: Option<usize>,
    /// A guest qualified and should be asked for a name
    pub awaiting_name: bool,
}

/// State shared across runs, passed explicitly instead of living in globals
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub identity: Identity,
    pub profile: Profile,
    pub leaderboard: HighScores,
    pub mission: DailyMission,
    pub pending: Option<PendingScore>,
}

impl SessionContext {
    pub fn coins(&self) -> u64 {
        self.profile.coins
    }
}

/// Bookkeeping for the run in progress
#[derive(Debug, Clone, Copy, Default)]
struct RunLedger {
    flushed: bool,
    /// Mission coins already moved from the world into the profile
    mission_credited: u64,
}

pub struct Session {
    pub ctx: SessionContext,
    profiles: Box<dyn ProfileStore>,
    board: Box<dyn LeaderboardStore>,
    run: Option<RunLedger>,
    rng: Pcg32,
}

impl Session {
    /// Start as a guest and read the shared leaderboard
    pub fn new(profiles: Box<dyn ProfileStore>, board: Box<dyn LeaderboardStore>, seed: u64) -> Self {
        let leaderboard = match board.top_n(MAX_HIGH_SCORES) {
            Ok(entries) => HighScores::from_entries(entries),
            Err(e) => {
                log::warn!("Leaderboard unavailable ({e}), starting empty");
                HighScores::new()
            }
        };
        Self {
            ctx: SessionContext {
                leaderboard,
                ..SessionContext::default()
            },
            profiles,
            board,
            run: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn profile_store(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    pub fn leaderboard_store(&self) -> &dyn LeaderboardStore {
        self.board.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Switch to `user` and load their profile
    pub fn login(&mut self, user: &str) {
        log::info!("Signed in as {user}");
        self.ctx.identity = Identity::User(user.to_string());
        self.ctx.pending = None;
        self.ctx.profile = self.load_profile(user);
    }

    /// Back to guest; progress is not carried over
    pub fn logout(&mut self) {
        self.ctx.identity = Identity::Guest;
        self.ctx.profile = Profile::default();
        self.ctx.pending = None;
    }

    fn load_profile(&self, user: &str) -> Profile {
        match self.profiles.load(user) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Could not load profile for {user} ({e}), using defaults");
                Profile::default()
            }
        }
    }

    /// Save the profile for signed-in users; failures keep the in-memory copy
    fn persist(&mut self) {
        let Identity::User(user) = &self.ctx.identity else {
            return;
        };
        if let Err(e) = self.profiles.save(user, &self.ctx.profile) {
            log::warn!("Profile save failed for {user}: {e}");
        }
    }

    fn persist_leaderboard(&mut self) {
        if let Err(e) = self.board.replace_all(&self.ctx.leaderboard.entries) {
            log::warn!("Leaderboard save failed: {e}");
        }
    }

    /// Build a fresh world from the stored profile and roll a new mission
    pub fn begin_run(&mut self, config: WorldConfig, seed: u64) -> World {
        match self.ctx.identity.user().map(str::to_string) {
            Some(user) => match self.profiles.load(&user) {
                Ok(profile) => self.ctx.profile = profile,
                Err(e) => log::warn!("Could not reload profile for {user} ({e}), keeping in-memory copy"),
            },
            None => {
                // Guests keep shop state for the session but start each run fresh
                let defaults = Profile::default();
                let profile = &mut self.ctx.profile;
                profile.score = defaults.score;
                profile.kills = defaults.kills;
                profile.weapon = defaults.weapon;
                profile.ammo = defaults.ammo;
            }
        }
        self.ctx.pending = None;
        self.ctx.mission = DailyMission::roll(&mut self.rng);

        let profile = &self.ctx.profile;
        let mut player = Player::new(config.bounds.center(), &profile.upgrades);
        player.score = profile.score;
        player.kills = profile.kills;
        player.weapon = profile.weapon;
        player.ammo.extend(profile.ammo.iter().map(|(&id, &n)| (id, n)));

        self.run = Some(RunLedger::default());
        log::info!(
            "Run started ({:?}), mission: {}",
            self.ctx.identity,
            self.ctx.mission.description()
        );
        World::new(
            config,
            player,
            self.ctx.mission.clone(),
            profile.unlocked.clone(),
            seed,
        )
    }

    /// Move newly earned mission coins into the profile
    fn credit_mission(&mut self, world: &World) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        self.ctx.mission = world.mission.clone();
        let fresh = world.mission_coins.saturating_sub(run.mission_credited);
        if fresh == 0 {
            return;
        }
        run.mission_credited = world.mission_coins;
        self.ctx.profile.coins += fresh;
        log::info!("Mission reward credited: {fresh} coins");
        self.persist();
    }

    /// Call once per tick; flushes the run when it has ended
    pub fn observe(&mut self, world: &World) -> Option<RunSummary> {
        self.credit_mission(world);
        if world.is_over() {
            self.finish_run(world)
        } else {
            None
        }
    }

    /// End-of-run flush; only the first call for a run has any effect
    pub fn finish_run(&mut self, world: &World) -> Option<RunSummary> {
        self.credit_mission(world);
        let run = self.run.as_mut()?;
        if run.flushed {
            return None;
        }
        run.flushed = true;

        let player = &world.player;
        let coins_earned = player.kills as u64 * COINS_PER_KILL;
        let profile = &mut self.ctx.profile;
        profile.coins += coins_earned;
        profile.score = player.score;
        profile.kills = player.kills;
        profile.weapon = player.weapon;
        profile.ammo = player.ammo.clone();
        self.persist();

        let won = matches!(world.phase, GamePhase::GameOver { won: true });
        let mut summary = RunSummary {
            won,
            score: player.score,
            kills: player.kills,
            coins_earned,
            rank: None,
            awaiting_name: false,
        };

        if self.ctx.leaderboard.qualifies(player.score, player.kills) {
            match self.ctx.identity.user().map(str::to_string) {
                Some(user) => {
                    summary.rank = self.ctx.leaderboard.submit(&user, player.score, player.kills);
                    if summary.rank.is_some() {
                        self.persist_leaderboard();
                    }
                }
                None => {
                    self.ctx.pending = Some(PendingScore {
                        score: player.score,
                        kills: player.kills,
                    });
                    summary.awaiting_name = true;
                }
            }
        }

        log::info!(
            "Run finished: won={} score={} kills={} coins +{}",
            summary.won,
            summary.score,
            summary.kills,
            summary.coins_earned
        );
        Some(summary)
    }

    /// Quit to menu mid-run; earned mission rewards are kept
    pub fn abort_run(&mut self, world: &World) {
        self.credit_mission(world);
        if self.run.take().is_some_and(|run| !run.flushed) {
            log::info!("Run aborted");
            self.persist();
        }
    }

    /// Resolve a guest's pending leaderboard entry
    pub fn submit_guest_name(&mut self, raw: &str) -> Option<usize> {
        let pending = self.ctx.pending.take()?;
        let name = highscores::sanitize_name(raw);
        let rank = self.ctx.leaderboard.submit(&name, pending.score, pending.kills);
        if let Some(rank) = rank {
            log::info!("{name} entered the leaderboard at #{rank}");
            self.persist_leaderboard();
        }
        rank
    }
}
