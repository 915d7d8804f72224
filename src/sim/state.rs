//! World state and the non-actor entity types
//!
//! The `World` owns every live collection for a single run. The `Player` and
//! `DailyMission` are lent to it by the session for the duration of the run.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::enemy::{BossPhase, Enemy, EnemyKind};
use super::geometry::Bounds;
use super::mission::DailyMission;
use super::player::Player;
use super::schedule::Scheduler;
use super::weapons::WeaponId;
use crate::consts::*;
use crate::palette;
use crate::Rgb;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen, timers suspended
    Paused,
    /// Run ended (death or kill-count victory)
    GameOver { won: bool },
}

/// Shared position/size/health capability of player and enemies
pub trait Combatant {
    fn pos(&self) -> Vec2;
    fn size(&self) -> f32;
    fn hp(&self) -> i32;
    fn max_hp(&self) -> i32;
    fn set_hp(&mut self, hp: i32);

    /// Subtract `amount` from hp, never going below zero
    fn apply_damage(&mut self, amount: i32) {
        let hp = (self.hp() - amount.max(0)).max(0);
        self.set_hp(hp);
    }

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }

    /// Health-bar fill, derived on demand
    fn health_ratio(&self) -> f32 {
        if self.max_hp() <= 0 {
            0.0
        } else {
            (self.hp() as f32 / self.max_hp() as f32).clamp(0.0, 1.0)
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Boss,
}

/// How much an area blast hurts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlastDamage {
    /// Fixed damage regardless of weapon upgrades
    Fixed(i32),
    /// Use the projectile's frozen damage
    Projectile,
}

/// Area-of-effect burst parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub radius: f32,
    pub damage: BlastDamage,
    /// Base score for kills caused by this blast
    pub score: u32,
}

/// Behavioral category of a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileKind {
    /// Damages one enemy, then dies
    Normal,
    /// Damages everything it touches and keeps going
    Beam,
    /// Bursts on first contact
    Explosive(Blast),
    /// Ignores contact; bursts when the fuse runs out
    Fused(Blast),
    /// Pulls nearby enemies, deals no damage
    GravityWell,
    /// Single-target, steers toward the nearest enemy
    Homing { turn_rate: f32 },
    /// Fired by the boss at the player
    BossShot,
}

/// A live projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    /// Unit direction of travel
    pub dir: Vec2,
    pub owner: ProjectileOwner,
    pub kind: ProjectileKind,
    /// Weapon that produced it (None for boss shots)
    pub weapon: Option<WeaponId>,
    pub speed: f32,
    pub radius: f32,
    pub damage: i32,
    pub color: Rgb,
    pub spawn_time: u64,
    pub lifetime_ms: u64,
    /// Remaining fuse for delayed detonation
    pub fuse_ms: Option<f32>,
    /// Fuse ran out this tick; detonation pending
    pub detonated: bool,
    pub alive: bool,
}

impl Projectile {
    /// Advance position and expiry timers
    pub fn update(&mut self, dt: f32, dt_ms: f32, now: u64, bounds: &Bounds) {
        self.pos += self.dir * self.speed * dt;

        if let Some(fuse) = self.fuse_ms.as_mut() {
            *fuse -= dt_ms;
            if *fuse <= 0.0 && !self.detonated {
                self.detonated = true;
                self.alive = false;
            }
        }

        if now.saturating_sub(self.spawn_time) > self.lifetime_ms {
            self.alive = false;
        }
        if bounds.is_outside(self.pos, OFFSCREEN_MARGIN) {
            self.alive = false;
        }
    }
}

/// A cosmetic particle (never affects combat)
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    pub color: Rgb,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
        self.vel.y += 9.0 * dt * 0.6;
    }

    /// 1.0 when fresh, 0.0 when expired
    pub fn fade(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).max(0.0)
        }
    }
}

/// Particle burst styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Blood,
    Explosion,
    Sparks,
}

/// Timed buff granted by a powerup pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    Dash,
    Damage,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    HealthOrb,
    AmmoBox,
    Powerup(PowerupKind),
}

impl PickupKind {
    pub fn size(&self) -> f32 {
        match self {
            PickupKind::HealthOrb => 10.0,
            PickupKind::AmmoBox | PickupKind::Powerup(_) => 12.0,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            PickupKind::HealthOrb => palette::GREEN,
            PickupKind::AmmoBox => palette::BLUE,
            PickupKind::Powerup(PowerupKind::Dash) => palette::CYAN,
            PickupKind::Powerup(PowerupKind::Damage) => palette::ORANGE,
        }
    }
}

/// HP restored by a health orb
pub const HEALTH_ORB_HEAL: i32 = 25;
/// Damage multiplier granted by the damage powerup
pub const DAMAGE_POWERUP_MULT: f32 = 1.6;
/// Duration of the damage powerup
pub const DAMAGE_POWERUP_MS: f32 = 8000.0;

/// A pickup entity
#[derive(Debug, Clone)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
}

/// Mine hazard damage
pub const MINE_DAMAGE: i32 = 20;
pub const MINE_SIZE: f32 = 15.0;

/// Static hazard that detonates on contact with either side
#[derive(Debug, Clone)]
pub struct Mine {
    pub pos: Vec2,
    pub size: f32,
    pub damage: i32,
}

impl Mine {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: MINE_SIZE,
            damage: MINE_DAMAGE,
        }
    }
}

/// What killed an enemy, for mission bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSource {
    Weapon(WeaponId),
    Mine,
}

/// Notifications emitted during a tick, drained by the outer shell
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Shot { weapon: WeaponId },
    AreaArmed,
    Teleported { to: Vec2 },
    DashStarted,
    ShieldRaised,
    PlayerHurt { damage: i32, absorbed: f32 },
    Explosion { pos: Vec2 },
    EnemyKilled { kind: EnemyKind, source: KillSource, score: u64 },
    PickupCollected(PickupKind),
    LevelUp(u32),
    BossSpawned,
    BossPhaseChanged(BossPhase),
    MissionCompleted { reward: u64 },
    WeatherChanged { raining: bool },
    GameOver { won: bool },
}

/// Static per-run parameters
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub bounds: Bounds,
    pub max_particles: usize,
    /// Particle burst density multiplier
    pub particle_scale: f32,
    pub win_kills: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::new(ARENA_WIDTH, ARENA_HEIGHT),
            max_particles: 500,
            particle_scale: 1.0,
            win_kills: WIN_KILLS,
        }
    }
}

/// Live state of one run
#[derive(Debug)]
pub struct World {
    pub config: WorldConfig,
    pub phase: GamePhase,
    /// Simulation clock (ms since run start)
    pub now_ms: u64,
    pub ticks: u64,
    pub player: Player,
    pub mission: DailyMission,
    /// Weapons the player may switch to
    pub unlocked: BTreeSet<WeaponId>,
    /// Last known aim point
    pub aim: Vec2,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub mines: Vec<Mine>,
    pub particles: Vec<Particle>,
    pub schedule: Scheduler,
    /// Mission rewards earned this run, not yet credited by the session
    pub mission_coins: u64,
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
    /// Sub-millisecond remainder of the clock
    clock_carry: f32,
}

impl World {
    pub fn new(
        config: WorldConfig,
        mut player: Player,
        mission: DailyMission,
        mut unlocked: BTreeSet<WeaponId>,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        unlocked.insert(WeaponId::Pistol);
        if !unlocked.contains(&player.weapon) {
            player.weapon = WeaponId::Pistol;
        }
        let schedule = Scheduler::new(0, &mut rng);
        Self {
            config,
            phase: GamePhase::Playing,
            now_ms: 0,
            ticks: 0,
            player,
            mission,
            unlocked,
            aim: Vec2::ZERO,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            mines: Vec::new(),
            particles: Vec::new(),
            schedule,
            mission_coins: 0,
            events: Vec::new(),
            rng,
            next_id: 1,
            clock_carry: 0.0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds
    }

    pub fn is_raining(&self) -> bool {
        self.schedule.weather.raining
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    /// Advance the simulation clock by `dt` seconds
    pub fn advance_clock(&mut self, dt: f32) {
        self.clock_carry += dt * 1000.0;
        let whole = self.clock_carry.floor();
        self.clock_carry -= whole;
        self.now_ms += whole as u64;
        self.ticks += 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Insert an enemy, assigning its id
    pub fn spawn_enemy(&mut self, mut enemy: Enemy) -> u32 {
        let id = self.next_entity_id();
        enemy.id = id;
        if enemy.is_boss() {
            log::info!("Boss spawned at ({:.0}, {:.0})", enemy.pos.x, enemy.pos.y);
            self.emit(GameEvent::BossSpawned);
        }
        self.enemies.push(enemy);
        id
    }

    /// End the run; only the first call has any effect
    pub fn end_run(&mut self, won: bool) {
        if self.is_over() {
            return;
        }
        log::info!(
            "Run over ({}): score={} kills={}",
            if won { "victory" } else { "defeat" },
            self.player.score,
            self.player.kills
        );
        self.phase = GamePhase::GameOver { won };
        self.emit(GameEvent::GameOver { won });
    }

    /// Spawn a cosmetic particle burst (respects the particle cap)
    pub fn burst(&mut self, style: Burst, pos: Vec2, count: usize) {
        let count = ((count as f32) * self.config.particle_scale).round() as usize;
        let room = self.config.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let (speed, radius, life, color) = match style {
                Burst::Blood => (
                    self.rng.random_range(2.0..8.0),
                    self.rng.random_range(2.0..5.0),
                    self.rng.random_range(0.4..1.0),
                    if self.rng.random::<f32>() > 0.3 {
                        palette::RED
                    } else {
                        palette::DARK_RED
                    },
                ),
                Burst::Explosion => (
                    self.rng.random_range(3.0..12.0),
                    self.rng.random_range(3.0..8.0),
                    self.rng.random_range(0.6..1.4),
                    if self.rng.random::<f32>() > 0.4 {
                        palette::ORANGE
                    } else {
                        palette::YELLOW
                    },
                ),
                Burst::Sparks => (
                    self.rng.random_range(1.0..5.0),
                    self.rng.random_range(1.0..3.0),
                    self.rng.random_range(0.2..0.6),
                    palette::WHITE,
                ),
            };
            // Source velocities are per-frame; scale to px/s
            let vel = Vec2::new(angle.cos(), angle.sin()) * speed * 60.0;
            self.particles.push(Particle {
                pos,
                vel,
                radius,
                life,
                max_life: life,
                color,
            });
        }
    }

    /// Advance and cull particles
    pub fn update_particles(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.update(dt);
        }
        self.particles.retain(|p| p.life > 0.01);
    }

    /// Random point inside the playfield, keeping `margin` from the edges
    pub fn random_point(&mut self, margin: f32) -> Vec2 {
        let b = self.config.bounds;
        let x = self.rng.random_range(margin..(b.width - margin).max(margin + 1.0));
        let y = self.rng.random_range(margin..(b.height - margin).max(margin + 1.0));
        Vec2::new(x.floor(), y.floor())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::empty_world;
    use super::*;

    #[test]
    fn test_end_run_is_idempotent() {
        let mut world = empty_world(1);
        world.end_run(false);
        world.end_run(true);
        assert_eq!(world.phase, GamePhase::GameOver { won: false });
        let game_overs = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_particle_cap() {
        let mut world = empty_world(2);
        world.config.max_particles = 10;
        world.burst(Burst::Explosion, Vec2::ZERO, 48);
        assert_eq!(world.particles.len(), 10);
    }

    #[test]
    fn test_particles_decay_and_fall() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 3.0,
            life: 0.5,
            max_life: 0.5,
            color: palette::WHITE,
        };
        p.update(0.25);
        assert!((p.fade() - 0.5).abs() < 1e-5);
        assert!(p.vel.y > 0.0);
    }

    #[test]
    fn test_projectile_expires_out_of_bounds() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut p = Projectile {
            pos: Vec2::new(210.0, 50.0),
            dir: Vec2::X,
            owner: ProjectileOwner::Player,
            kind: ProjectileKind::Normal,
            weapon: Some(WeaponId::Pistol),
            speed: 700.0,
            radius: 5.0,
            damage: 18,
            color: palette::YELLOW,
            spawn_time: 0,
            lifetime_ms: 5000,
            fuse_ms: None,
            detonated: false,
            alive: true,
        };
        p.update(0.02, 20.0, 20, &bounds);
        assert!(!p.alive);
    }

    #[test]
    fn test_fuse_marks_detonation() {
        let bounds = Bounds::new(1000.0, 1000.0);
        let mut p = Projectile {
            pos: Vec2::new(500.0, 500.0),
            dir: Vec2::X,
            owner: ProjectileOwner::Player,
            kind: ProjectileKind::Fused(Blast {
                radius: 80.0,
                damage: BlastDamage::Fixed(60),
                score: 10,
            }),
            weapon: Some(WeaponId::Grenade),
            speed: 0.0,
            radius: 7.0,
            damage: 0,
            color: palette::GREEN,
            spawn_time: 0,
            lifetime_ms: 2000,
            fuse_ms: Some(700.0),
            detonated: false,
            alive: true,
        };
        p.update(0.5, 500.0, 500, &bounds);
        assert!(p.alive);
        p.update(0.25, 250.0, 750, &bounds);
        assert!(p.detonated);
        assert!(!p.alive);
    }
}
