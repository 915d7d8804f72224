//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG owned by the `World`
//! - No rendering, audio or storage dependencies

pub mod combat;
pub mod enemy;
pub mod geometry;
pub mod mission;
pub mod player;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod weapons;

pub use enemy::{BossPhase, Enemy, EnemyKind};
pub use geometry::Bounds;
pub use mission::{DailyMission, MissionGoal};
pub use player::{Player, UpgradeKind, Upgrades};
pub use state::{
    Combatant, GameEvent, GamePhase, KillSource, PickupKind, PowerupKind, Projectile,
    ProjectileKind, World, WorldConfig,
};
pub use tick::{TickInput, tick};
pub use weapons::{FireOutcome, WeaponId, fire};
