//! Read-only view of a world for one presented frame
//!
//! Everything the host needs to draw, flattened into plain records. Counts
//! are capped per category so a sink can use fixed-size buffers.

use glam::Vec2;

use crate::Rgb;
use crate::sim::{BossPhase, Combatant, EnemyKind, GamePhase, PickupKind, ProjectileKind, WeaponId, World};

/// Maximum enemies per frame
pub const MAX_ENEMIES: usize = 256;
/// Maximum projectiles per frame
pub const MAX_PROJECTILES: usize = 512;
/// Maximum particles per frame
pub const MAX_PARTICLES: usize = 2000;
/// Maximum pickups and mines per frame
pub const MAX_PICKUPS: usize = 64;

/// Shape hint for a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    /// Glowing circle with a halo
    Orb,
    /// Elongated along the travel direction
    Streak,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub shape: Shape,
    /// Opacity (0-1)
    pub alpha: f32,
    /// Health bar fill, if the entity has one
    pub health: Option<f32>,
}

impl Drawable {
    fn new(pos: Vec2, radius: f32, color: Rgb, shape: Shape) -> Self {
        Self {
            pos,
            radius,
            color,
            shape,
            alpha: 1.0,
            health: None,
        }
    }
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub hp: i32,
    pub max_hp: i32,
    pub shield: f32,
    pub max_shield: f32,
    pub shield_skill_active: bool,
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    pub weapon: WeaponId,
    /// `None` for infinite-ammo weapons
    pub ammo: Option<u32>,
    pub combo: u32,
    pub combo_multiplier: f32,
    pub damage_boosted: bool,
    pub raining: bool,
    pub mission: String,
    pub mission_progress: (u64, u64),
    pub boss: Option<(BossPhase, f32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub time_ms: u64,
    pub phase: GamePhase,
    pub arena: Vec2,
    pub aim: Vec2,
    pub player: Drawable,
    pub enemies: Vec<Drawable>,
    pub projectiles: Vec<Drawable>,
    pub pickups: Vec<Drawable>,
    pub particles: Vec<Drawable>,
    pub hud: Hud,
}

impl FrameSnapshot {
    pub fn capture(world: &World) -> Self {
        let player = &world.player;
        let bounds = world.bounds();

        let mut avatar = Drawable::new(player.pos, player.size / 2.0, crate::palette::GREEN, Shape::Square);
        avatar.health = Some(player.health_ratio());
        if player.dash.active {
            avatar.alpha = 0.6;
        }

        let enemies = world
            .enemies
            .iter()
            .filter(|e| !e.dead)
            .take(MAX_ENEMIES)
            .map(|e| {
                let shape = match e.kind() {
                    EnemyKind::Boss | EnemyKind::Armored => Shape::Square,
                    _ => Shape::Circle,
                };
                let mut d = Drawable::new(e.pos, e.size, e.color, shape);
                d.health = Some(e.health_ratio());
                d
            })
            .collect();

        let projectiles = world
            .projectiles
            .iter()
            .filter(|p| p.alive)
            .take(MAX_PROJECTILES)
            .map(|p| {
                let shape = match p.kind {
                    ProjectileKind::Beam => Shape::Streak,
                    ProjectileKind::GravityWell | ProjectileKind::Fused(_) => Shape::Orb,
                    _ => Shape::Circle,
                };
                Drawable::new(p.pos, p.radius, p.color, shape)
            })
            .collect();

        let pickups = world
            .pickups
            .iter()
            .map(|p| Drawable::new(p.pos, p.kind.size(), p.kind.color(), pickup_shape(p.kind)))
            .chain(
                world
                    .mines
                    .iter()
                    .map(|m| Drawable::new(m.pos, m.size, crate::palette::RED, Shape::Circle)),
            )
            .take(MAX_PICKUPS)
            .collect();

        let particles = world
            .particles
            .iter()
            .take(MAX_PARTICLES.min(world.config.max_particles))
            .map(|p| {
                let mut d = Drawable::new(p.pos, p.radius, p.color, Shape::Circle);
                d.alpha = p.fade();
                d
            })
            .collect();

        let boss = world
            .enemies
            .iter()
            .find(|e| e.is_boss() && !e.dead)
            .and_then(|e| e.boss_phase().map(|phase| (phase, e.health_ratio())));

        let spec = player.weapon.spec();
        let hud = Hud {
            hp: player.hp,
            max_hp: player.max_hp,
            shield: player.shield_hp,
            max_shield: player.max_shield,
            shield_skill_active: player.shield_skill.active,
            score: player.score,
            kills: player.kills,
            level: player.level,
            weapon: player.weapon,
            ammo: (!spec.infinite).then(|| player.ammo_of(player.weapon)),
            combo: player.combo.count,
            combo_multiplier: player.combo.multiplier,
            damage_boosted: player.damage_timer_ms > 0.0,
            raining: world.is_raining(),
            mission: world.mission.description(),
            mission_progress: (world.mission.progress.min(world.mission.target), world.mission.target),
            boss,
        };

        Self {
            time_ms: world.now_ms,
            phase: world.phase,
            arena: Vec2::new(bounds.width, bounds.height),
            aim: world.aim,
            player: avatar,
            enemies,
            projectiles,
            pickups,
            particles,
            hud,
        }
    }
}

fn pickup_shape(kind: PickupKind) -> Shape {
    match kind {
        PickupKind::HealthOrb => Shape::Orb,
        PickupKind::AmmoBox => Shape::Square,
        PickupKind::Powerup(_) => Shape::Orb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::empty_world;
    use crate::sim::state::{Mine, Pickup};

    #[test]
    fn test_capture_basic_world() {
        let mut world = empty_world(3);
        world.pickups.push(Pickup {
            pos: Vec2::new(10.0, 10.0),
            kind: PickupKind::HealthOrb,
        });
        world.mines.push(Mine::new(Vec2::new(50.0, 50.0)));
        let frame = FrameSnapshot::capture(&world);
        assert_eq!(frame.pickups.len(), 2);
        assert_eq!(frame.player.health, Some(1.0));
        assert_eq!(frame.hud.weapon, WeaponId::Pistol);
        assert_eq!(frame.hud.ammo, None);
        assert_eq!(frame.hud.mission_progress, (0, 50));
        assert!(frame.hud.boss.is_none());
    }

    #[test]
    fn test_hud_shows_finite_ammo() {
        let mut world = empty_world(4);
        world.player.weapon = WeaponId::Shotgun;
        let frame = FrameSnapshot::capture(&world);
        assert_eq!(frame.hud.ammo, Some(30));
    }

    #[test]
    fn test_particles_respect_quality_cap() {
        let mut world = empty_world(5);
        world.config.max_particles = 4;
        world.config.particle_scale = 1.0;
        world.burst(crate::sim::state::Burst::Explosion, Vec2::ZERO, 40);
        let frame = FrameSnapshot::capture(&world);
        assert!(frame.particles.len() <= 4);
    }
}
