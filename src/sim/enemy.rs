//! Enemy variants and their movement state machines

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::geometry::{self, Bounds};
use super::state::{Combatant, Projectile, ProjectileKind, ProjectileOwner};
use crate::consts::*;
use crate::palette;
use crate::Rgb;

/// Enemy category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Normal,
    Fast,
    Armored,
    Flying,
    Teleporting,
    Boss,
}

/// Boss state machine; the transition is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    /// Chase and fire a three-way spread
    Hunting,
    /// Teleport and detonate on a fixed period
    Enraged,
}

pub const BOSS_SHOT_COOLDOWN_MS: u64 = 1200;
pub const BOSS_BLAST_PERIOD_MS: f32 = 2000.0;
pub const BOSS_SPREAD: [f32; 3] = [-0.12, 0.0, 0.12];
pub const BOSS_SHOT_DAMAGE: i32 = 18;
/// Damage dealt by the enraged blast to other enemies
pub const BOSS_BLAST_ENEMY_DAMAGE: i32 = 60;
/// Damage dealt by the enraged blast to the player
pub const BOSS_BLAST_PLAYER_DAMAGE: i32 = 80;

pub const TELEPORT_PERIOD_MS: u64 = 2000;
const FLYING_AMPLITUDE: f32 = 50.0;
const FLYING_FREQUENCY: f32 = 0.02;

/// Per-variant movement state
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Chase(EnemyKind),
    Wave {
        elapsed: f32,
    },
    Blink {
        last_teleport: Option<u64>,
    },
    Boss {
        phase: BossPhase,
        phase_timer_ms: f32,
        last_shot: Option<u64>,
    },
}

/// Something an enemy wants the world to do after its update
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyAction {
    PhaseChanged(BossPhase),
    Volley(Vec<Projectile>),
    /// Blast centered on the (already relocated) boss
    Blast { center: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub color: Rgb,
    pub behavior: Behavior,
    /// Marked by combat; removed at the end of the tick
    pub dead: bool,
}

impl Enemy {
    fn base(pos: Vec2, hp: i32, speed: f32, size: f32, color: Rgb, behavior: Behavior) -> Self {
        Self {
            id: 0,
            pos,
            vel: Vec2::ZERO,
            size,
            hp,
            max_hp: hp,
            speed,
            color,
            behavior,
            dead: false,
        }
    }

    /// Build an enemy of `kind`; normal enemies scale with the player's level
    pub fn spawn(kind: EnemyKind, pos: Vec2, level: u32, rng: &mut impl Rng) -> Self {
        match kind {
            EnemyKind::Normal => {
                let lo = 18 + 2 * level as i32;
                let hi = 30 + 3 * level as i32;
                let hp = rng.random_range(lo..=hi);
                let tints: [Rgb; 3] = [[220, 60, 60], [180, 30, 30], [200, 80, 50]];
                let color = tints.choose(rng).copied().unwrap_or(palette::RED);
                Self::base(pos, hp, ENEMY_SPEED, ENEMY_SIZE, color, Behavior::Chase(kind))
            }
            EnemyKind::Fast => Self::base(
                pos,
                20,
                ENEMY_SPEED * 1.8,
                ENEMY_SIZE,
                [255, 100, 100],
                Behavior::Chase(kind),
            ),
            EnemyKind::Armored => Self::base(
                pos,
                60,
                ENEMY_SPEED * 0.7,
                22.0,
                palette::GRAY,
                Behavior::Chase(kind),
            ),
            EnemyKind::Flying => Self::base(
                pos,
                25,
                ENEMY_SPEED * 1.2,
                ENEMY_SIZE,
                [150, 150, 255],
                Behavior::Wave { elapsed: 0.0 },
            ),
            EnemyKind::Teleporting => Self::base(
                pos,
                30,
                ENEMY_SPEED * 1.5,
                ENEMY_SIZE,
                palette::MAGENTA,
                Behavior::Blink {
                    last_teleport: None,
                },
            ),
            EnemyKind::Boss => Self::base(
                pos,
                500,
                ENEMY_SPEED,
                40.0,
                palette::PURPLE,
                Behavior::Boss {
                    phase: BossPhase::Hunting,
                    phase_timer_ms: 0.0,
                    last_shot: None,
                },
            ),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Chase(kind) => kind,
            Behavior::Wave { .. } => EnemyKind::Flying,
            Behavior::Blink { .. } => EnemyKind::Teleporting,
            Behavior::Boss { .. } => EnemyKind::Boss,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.behavior, Behavior::Boss { .. })
    }

    pub fn boss_phase(&self) -> Option<BossPhase> {
        match self.behavior {
            Behavior::Boss { phase, .. } => Some(phase),
            _ => None,
        }
    }

    fn chase(&mut self, target: Vec2, raining: bool) {
        let to_target = target - self.pos;
        self.vel = if to_target.length_squared() > 0.0 {
            let mut speed = self.speed;
            if raining {
                speed *= RAIN_SPEED_DEBUFF;
            }
            to_target.normalize() * speed
        } else {
            Vec2::ZERO
        };
    }

    /// Advance one tick toward `target`
    pub fn update(
        &mut self,
        dt: f32,
        now: u64,
        target: Vec2,
        raining: bool,
        bounds: &Bounds,
        rng: &mut impl Rng,
    ) -> Option<EnemyAction> {
        match self.behavior {
            Behavior::Chase(_) => {
                self.chase(target, raining);
                self.pos += self.vel * dt;
                None
            }
            Behavior::Wave { elapsed } => {
                let elapsed = elapsed + dt;
                self.behavior = Behavior::Wave { elapsed };
                self.chase(target, raining);
                self.vel.y += (elapsed * FLYING_FREQUENCY).sin() * FLYING_AMPLITUDE * dt;
                self.pos += self.vel * dt;
                None
            }
            Behavior::Blink { last_teleport } => {
                let due = last_teleport.is_none_or(|t| now.saturating_sub(t) > TELEPORT_PERIOD_MS);
                if due {
                    let angle = rng.random_range(0.0..std::f32::consts::TAU);
                    let dist = rng.random_range(100.0..=300.0);
                    self.pos = target + geometry::from_angle(angle) * dist;
                    self.behavior = Behavior::Blink {
                        last_teleport: Some(now),
                    };
                } else {
                    self.chase(target, raining);
                    self.pos += self.vel * dt;
                }
                None
            }
            Behavior::Boss {
                phase,
                phase_timer_ms,
                last_shot,
            } => self.update_boss(dt, now, target, raining, bounds, rng, phase, phase_timer_ms, last_shot),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn update_boss(
        &mut self,
        dt: f32,
        now: u64,
        target: Vec2,
        raining: bool,
        bounds: &Bounds,
        rng: &mut impl Rng,
        phase: BossPhase,
        phase_timer_ms: f32,
        last_shot: Option<u64>,
    ) -> Option<EnemyAction> {
        let mut timer = phase_timer_ms + dt * 1000.0;

        if phase == BossPhase::Hunting && self.hp < self.max_hp / 2 {
            log::info!("Boss {} entered its enraged phase", self.id);
            self.behavior = Behavior::Boss {
                phase: BossPhase::Enraged,
                phase_timer_ms: 0.0,
                last_shot,
            };
            return Some(EnemyAction::PhaseChanged(BossPhase::Enraged));
        }

        match phase {
            BossPhase::Hunting => {
                self.chase(target, raining);
                self.pos += self.vel * dt;

                let ready = last_shot.is_none_or(|t| now.saturating_sub(t) > BOSS_SHOT_COOLDOWN_MS);
                let mut action = None;
                let mut shot_at = last_shot;
                if ready {
                    let to_target = target - self.pos;
                    if to_target.length_squared() > 0.0 {
                        let base = geometry::angle_of(to_target);
                        let volley = BOSS_SPREAD
                            .iter()
                            .map(|offset| {
                                let dir = geometry::from_angle(base + offset);
                                self.boss_shot(dir, now)
                            })
                            .collect();
                        action = Some(EnemyAction::Volley(volley));
                    }
                    shot_at = Some(now);
                }
                self.behavior = Behavior::Boss {
                    phase,
                    phase_timer_ms: timer,
                    last_shot: shot_at,
                };
                action
            }
            BossPhase::Enraged => {
                let mut action = None;
                if timer >= BOSS_BLAST_PERIOD_MS {
                    let x = rng.random_range(50.0..=(bounds.width - 50.0).max(50.0));
                    let y = rng.random_range(50.0..=(bounds.height - 50.0).max(50.0));
                    self.pos = Vec2::new(x.floor(), y.floor());
                    self.vel = Vec2::ZERO;
                    timer = 0.0;
                    action = Some(EnemyAction::Blast { center: self.pos });
                }
                self.behavior = Behavior::Boss {
                    phase,
                    phase_timer_ms: timer,
                    last_shot,
                };
                action
            }
        }
    }

    fn boss_shot(&self, dir: Vec2, now: u64) -> Projectile {
        Projectile {
            pos: self.pos + dir * (self.size + 6.0),
            dir,
            owner: ProjectileOwner::Boss,
            kind: ProjectileKind::BossShot,
            weapon: None,
            speed: BULLET_SPEED * 0.7,
            radius: 8.0,
            damage: BOSS_SHOT_DAMAGE,
            color: palette::PURPLE,
            spawn_time: now,
            lifetime_ms: BULLET_LIFETIME_MS,
            fuse_ms: None,
            detonated: false,
            alive: true,
        }
    }
}

impl Combatant for Enemy {
    fn pos(&self) -> Vec2 {
        self.pos
    }
    fn size(&self) -> f32 {
        self.size
    }
    fn hp(&self) -> i32 {
        self.hp
    }
    fn max_hp(&self) -> i32 {
        self.max_hp
    }
    fn set_hp(&mut self, hp: i32) {
        self.hp = hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn bounds() -> Bounds {
        Bounds::new(1200.0, 700.0)
    }

    #[test]
    fn test_normal_hp_scales_with_level() {
        let mut rng = Pcg32::seed_from_u64(1);
        for level in 1..10 {
            let e = Enemy::spawn(EnemyKind::Normal, Vec2::ZERO, level, &mut rng);
            let l = level as i32;
            assert!(e.hp >= 18 + 2 * l && e.hp <= 30 + 3 * l);
            assert_eq!(e.hp, e.max_hp);
        }
    }

    #[test]
    fn test_chase_moves_toward_target() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut e = Enemy::spawn(EnemyKind::Fast, Vec2::ZERO, 1, &mut rng);
        e.update(1.0, 0, Vec2::new(1000.0, 0.0), false, &bounds(), &mut rng);
        assert!((e.pos.x - 180.0).abs() < 1e-3);
        let mut wet = Enemy::spawn(EnemyKind::Fast, Vec2::ZERO, 1, &mut rng);
        wet.update(1.0, 0, Vec2::new(1000.0, 0.0), true, &bounds(), &mut rng);
        assert!((wet.pos.x - 180.0 * RAIN_SPEED_DEBUFF).abs() < 1e-3);
    }

    #[test]
    fn test_teleporter_relocates_into_ring() {
        let mut rng = Pcg32::seed_from_u64(3);
        let target = Vec2::new(600.0, 350.0);
        let mut e = Enemy::spawn(EnemyKind::Teleporting, Vec2::ZERO, 1, &mut rng);
        e.update(DT, 0, target, false, &bounds(), &mut rng);
        let d = e.pos.distance(target);
        assert!((100.0..=300.0 + 1e-3).contains(&d));
        // Between teleports it walks
        let before = e.pos;
        e.update(DT, 1000, target, false, &bounds(), &mut rng);
        assert!(e.pos.distance(before) < 5.0);
        e.update(DT, 2001, target, false, &bounds(), &mut rng);
        assert_eq!(e.behavior, Behavior::Blink { last_teleport: Some(2001) });
    }

    #[test]
    fn test_boss_fires_three_way_spread() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(100.0, 100.0), 5, &mut rng);
        let action = boss.update(DT, 0, Vec2::new(600.0, 100.0), false, &bounds(), &mut rng);
        let Some(EnemyAction::Volley(shots)) = action else {
            panic!("expected a volley, got {action:?}");
        };
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|s| s.owner == ProjectileOwner::Boss && s.damage == 18));
        assert!((shots[0].speed - 490.0).abs() < 1e-3);
        // Cooldown holds the next volley
        let action = boss.update(DT, 500, Vec2::new(600.0, 100.0), false, &bounds(), &mut rng);
        assert!(action.is_none());
    }

    #[test]
    fn test_boss_phase_transition_is_one_way() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(100.0, 100.0), 5, &mut rng);
        boss.hp = 249;
        let action = boss.update(DT, 0, Vec2::ZERO, false, &bounds(), &mut rng);
        assert_eq!(action, Some(EnemyAction::PhaseChanged(BossPhase::Enraged)));
        boss.hp = 500;
        boss.update(DT, 10, Vec2::ZERO, false, &bounds(), &mut rng);
        assert_eq!(boss.boss_phase(), Some(BossPhase::Enraged));
    }

    #[test]
    fn test_enraged_boss_blasts_every_two_seconds() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(100.0, 100.0), 5, &mut rng);
        boss.hp = 100;
        boss.update(DT, 0, Vec2::ZERO, false, &bounds(), &mut rng);
        let mut blasts = 0;
        for i in 1..=200u64 {
            let now = i * 1000 / 60;
            if let Some(EnemyAction::Blast { center }) =
                boss.update(DT, now, Vec2::ZERO, false, &bounds(), &mut rng)
            {
                assert!(center.x >= 50.0 && center.x <= 1150.0);
                assert!(center.y >= 50.0 && center.y <= 650.0);
                blasts += 1;
            }
        }
        assert_eq!(blasts, 1);
    }
}
