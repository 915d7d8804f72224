//! Per-tick combat resolution
//!
//! Runs after entities have moved. Enemies killed during resolution are only
//! flagged `dead`; they stop interacting immediately and are removed in one
//! `retain` pass at the end, so every kill is credited exactly once even when
//! overlapping blasts hit the same target.

use glam::Vec2;
use rand::Rng;

use super::enemy::{BOSS_BLAST_ENEMY_DAMAGE, BOSS_BLAST_PLAYER_DAMAGE};
use super::geometry::{self, circles_overlap, within};
use super::player::{AREA_DAMAGE_PER_TICK, AREA_DAMAGE_RADIUS, AREA_DAMAGE_TICK_MS};
use super::state::{
    Blast, BlastDamage, Burst, Combatant, GameEvent, KillSource, Pickup, PickupKind, PowerupKind,
    ProjectileKind, ProjectileOwner, World, DAMAGE_POWERUP_MS, DAMAGE_POWERUP_MULT,
    HEALTH_ORB_HEAL,
};
use super::weapons::WeaponId;
use crate::consts::*;

/// Gravity wells pull enemies within this range
pub const GRAVITY_RADIUS: f32 = 150.0;
/// Pull rate in px/s
pub const GRAVITY_PULL: f32 = 2.0;

/// Damage dealt to the player by touching an enemy (once per tick)
pub const CONTACT_DAMAGE: i32 = 12;
/// Push-back applied on contact
pub const CONTACT_PUSH: f32 = 8.0;
/// Contact triggers slightly inside the sum of radii
const CONTACT_SLACK: f32 = 6.0;

pub const ORB_DROP_CHANCE: f32 = 0.25;
pub const AMMO_DROP_CHANCE: f32 = 0.25;
pub const POWERUP_DROP_CHANCE: f32 = 0.12;

/// Base kill score when nothing else applies
pub const BASE_KILL_SCORE: u32 = 10;

/// Who gets credit for an enemy's death
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillCredit {
    pub source: KillSource,
    pub base_score: u32,
}

impl KillCredit {
    pub fn weapon(weapon: WeaponId, base_score: u32) -> Self {
        Self {
            source: KillSource::Weapon(weapon),
            base_score,
        }
    }
}

/// Run the whole resolution pipeline for one tick
pub fn resolve(world: &mut World, dt: f32) {
    advance_projectiles(world, dt);
    detonate_fuses(world);
    apply_gravity_wells(world, dt);
    projectile_hits(world);
    enemy_contact(world);
    boss_shots(world);
    mines(world);
    collect_pickups(world);
    area_pulse(world, dt);
    reap(world);
}

/// Move projectiles, steer homing ones, expire by lifetime/fuse/bounds
pub fn advance_projectiles(world: &mut World, dt: f32) {
    let dt_ms = dt * 1000.0;
    let now = world.now_ms;
    let bounds = world.bounds();

    for i in 0..world.projectiles.len() {
        if !world.projectiles[i].alive {
            continue;
        }
        if let ProjectileKind::Homing { turn_rate } = world.projectiles[i].kind {
            let pos = world.projectiles[i].pos;
            if let Some(target) = nearest_enemy(world, pos) {
                let p = &mut world.projectiles[i];
                let current = geometry::angle_of(p.dir);
                let wanted = geometry::angle_of(target - pos);
                let max_turn = turn_rate * dt;
                let turn = geometry::angle_delta(current, wanted).clamp(-max_turn, max_turn);
                p.dir = geometry::from_angle(current + turn);
            }
        }
        world.projectiles[i].update(dt, dt_ms, now, &bounds);
    }
}

fn nearest_enemy(world: &World, from: Vec2) -> Option<Vec2> {
    world
        .enemies
        .iter()
        .filter(|e| !e.dead)
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .total_cmp(&b.pos.distance_squared(from))
        })
        .map(|e| e.pos)
}

/// Burst every fused projectile whose fuse ran out
pub fn detonate_fuses(world: &mut World) {
    for i in 0..world.projectiles.len() {
        let p = &mut world.projectiles[i];
        if !p.detonated {
            continue;
        }
        p.detonated = false;
        let (pos, damage, weapon, kind) = (p.pos, p.damage, p.weapon, p.kind);
        if let ProjectileKind::Fused(blast) = kind {
            let credit = KillCredit::weapon(weapon.unwrap_or(WeaponId::Grenade), blast.score);
            explode(world, pos, blast, damage, Some(credit));
        }
    }
}

/// Drag enemies toward live gravity wells
pub fn apply_gravity_wells(world: &mut World, dt: f32) {
    let wells: Vec<Vec2> = world
        .projectiles
        .iter()
        .filter(|p| p.alive && p.kind == ProjectileKind::GravityWell)
        .map(|p| p.pos)
        .collect();

    for well in wells {
        for enemy in world.enemies.iter_mut().filter(|e| !e.dead) {
            let to_well = well - enemy.pos;
            if to_well.length_squared() > 0.0 && within(enemy.pos, well, GRAVITY_RADIUS) {
                enemy.pos += to_well.normalize() * GRAVITY_PULL * dt;
            }
        }
    }
}

/// Player projectiles against enemies
pub fn projectile_hits(world: &mut World) {
    for pi in 0..world.projectiles.len() {
        let p = &world.projectiles[pi];
        if !p.alive || p.owner != ProjectileOwner::Player {
            continue;
        }
        if matches!(p.kind, ProjectileKind::Fused(_) | ProjectileKind::GravityWell) {
            continue;
        }
        let (pos, radius, damage, kind) = (p.pos, p.radius, p.damage, p.kind);
        let weapon = p.weapon.unwrap_or(WeaponId::Pistol);

        for ei in 0..world.enemies.len() {
            let enemy = &world.enemies[ei];
            if enemy.dead || !circles_overlap(pos, radius, enemy.pos, enemy.size) {
                continue;
            }
            match kind {
                ProjectileKind::Beam => {
                    world.burst(Burst::Sparks, pos, 4);
                    damage_enemy(world, ei, damage, Some(KillCredit::weapon(weapon, BASE_KILL_SCORE)));
                }
                ProjectileKind::Explosive(blast) => {
                    explode(world, pos, blast, damage, Some(KillCredit::weapon(weapon, blast.score)));
                    world.projectiles[pi].alive = false;
                    break;
                }
                _ => {
                    world.burst(Burst::Sparks, pos, 4);
                    damage_enemy(world, ei, damage, Some(KillCredit::weapon(weapon, BASE_KILL_SCORE)));
                    world.projectiles[pi].alive = false;
                    break;
                }
            }
        }
    }
}

/// Area burst at `center`; `projectile_damage` is used for `BlastDamage::Projectile`
pub fn explode(
    world: &mut World,
    center: Vec2,
    blast: Blast,
    projectile_damage: i32,
    credit: Option<KillCredit>,
) {
    let amount = match blast.damage {
        BlastDamage::Fixed(d) => d,
        BlastDamage::Projectile => projectile_damage,
    };
    world.burst(Burst::Explosion, center, PARTICLE_COUNT * 3);
    world.emit(GameEvent::Explosion { pos: center });
    for ei in 0..world.enemies.len() {
        let enemy = &world.enemies[ei];
        if !enemy.dead && within(enemy.pos, center, blast.radius) {
            damage_enemy(world, ei, amount, credit);
        }
    }
}

/// The enraged boss detonates around itself
pub fn boss_blast(world: &mut World, boss_id: u32, center: Vec2) {
    world.burst(Burst::Explosion, center, PARTICLE_COUNT * 5);
    world.emit(GameEvent::Explosion { pos: center });
    for ei in 0..world.enemies.len() {
        let enemy = &world.enemies[ei];
        if enemy.id != boss_id && !enemy.dead && within(enemy.pos, center, EXPLOSION_RADIUS) {
            damage_enemy(world, ei, BOSS_BLAST_ENEMY_DAMAGE, None);
        }
    }
    if within(world.player.pos, center, EXPLOSION_RADIUS) {
        hurt_player(world, BOSS_BLAST_PLAYER_DAMAGE);
    }
}

/// Damage one enemy; on death mark it and, when credited, pay the reward
pub fn damage_enemy(world: &mut World, index: usize, amount: i32, credit: Option<KillCredit>) {
    let enemy = &mut world.enemies[index];
    if enemy.dead {
        return;
    }
    enemy.apply_damage(amount);
    let pos = enemy.pos;
    world.burst(Burst::Blood, pos, 6);
    if world.enemies[index].is_alive() {
        return;
    }
    world.enemies[index].dead = true;
    match credit {
        Some(credit) => reward_kill(world, index, credit),
        None => log::debug!("Enemy {} died without credit", world.enemies[index].id),
    }
}

fn reward_kill(world: &mut World, index: usize, credit: KillCredit) {
    let (pos, kind, boss) = {
        let e = &world.enemies[index];
        (e.pos, e.kind(), e.is_boss())
    };
    let now = world.now_ms;
    let player = &mut world.player;
    let score = (credit.base_score as f32 * player.combo.multiplier) as u64;
    player.score += score;
    player.kills += 1;
    player.combo.register_kill(now);
    let total = player.score;

    if let Some(reward) = world.mission.record_kill(credit.source, total) {
        world.mission_coins += reward;
        world.emit(GameEvent::MissionCompleted { reward });
    }
    world.emit(GameEvent::EnemyKilled {
        kind,
        source: credit.source,
        score,
    });

    if boss || world.rng.random::<f32>() < ORB_DROP_CHANCE {
        world.pickups.push(Pickup {
            pos,
            kind: PickupKind::HealthOrb,
        });
    }
    if boss || world.rng.random::<f32>() < AMMO_DROP_CHANCE {
        world.pickups.push(Pickup {
            pos,
            kind: PickupKind::AmmoBox,
        });
    }
    if world.rng.random::<f32>() < POWERUP_DROP_CHANCE {
        let buff = if world.rng.random::<bool>() {
            PowerupKind::Dash
        } else {
            PowerupKind::Damage
        };
        world.pickups.push(Pickup {
            pos,
            kind: PickupKind::Powerup(buff),
        });
    }
}

/// Route damage to the player through the shield; ends the run at zero HP
pub fn hurt_player(world: &mut World, amount: i32) {
    let report = world.player.absorb_damage(amount);
    let pos = world.player.pos;
    world.burst(Burst::Blood, pos, 8);
    world.emit(GameEvent::PlayerHurt {
        damage: report.hp_lost,
        absorbed: report.absorbed,
    });
    if !world.player.is_alive() {
        world.end_run(false);
    }
}

/// Touching enemies push the player back and deal contact damage once
pub fn enemy_contact(world: &mut World) {
    let mut touched = false;
    for ei in 0..world.enemies.len() {
        let enemy = &world.enemies[ei];
        if enemy.dead {
            continue;
        }
        let reach = enemy.size + world.player.size - CONTACT_SLACK;
        if !within(enemy.pos, world.player.pos, reach) {
            continue;
        }
        let mut push = world.player.pos - enemy.pos;
        if push.length_squared() == 0.0 {
            push = Vec2::new(
                world.rng.random_range(-1.0..=1.0),
                world.rng.random_range(-1.0..=1.0),
            );
        }
        let push = geometry::direction_or_right(push) * CONTACT_PUSH;
        world.player.pos += push;
        world.enemies[ei].pos -= push * 0.3;
        touched = true;
    }
    if touched {
        hurt_player(world, CONTACT_DAMAGE);
    }
}

/// Boss projectiles against the player
pub fn boss_shots(world: &mut World) {
    for pi in 0..world.projectiles.len() {
        let p = &world.projectiles[pi];
        if !p.alive || p.owner != ProjectileOwner::Boss {
            continue;
        }
        if circles_overlap(p.pos, p.radius, world.player.pos, world.player.size) {
            let damage = p.damage;
            world.projectiles[pi].alive = false;
            hurt_player(world, damage);
        }
    }
}

/// Mines detonate on the player or on the first enemy that touches them
pub fn mines(world: &mut World) {
    let mut mi = 0;
    while mi < world.mines.len() {
        let mine = world.mines[mi].clone();
        if circles_overlap(mine.pos, mine.size, world.player.pos, world.player.size) {
            world.mines.remove(mi);
            world.burst(Burst::Explosion, mine.pos, PARTICLE_COUNT * 3);
            world.emit(GameEvent::Explosion { pos: mine.pos });
            hurt_player(world, mine.damage);
            continue;
        }
        let victim = world
            .enemies
            .iter()
            .position(|e| !e.dead && circles_overlap(mine.pos, mine.size, e.pos, e.size));
        match victim {
            Some(ei) => {
                world.mines.remove(mi);
                world.burst(Burst::Explosion, mine.pos, PARTICLE_COUNT * 3);
                world.emit(GameEvent::Explosion { pos: mine.pos });
                let credit = KillCredit {
                    source: KillSource::Mine,
                    base_score: BASE_KILL_SCORE,
                };
                damage_enemy(world, ei, mine.damage, Some(credit));
            }
            None => mi += 1,
        }
    }
}

/// Pickups are consumed on touch
pub fn collect_pickups(world: &mut World) {
    let player_pos = world.player.pos;
    let player_size = world.player.size;
    let (taken, kept): (Vec<Pickup>, Vec<Pickup>) = std::mem::take(&mut world.pickups)
        .into_iter()
        .partition(|p| circles_overlap(p.pos, p.kind.size(), player_pos, player_size));
    world.pickups = kept;

    for pickup in taken {
        let player = &mut world.player;
        match pickup.kind {
            PickupKind::HealthOrb => player.heal(HEALTH_ORB_HEAL),
            PickupKind::AmmoBox => {
                for id in WeaponId::ALL {
                    let refill = id.spec().refill;
                    if refill > 0 {
                        if let Some(ammo) = player.ammo.get_mut(&id) {
                            *ammo += refill;
                        }
                    }
                }
            }
            PickupKind::Powerup(PowerupKind::Dash) => player.dash.last_used = None,
            PickupKind::Powerup(PowerupKind::Damage) => {
                player.apply_damage_boost(DAMAGE_POWERUP_MULT, DAMAGE_POWERUP_MS)
            }
        }
        world.emit(GameEvent::PickupCollected(pickup.kind));
    }
}

/// Damage aura of the area-damage weapon
pub fn area_pulse(world: &mut World, dt: f32) {
    let now = world.now_ms;
    let player = &mut world.player;
    if player.weapon != WeaponId::AreaDamage || !player.area.is_active(now) {
        return;
    }
    player.area.tick_timer_ms -= dt * 1000.0;
    if player.area.tick_timer_ms > 0.0 {
        return;
    }
    player.area.tick_timer_ms = AREA_DAMAGE_TICK_MS;
    let center = player.pos;
    let reach_sq = AREA_DAMAGE_RADIUS * AREA_DAMAGE_RADIUS;
    for ei in 0..world.enemies.len() {
        let enemy = &world.enemies[ei];
        if !enemy.dead && enemy.pos.distance_squared(center) <= reach_sq {
            damage_enemy(
                world,
                ei,
                AREA_DAMAGE_PER_TICK,
                Some(KillCredit::weapon(WeaponId::AreaDamage, BASE_KILL_SCORE)),
            );
        }
    }
}

/// Drop dead enemies and spent projectiles
pub fn reap(world: &mut World) {
    world.enemies.retain(|e| !e.dead);
    world.projectiles.retain(|p| p.alive);
}
