//! Fixed timestep simulation tick
//!
//! Advances one run by a single step in a fixed order: scheduled events,
//! player intents, movement, weapons, enemies, combat, particles, win check.

use glam::Vec2;

use super::combat;
use super::enemy::EnemyAction;
use super::schedule;
use super::state::{Burst, GameEvent, GamePhase, World};
use super::weapons::{self, FireOutcome, WeaponId};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; normalized by the player update
    pub move_dir: Vec2,
    /// Aim point in playfield coordinates (keeps the last one when `None`)
    pub aim: Option<Vec2>,
    /// Trigger held
    pub fire: bool,
    /// Start a dash
    pub dash: bool,
    /// Raise the shield skill
    pub shield: bool,
    /// Switch directly to a weapon (ignored if locked)
    pub select_weapon: Option<WeaponId>,
    /// Cycle through unlocked weapons: +1 forward, -1 backward
    pub cycle_weapon: i32,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if input.pause {
        match world.phase {
            GamePhase::Playing => {
                world.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => world.phase = GamePhase::Playing,
            GamePhase::GameOver { .. } => {}
        }
    }

    // Timers are frozen while paused or after the run ends
    if world.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(world, &mut input);
    }
    let input = &input;

    world.advance_clock(dt);
    let now = world.now_ms;

    schedule::run_due(world);

    switch_weapon(world, input);

    if input.dash && world.player.start_dash(now) {
        let pos = world.player.pos;
        world.burst(Burst::Sparks, pos, 6);
        world.emit(GameEvent::DashStarted);
    }
    if input.shield && world.player.activate_shield_skill(now, &mut world.rng) {
        log::debug!("Shield skill raised");
        world.emit(GameEvent::ShieldRaised);
    }

    let raining = world.is_raining();
    let bounds = world.bounds();
    world.player.update(dt, input.move_dir, raining, &bounds);

    if let Some(aim) = input.aim {
        world.aim = aim;
    }
    if input.fire {
        pull_trigger(world);
    }

    update_enemies(world, dt);

    combat::resolve(world, dt);

    world.update_particles(dt);
    schedule::fallback_spawn(world);

    if world.player.kills >= world.config.win_kills {
        world.end_run(true);
    }
}

fn pull_trigger(world: &mut World) {
    let now = world.now_ms;
    let bounds = world.bounds();
    let aim = world.aim;
    let weapon = world.player.weapon;
    match weapons::fire(&mut world.player, aim, now, &bounds, &mut world.rng) {
        FireOutcome::Rejected(_) => {}
        FireOutcome::Projectiles(shots) => {
            if let Some(first) = shots.first() {
                let muzzle = first.pos;
                world.burst(Burst::Sparks, muzzle, 2);
            }
            world.projectiles.extend(shots);
            world.emit(GameEvent::Shot { weapon });
        }
        FireOutcome::AreaArmed => {
            let pos = world.player.pos;
            world.burst(Burst::Blood, pos, 20);
            world.emit(GameEvent::AreaArmed);
        }
        FireOutcome::Teleported { to } => {
            world.burst(Burst::Sparks, to, 10);
            world.emit(GameEvent::Teleported { to });
        }
    }
}

/// Direct selection or cycling; locked weapons are skipped silently
fn switch_weapon(world: &mut World, input: &TickInput) {
    if let Some(id) = input.select_weapon {
        if world.unlocked.contains(&id) {
            world.player.weapon = id;
        }
    }
    let step = input.cycle_weapon.signum();
    if step == 0 {
        return;
    }
    let mut candidate = world.player.weapon;
    for _ in 0..WeaponId::ALL.len() {
        candidate = candidate.cycled(step);
        if world.unlocked.contains(&candidate) {
            world.player.weapon = candidate;
            return;
        }
    }
}

fn update_enemies(world: &mut World, dt: f32) {
    let now = world.now_ms;
    let target = world.player.pos;
    let raining = world.is_raining();
    let bounds = world.bounds();

    for i in 0..world.enemies.len() {
        let action = world.enemies[i].update(dt, now, target, raining, &bounds, &mut world.rng);
        match action {
            None => {}
            Some(EnemyAction::PhaseChanged(phase)) => world.emit(GameEvent::BossPhaseChanged(phase)),
            Some(EnemyAction::Volley(shots)) => world.projectiles.extend(shots),
            Some(EnemyAction::Blast { center }) => {
                let id = world.enemies[i].id;
                combat::boss_blast(world, id, center);
            }
        }
    }
}

/// Demo AI: kite the nearest enemy, shoot at it, grab pickups when safe
fn autopilot(world: &World, input: &mut TickInput) {
    let me = world.player.pos;
    let nearest = world
        .enemies
        .iter()
        .filter(|e| !e.dead)
        .min_by(|a, b| a.pos.distance_squared(me).total_cmp(&b.pos.distance_squared(me)));

    match nearest {
        Some(enemy) => {
            let dist = enemy.pos.distance(me);
            input.aim = Some(enemy.pos);
            input.fire = true;
            if dist < 200.0 {
                // Back away with a slight strafe
                let away = (me - enemy.pos).normalize_or_zero();
                let strafe = Vec2::new(-away.y, away.x) * 0.5;
                input.move_dir = away + strafe;
                input.dash = dist < 80.0;
            } else if let Some(pickup) = nearest_pickup(world, me) {
                input.move_dir = pickup - me;
            } else {
                input.move_dir = (world.bounds().center() - me) * 0.01;
            }
        }
        None => {
            if let Some(pickup) = nearest_pickup(world, me) {
                input.move_dir = pickup - me;
            }
        }
    }

    if world.player.hp < world.player.max_hp / 3 {
        input.shield = true;
    }
}

fn nearest_pickup(world: &World, from: Vec2) -> Option<Vec2> {
    world
        .pickups
        .iter()
        .map(|p| p.pos)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::state::test_support::empty_world;
    use crate::sim::state::Mine;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tick_pause() {
        let mut world = empty_world(31);
        let input = TickInput::default();
        tick(&mut world, &input, SIM_DT);
        let t = world.now_ms;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &pause, SIM_DT);
        assert_eq!(world.phase, GamePhase::Paused);
        for _ in 0..100 {
            tick(&mut world, &input, SIM_DT);
        }
        assert_eq!(world.now_ms, t);

        tick(&mut world, &pause, SIM_DT);
        assert_eq!(world.phase, GamePhase::Playing);
        assert!(world.now_ms > t);
    }

    #[test]
    fn test_mine_game_over_once() {
        let mut world = empty_world(32);
        world.player.hp = 15;
        let pos = world.player.pos;
        world.mines.push(Mine::new(pos));
        world.mines.push(Mine::new(pos));
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert!(world.is_over());
        assert_eq!(world.player.hp, 0);
        let game_overs = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        let frozen = world.now_ms;
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.now_ms, frozen);
    }

    #[test]
    fn test_win_at_kill_threshold() {
        let mut world = empty_world(33);
        world.player.kills = world.config.win_kills;
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.phase, GamePhase::GameOver { won: true });
    }

    #[test]
    fn test_fire_spawns_projectile_and_event() {
        let mut world = empty_world(34);
        let input = TickInput {
            aim: Some(Vec2::new(1100.0, 350.0)),
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.projectiles.len(), 1);
        assert!(world.events.contains(&GameEvent::Shot { weapon: WeaponId::Pistol }));
        assert!(world.projectiles[0].dir.x > 0.99);
    }

    #[test]
    fn test_weapon_cycling_skips_locked() {
        let mut world = empty_world(35);
        world.unlocked = [WeaponId::Pistol, WeaponId::Sniper, WeaponId::Laser]
            .into_iter()
            .collect();
        let forward = TickInput {
            cycle_weapon: 1,
            ..Default::default()
        };
        tick(&mut world, &forward, SIM_DT);
        assert_eq!(world.player.weapon, WeaponId::Sniper);
        tick(&mut world, &forward, SIM_DT);
        assert_eq!(world.player.weapon, WeaponId::Laser);
        tick(&mut world, &forward, SIM_DT);
        assert_eq!(world.player.weapon, WeaponId::Pistol);
        let back = TickInput {
            cycle_weapon: -1,
            ..Default::default()
        };
        tick(&mut world, &back, SIM_DT);
        assert_eq!(world.player.weapon, WeaponId::Laser);

        let locked = TickInput {
            select_weapon: Some(WeaponId::Bfg),
            ..Default::default()
        };
        tick(&mut world, &locked, SIM_DT);
        assert_eq!(world.player.weapon, WeaponId::Laser);
    }

    #[test]
    fn test_rocket_kill_scores_fifteen() {
        let mut world = empty_world(36);
        let mut rng = Pcg32::seed_from_u64(1);
        world.player.weapon = WeaponId::Rocket;
        let target = world.player.pos + Vec2::new(150.0, 0.0);
        let mut enemy = Enemy::spawn(EnemyKind::Fast, target, 1, &mut rng);
        enemy.speed = 0.0;
        world.spawn_enemy(enemy);
        let input = TickInput {
            aim: Some(target),
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        let idle = TickInput::default();
        for _ in 0..60 {
            if world.player.kills > 0 {
                break;
            }
            tick(&mut world, &idle, SIM_DT);
        }
        assert_eq!(world.player.kills, 1);
        assert_eq!(world.player.score, 15);
        assert_eq!(world.player.ammo_of(WeaponId::Rocket), 7);
    }

    #[test]
    fn test_autopilot_survives_a_while() {
        let mut world = empty_world(37);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut world, &input, SIM_DT);
        }
        assert!(world.now_ms > 9000 || world.is_over());
        assert!(world.player.hp >= 0);
    }
}
