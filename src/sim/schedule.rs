//! Scheduled world events driven by the simulation clock
//!
//! Each periodic event keeps an explicit `next_fire` timestamp. The clock
//! only advances while the run is `Playing`, so pausing suspends every timer.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::enemy::{Enemy, EnemyKind};
use super::state::{GameEvent, Mine, World};

pub const ENEMY_SPAWN_INTERVAL_MS: u64 = 1200;
pub const MINE_SPAWN_INTERVAL_MS: u64 = 5000;
pub const COMBO_DECAY_INTERVAL_MS: u64 = 3000;

/// Levels at which a boss replaces the regular spawn
pub const BOSS_LEVEL_EVERY: u32 = 5;
/// Chance per tick of a spawn when the arena is empty
pub const FALLBACK_SPAWN_CHANCE: f64 = 0.02;

/// Regular spawn mix
const SPAWN_TABLE: [(EnemyKind, f32); 5] = [
    (EnemyKind::Normal, 0.40),
    (EnemyKind::Fast, 0.20),
    (EnemyKind::Armored, 0.15),
    (EnemyKind::Flying, 0.15),
    (EnemyKind::Teleporting, 0.10),
];

/// Fixed-period timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub interval_ms: u64,
    pub next_fire: u64,
}

impl Timer {
    pub fn starting_at(now: u64, interval_ms: u64) -> Self {
        Self {
            interval_ms,
            next_fire: now + interval_ms,
        }
    }

    /// True at most once per call; a late timer re-anchors instead of bursting
    pub fn poll(&mut self, now: u64) -> bool {
        if now < self.next_fire {
            return false;
        }
        self.next_fire += self.interval_ms;
        if self.next_fire <= now {
            self.next_fire = now + self.interval_ms;
        }
        true
    }
}

/// Rain cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weather {
    pub raining: bool,
    pub next_change: u64,
}

impl Weather {
    fn clear(now: u64, rng: &mut impl Rng) -> Self {
        Self {
            raining: false,
            next_change: now + rng.random_range(15_000..=30_000),
        }
    }

    /// Flip between clear and rain; returns the new raining state
    fn toggle(&mut self, now: u64, rng: &mut impl Rng) -> bool {
        if self.raining {
            *self = Self::clear(now, rng);
        } else {
            self.raining = true;
            self.next_change = now + rng.random_range(10_000..=25_000);
        }
        self.raining
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pub enemy_spawn: Timer,
    pub mine_spawn: Timer,
    pub combo_decay: Timer,
    pub weather: Weather,
}

impl Scheduler {
    pub fn new(now: u64, rng: &mut impl Rng) -> Self {
        Self {
            enemy_spawn: Timer::starting_at(now, ENEMY_SPAWN_INTERVAL_MS),
            mine_spawn: Timer::starting_at(now, MINE_SPAWN_INTERVAL_MS),
            combo_decay: Timer::starting_at(now, COMBO_DECAY_INTERVAL_MS),
            weather: Weather::clear(now, rng),
        }
    }
}

/// Fire everything that is due at the world's current time
pub fn run_due(world: &mut World) {
    let now = world.now_ms;

    if world.schedule.enemy_spawn.poll(now) {
        spawn_wave(world);
    }
    if world.schedule.mine_spawn.poll(now) {
        let pos = world.random_point(50.0);
        log::debug!("Mine placed at ({:.0}, {:.0})", pos.x, pos.y);
        world.mines.push(Mine::new(pos));
    }
    if world.schedule.combo_decay.poll(now) {
        world.player.combo.decay(now);
    }
    if now >= world.schedule.weather.next_change {
        let raining = world.schedule.weather.toggle(now, &mut world.rng);
        log::info!("Weather changed: {}", if raining { "rain" } else { "clear" });
        world.emit(GameEvent::WeatherChanged { raining });
    }
}

/// Periodic spawn: either a level-up (with a boss every fifth level) or one enemy
pub fn spawn_wave(world: &mut World) {
    let player = &mut world.player;
    if player.kills >= player.level * 10 {
        player.level += 1;
        let level = player.level;
        log::info!("Level up: {level}");
        world.emit(GameEvent::LevelUp(level));
        if level % BOSS_LEVEL_EVERY == 0 {
            let width = world.bounds().width;
            let x = world.rng.random_range(100.0..=(width - 100.0).max(100.0));
            let boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(x.floor(), -60.0), level, &mut world.rng);
            world.spawn_enemy(boss);
        }
    } else {
        spawn_regular(world);
    }
}

/// One enemy just outside a random edge, type chosen by the spawn table
pub fn spawn_regular(world: &mut World) {
    let bounds = world.bounds();
    let rng = &mut world.rng;
    let along_x = rng.random_range(20.0..=(bounds.width - 20.0).max(20.0));
    let along_y = rng.random_range(20.0..=(bounds.height - 20.0).max(20.0));
    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(along_x, -30.0),
        1 => Vec2::new(along_x, bounds.height + 30.0),
        2 => Vec2::new(-30.0, along_y),
        _ => Vec2::new(bounds.width + 30.0, along_y),
    };

    let kind = match WeightedIndex::new(SPAWN_TABLE.iter().map(|(_, w)| *w)) {
        Ok(dist) => SPAWN_TABLE[dist.sample(rng)].0,
        Err(_) => EnemyKind::Normal,
    };
    let level = world.player.level;
    let enemy = Enemy::spawn(kind, pos.floor(), level, &mut world.rng);
    log::debug!("Spawned {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
    world.spawn_enemy(enemy);
}

/// Keep the arena from staying empty
pub fn fallback_spawn(world: &mut World) {
    if world.enemies.is_empty() && world.rng.random_bool(FALLBACK_SPAWN_CHANCE) {
        spawn_regular(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::empty_world;

    #[test]
    fn test_timer_fires_on_period() {
        let mut t = Timer::starting_at(0, 1200);
        assert!(!t.poll(1199));
        assert!(t.poll(1200));
        assert!(!t.poll(1300));
        assert!(t.poll(2400));
        // Far behind: fires once, then re-anchors
        assert!(t.poll(10_000));
        assert!(!t.poll(10_001));
        assert_eq!(t.next_fire, 11_200);
    }

    #[test]
    fn test_weather_cycle_durations() {
        let mut world = empty_world(21);
        let first = world.schedule.weather.next_change;
        assert!((15_000..=30_000).contains(&first));
        assert!(!world.is_raining());

        world.now_ms = first;
        run_due(&mut world);
        assert!(world.is_raining());
        let rain_for = world.schedule.weather.next_change - first;
        assert!((10_000..=25_000).contains(&rain_for));
        assert!(world.events.contains(&GameEvent::WeatherChanged { raining: true }));

        world.now_ms = world.schedule.weather.next_change;
        run_due(&mut world);
        assert!(!world.is_raining());
    }

    #[test]
    fn test_spawn_regular_outside_edges() {
        let mut world = empty_world(22);
        for _ in 0..50 {
            spawn_regular(&mut world);
        }
        let b = world.bounds();
        for e in &world.enemies {
            let outside = e.pos.x < 0.0 || e.pos.y < 0.0 || e.pos.x > b.width || e.pos.y > b.height;
            assert!(outside, "spawned inside at {:?}", e.pos);
        }
        assert_eq!(world.enemies.len(), 50);
    }

    #[test]
    fn test_level_up_spawns_boss_on_fifth_level() {
        let mut world = empty_world(23);
        world.player.level = 4;
        world.player.kills = 40;
        spawn_wave(&mut world);
        assert_eq!(world.player.level, 5);
        assert_eq!(world.enemies.len(), 1);
        assert!(world.enemies[0].is_boss());
        assert_eq!(world.enemies[0].pos.y, -60.0);
        assert!(world.events.contains(&GameEvent::BossSpawned));
    }

    #[test]
    fn test_level_up_without_boss_spawns_nothing() {
        let mut world = empty_world(24);
        world.player.kills = 10;
        spawn_wave(&mut world);
        assert_eq!(world.player.level, 2);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_mines_spawn_with_margin() {
        let mut world = empty_world(25);
        for i in 1..=10u64 {
            world.now_ms = i * MINE_SPAWN_INTERVAL_MS;
            run_due(&mut world);
        }
        assert_eq!(world.mines.len(), 10);
        for m in &world.mines {
            assert!(m.pos.x >= 50.0 && m.pos.x <= 1150.0);
            assert!(m.pos.y >= 50.0 && m.pos.y <= 650.0);
        }
    }
}
