//! The player avatar: movement, timed skills, shield routing, combo

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Bounds;
use super::state::Combatant;
use super::weapons::WeaponId;
use crate::consts::*;

/// Permanent upgrades purchasable in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    MaxHp,
    Speed,
    DashCooldown,
    ShieldRegen,
    DamageMult,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::MaxHp,
        UpgradeKind::Speed,
        UpgradeKind::DashCooldown,
        UpgradeKind::ShieldRegen,
        UpgradeKind::DamageMult,
    ];

    /// Shop price in coins
    pub fn price(&self) -> u64 {
        match self {
            UpgradeKind::MaxHp => 100,
            UpgradeKind::Speed => 150,
            UpgradeKind::DashCooldown => 200,
            UpgradeKind::ShieldRegen => 250,
            UpgradeKind::DamageMult => 300,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::MaxHp => "max_hp",
            UpgradeKind::Speed => "speed",
            UpgradeKind::DashCooldown => "dash_cooldown",
            UpgradeKind::ShieldRegen => "shield_regen",
            UpgradeKind::DamageMult => "damage_mult",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

/// Upgrade levels keyed by kind; any level above zero grants the bonus
pub type Upgrades = BTreeMap<UpgradeKind, u32>;

fn has(upgrades: &Upgrades, kind: UpgradeKind) -> bool {
    upgrades.get(&kind).copied().unwrap_or(0) > 0
}

pub const DASH_DURATION_MS: f32 = 220.0;
pub const DASH_MULTIPLIER: f32 = 3.2;
pub const DASH_BASE_COOLDOWN_MS: u64 = 3000;

pub const MAX_SHIELD: f32 = 50.0;
pub const SHIELD_SKILL_DURATION_MS: f32 = 3000.0;
pub const SHIELD_SKILL_FIRST_COOLDOWN_MS: u64 = 7000;

pub const AREA_DAMAGE_WINDOW_MS: u64 = 5000;
pub const AREA_DAMAGE_RADIUS: f32 = 100.0;
pub const AREA_DAMAGE_PER_TICK: i32 = 2;
pub const AREA_DAMAGE_TICK_MS: f32 = 500.0;

/// Stats derived from upgrades
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub speed_bonus: f32,
    pub dash_cooldown_ms: u64,
    pub shield_regen_rate: f32,
    pub damage_mult_base: f32,
}

impl PlayerStats {
    pub fn from_upgrades(upgrades: &Upgrades) -> Self {
        let dash_cooldown_ms = if has(upgrades, UpgradeKind::DashCooldown) {
            DASH_BASE_COOLDOWN_MS * 4 / 5
        } else {
            DASH_BASE_COOLDOWN_MS
        };
        Self {
            speed_bonus: if has(upgrades, UpgradeKind::Speed) { 1.2 } else { 1.0 },
            dash_cooldown_ms,
            shield_regen_rate: 0.1 * if has(upgrades, UpgradeKind::ShieldRegen) { 1.5 } else { 1.0 },
            damage_mult_base: if has(upgrades, UpgradeKind::DamageMult) { 1.5 } else { 1.0 },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dash {
    pub active: bool,
    pub remaining_ms: f32,
    pub last_used: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ShieldSkill {
    pub active: bool,
    pub remaining_ms: f32,
    pub last_used: Option<u64>,
    pub cooldown_ms: u64,
}

impl Default for ShieldSkill {
    fn default() -> Self {
        Self {
            active: false,
            remaining_ms: 0.0,
            last_used: None,
            cooldown_ms: SHIELD_SKILL_FIRST_COOLDOWN_MS,
        }
    }
}

/// Kill-streak tracking
#[derive(Debug, Clone)]
pub struct Combo {
    pub count: u32,
    pub multiplier: f32,
    pub last_kill: Option<u64>,
}

impl Default for Combo {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            last_kill: None,
        }
    }
}

impl Combo {
    /// Register a kill at `now`
    pub fn register_kill(&mut self, now: u64) {
        let chained = self
            .last_kill
            .is_some_and(|t| now.saturating_sub(t) < COMBO_WINDOW_MS);
        if chained {
            self.count += 1;
            self.multiplier = 1.0 + self.count as f32 * 0.1;
        } else {
            self.count = 1;
            self.multiplier = 1.1;
        }
        self.last_kill = Some(now);
    }

    /// Periodic check: drop the streak if no kill landed inside the window
    pub fn decay(&mut self, now: u64) {
        let stale = self
            .last_kill
            .is_none_or(|t| now.saturating_sub(t) >= COMBO_WINDOW_MS);
        if stale {
            self.count = 0;
            self.multiplier = 1.0;
        }
    }
}

/// Area-damage weapon state
#[derive(Debug, Clone, Default)]
pub struct AreaPulse {
    pub last_used: Option<u64>,
    pub tick_timer_ms: f32,
}

impl AreaPulse {
    pub fn is_active(&self, now: u64) -> bool {
        self.last_used
            .is_some_and(|t| now.saturating_sub(t) < AREA_DAMAGE_WINDOW_MS)
    }
}

/// Result of routing damage through the shield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    pub absorbed: f32,
    pub hp_lost: i32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub weapon: WeaponId,
    pub ammo: BTreeMap<WeaponId, u32>,
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    pub stats: PlayerStats,
    pub last_shot: Option<u64>,
    pub dash: Dash,
    pub damage_mult: f32,
    pub damage_timer_ms: f32,
    pub shield_hp: f32,
    pub max_shield: f32,
    pub shield_skill: ShieldSkill,
    pub combo: Combo,
    pub area: AreaPulse,
}

impl Player {
    pub fn new(pos: Vec2, upgrades: &Upgrades) -> Self {
        let max_hp = max_hp_for(upgrades);
        Self {
            pos,
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            hp: max_hp,
            max_hp,
            weapon: WeaponId::Pistol,
            ammo: WeaponId::default_ammo(),
            score: 0,
            kills: 0,
            level: 1,
            stats: PlayerStats::from_upgrades(upgrades),
            last_shot: None,
            dash: Dash::default(),
            damage_mult: 1.0,
            damage_timer_ms: 0.0,
            shield_hp: 0.0,
            max_shield: MAX_SHIELD,
            shield_skill: ShieldSkill::default(),
            combo: Combo::default(),
            area: AreaPulse::default(),
        }
    }

    /// Re-derive stats after a purchase; a larger max HP heals the difference
    pub fn apply_upgrades(&mut self, upgrades: &Upgrades) {
        let old_max = self.max_hp;
        self.max_hp = max_hp_for(upgrades);
        if self.max_hp > old_max {
            self.hp += self.max_hp - old_max;
        }
        self.hp = self.hp.min(self.max_hp);
        self.stats = PlayerStats::from_upgrades(upgrades);
    }

    pub fn can_shoot(&self, now: u64) -> bool {
        let cooldown = self.weapon.spec().cooldown_ms;
        self.last_shot
            .is_none_or(|t| now.saturating_sub(t) >= cooldown)
    }

    pub fn dash_ready(&self, now: u64) -> bool {
        !self.dash.active
            && self
                .dash
                .last_used
                .is_none_or(|t| now.saturating_sub(t) >= self.stats.dash_cooldown_ms)
    }

    pub fn start_dash(&mut self, now: u64) -> bool {
        if !self.dash_ready(now) {
            return false;
        }
        self.dash.active = true;
        self.dash.remaining_ms = DASH_DURATION_MS;
        self.dash.last_used = Some(now);
        true
    }

    pub fn apply_damage_boost(&mut self, mult: f32, duration_ms: f32) {
        self.damage_mult = mult;
        self.damage_timer_ms = duration_ms;
    }

    pub fn shield_skill_ready(&self, now: u64) -> bool {
        self.shield_skill
            .last_used
            .is_none_or(|t| now.saturating_sub(t) >= self.shield_skill.cooldown_ms)
    }

    /// Raise the shield: full shield HP, immunity for the skill duration
    pub fn activate_shield_skill(&mut self, now: u64, rng: &mut impl Rng) -> bool {
        if !self.shield_skill_ready(now) {
            return false;
        }
        self.shield_skill.active = true;
        self.shield_skill.remaining_ms = SHIELD_SKILL_DURATION_MS;
        self.shield_skill.last_used = Some(now);
        self.shield_skill.cooldown_ms = rng.random_range(6000..=9000);
        self.shield_hp = self.max_shield;
        true
    }

    /// Route incoming damage: skill immunity, then shield HP, then health
    pub fn absorb_damage(&mut self, amount: i32) -> DamageReport {
        if self.shield_skill.active || amount <= 0 {
            return DamageReport {
                absorbed: 0.0,
                hp_lost: 0,
            };
        }
        let incoming = amount as f32;
        let absorbed = incoming.min(self.shield_hp);
        self.shield_hp = (self.shield_hp - incoming).max(0.0);
        let overflow = (incoming - absorbed).ceil() as i32;
        let before = self.hp;
        self.apply_damage(overflow);
        DamageReport {
            absorbed,
            hp_lost: before - self.hp,
        }
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Effective speed for this tick
    pub fn move_speed(&self, raining: bool) -> f32 {
        let mut speed = PLAYER_SPEED * self.stats.speed_bonus;
        if raining {
            speed *= RAIN_SPEED_DEBUFF;
        }
        if self.dash.active {
            speed *= DASH_MULTIPLIER;
        }
        speed
    }

    /// Movement, timed buffs and shield regeneration
    pub fn update(&mut self, dt: f32, move_dir: Vec2, raining: bool, bounds: &Bounds) {
        let dt_ms = dt * 1000.0;

        self.vel = if move_dir.length_squared() > 0.0 {
            move_dir.normalize() * self.move_speed(raining)
        } else {
            Vec2::ZERO
        };
        self.pos = bounds.clamp_with_radius(self.pos + self.vel * dt, self.size);

        if self.dash.active {
            self.dash.remaining_ms -= dt_ms;
            if self.dash.remaining_ms <= 0.0 {
                self.dash.active = false;
            }
        }

        if self.damage_timer_ms > 0.0 {
            self.damage_timer_ms -= dt_ms;
            if self.damage_timer_ms <= 0.0 {
                self.damage_mult = 1.0;
                self.damage_timer_ms = 0.0;
            }
        }

        if self.shield_skill.active {
            self.shield_skill.remaining_ms -= dt_ms;
            if self.shield_skill.remaining_ms <= 0.0 {
                self.shield_skill.active = false;
                self.shield_skill.remaining_ms = 0.0;
                self.shield_hp = 0.0;
            }
        }

        if !self.shield_skill.active && self.shield_hp < self.max_shield {
            self.shield_hp =
                (self.shield_hp + self.stats.shield_regen_rate * dt * 60.0).min(self.max_shield);
        }
    }

    pub fn ammo_of(&self, weapon: WeaponId) -> u32 {
        self.ammo.get(&weapon).copied().unwrap_or(0)
    }
}

fn max_hp_for(upgrades: &Upgrades) -> i32 {
    PLAYER_BASE_HP + if has(upgrades, UpgradeKind::MaxHp) { 50 } else { 0 }
}

impl Combatant for Player {
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
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player() -> Player {
        Player::new(Vec2::new(600.0, 350.0), &Upgrades::new())
    }

    #[test]
    fn test_upgrades_derive_stats() {
        let mut upgrades = Upgrades::new();
        upgrades.insert(UpgradeKind::MaxHp, 1);
        upgrades.insert(UpgradeKind::DashCooldown, 1);
        let p = Player::new(Vec2::ZERO, &upgrades);
        assert_eq!(p.max_hp, 150);
        assert_eq!(p.hp, 150);
        assert_eq!(p.stats.dash_cooldown_ms, 2400);
        assert_eq!(p.stats.speed_bonus, 1.0);
    }

    #[test]
    fn test_apply_upgrades_heals_difference() {
        let mut p = player();
        p.hp = 40;
        let mut upgrades = Upgrades::new();
        upgrades.insert(UpgradeKind::MaxHp, 1);
        p.apply_upgrades(&upgrades);
        assert_eq!(p.hp, 90);
        assert_eq!(p.max_hp, 150);
    }

    #[test]
    fn test_combo_sequence() {
        let mut c = Combo::default();
        c.register_kill(1000);
        assert_eq!(c.count, 1);
        assert!((c.multiplier - 1.1).abs() < 1e-6);
        c.register_kill(2000);
        assert!((c.multiplier - 1.2).abs() < 1e-6);
        c.register_kill(4000);
        assert!((c.multiplier - 1.3).abs() < 1e-6);
        // Gap longer than the window restarts the streak
        c.register_kill(7001);
        assert_eq!(c.count, 1);
        assert!((c.multiplier - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_combo_decay() {
        let mut c = Combo::default();
        c.register_kill(1000);
        c.decay(2000);
        assert_eq!(c.count, 1);
        c.decay(4000);
        assert_eq!(c.count, 0);
        assert_eq!(c.multiplier, 1.0);
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut p = player();
        p.shield_hp = 30.0;
        let report = p.absorb_damage(50);
        assert_eq!(p.shield_hp, 0.0);
        assert_eq!(p.hp, 80);
        assert_eq!(report.hp_lost, 20);
        assert_eq!(report.absorbed, 30.0);
    }

    #[test]
    fn test_shield_skill_grants_immunity() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(p.activate_shield_skill(0, &mut rng));
        assert_eq!(p.shield_hp, MAX_SHIELD);
        p.absorb_damage(80);
        assert_eq!(p.hp, 100);
        assert_eq!(p.shield_hp, MAX_SHIELD);
        assert!((6000..=9000).contains(&p.shield_skill.cooldown_ms));
        assert!(!p.activate_shield_skill(100, &mut rng));
    }

    #[test]
    fn test_shield_drops_when_skill_expires() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(4);
        let bounds = Bounds::new(1200.0, 700.0);
        p.activate_shield_skill(0, &mut rng);
        for _ in 0..200 {
            p.update(1.0 / 60.0, Vec2::ZERO, false, &bounds);
        }
        assert!(!p.shield_skill.active);
        // One regen tick may have run after expiry
        assert!(p.shield_hp < 1.0);
    }

    #[test]
    fn test_dash_cooldown() {
        let mut p = player();
        assert!(p.start_dash(0));
        assert!(!p.start_dash(100));
        let bounds = Bounds::new(1200.0, 700.0);
        p.update(0.25, Vec2::X, false, &bounds);
        assert!(!p.dash.active);
        assert!(!p.start_dash(2999));
        assert!(p.start_dash(3000));
    }

    #[test]
    fn test_movement_clamped_to_bounds() {
        let mut p = player();
        let bounds = Bounds::new(1200.0, 700.0);
        p.pos = Vec2::new(30.0, 30.0);
        p.update(1.0, Vec2::new(-1.0, -1.0), false, &bounds);
        assert_eq!(p.pos, Vec2::new(PLAYER_SIZE, PLAYER_SIZE));
    }

    #[test]
    fn test_rain_slows_player() {
        let p = player();
        assert!((p.move_speed(true) - PLAYER_SPEED * RAIN_SPEED_DEBUFF).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_shield_absorption_exact(shield in 0u32..=50, dmg in 0i32..200) {
            let mut p = player();
            p.shield_hp = shield as f32;
            p.absorb_damage(dmg);
            let s = shield as i32;
            prop_assert_eq!(p.shield_hp, (s - dmg).max(0) as f32);
            prop_assert_eq!(p.hp, (100 - (dmg - s).max(0)).max(0));
        }

        #[test]
        fn prop_damage_never_below_zero(hits in proptest::collection::vec(0i32..500, 1..10)) {
            let mut p = player();
            for h in hits {
                p.apply_damage(h);
                prop_assert!(p.hp >= 0 && p.hp <= p.max_hp);
            }
        }
    }
}
