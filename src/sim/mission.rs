//! Daily mission: one randomly rolled objective per session

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::KillSource;
use super::weapons::WeaponId;

/// Weapons eligible for the weapon-specific kill objective
pub const MISSION_WEAPONS: [WeaponId; 3] =
    [WeaponId::Shotgun, WeaponId::Machinegun, WeaponId::Sniper];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionGoal {
    Kills,
    Score,
    KillsWith(WeaponId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyMission {
    pub goal: MissionGoal,
    pub target: u64,
    pub progress: u64,
    pub reward: u64,
    pub completed: bool,
}

impl Default for DailyMission {
    fn default() -> Self {
        Self::kills(50, 100)
    }
}

impl DailyMission {
    pub fn kills(target: u64, reward: u64) -> Self {
        Self::new(MissionGoal::Kills, target, reward)
    }

    pub fn new(goal: MissionGoal, target: u64, reward: u64) -> Self {
        Self {
            goal,
            target,
            progress: 0,
            reward,
            completed: false,
        }
    }

    /// Pick one of the three templates with fresh parameters
    pub fn roll(rng: &mut impl Rng) -> Self {
        let mission = match rng.random_range(0..3) {
            0 => Self::new(
                MissionGoal::Kills,
                rng.random_range(30..=70),
                rng.random_range(50..=150),
            ),
            1 => Self::new(
                MissionGoal::Score,
                rng.random_range(500..=1500),
                rng.random_range(70..=200),
            ),
            _ => {
                let weapon = MISSION_WEAPONS
                    .choose(rng)
                    .copied()
                    .unwrap_or(WeaponId::Shotgun);
                Self::new(
                    MissionGoal::KillsWith(weapon),
                    rng.random_range(10..=30),
                    rng.random_range(80..=250),
                )
            }
        };
        log::debug!("Daily mission rolled: {}", mission.description());
        mission
    }

    pub fn description(&self) -> String {
        match self.goal {
            MissionGoal::Kills => format!("Kill {} enemies", self.target),
            MissionGoal::Score => format!("Reach a score of {}", self.target),
            MissionGoal::KillsWith(w) => format!("Kill {} enemies with the {}", self.target, w.name()),
        }
    }

    /// Record a rewarded kill; returns the reward the moment the mission completes
    pub fn record_kill(&mut self, source: KillSource, score: u64) -> Option<u64> {
        if self.completed {
            return None;
        }
        match self.goal {
            MissionGoal::Kills => self.progress += 1,
            MissionGoal::Score => self.progress = score,
            MissionGoal::KillsWith(weapon) => {
                if source == KillSource::Weapon(weapon) {
                    self.progress += 1;
                }
            }
        }
        if self.progress >= self.target {
            self.completed = true;
            log::info!("Daily mission complete, reward {} coins", self.reward);
            Some(self.reward)
        } else {
            None
        }
    }
}
