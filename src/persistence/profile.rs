//! Persisted per-user progress
//!
//! Records are decoded field by field: a malformed field falls back to its
//! default while the rest of the record is kept.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::sim::{UpgradeKind, Upgrades, WeaponId};

/// End-of-run aggregates plus shop state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub coins: u64,
    pub unlocked: BTreeSet<WeaponId>,
    pub upgrades: Upgrades,
    pub score: u64,
    pub kills: u32,
    pub weapon: WeaponId,
    pub ammo: BTreeMap<WeaponId, u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            coins: 0,
            unlocked: BTreeSet::from([WeaponId::Pistol]),
            upgrades: Upgrades::new(),
            score: 0,
            kills: 0,
            weapon: WeaponId::Pistol,
            ammo: WeaponId::default_ammo(),
        }
    }
}

impl Profile {
    /// Decode a stored record, replacing each unreadable field with its default
    ///
    /// Returns the profile and the errors for the fields that were dropped.
    pub fn from_value(value: &Value) -> (Self, Vec<Error>) {
        let mut profile = Self::default();
        let mut errors = Vec::new();

        let Some(record) = value.as_object() else {
            errors.push(invalid("<root>"));
            return (profile, errors);
        };

        if let Some(coins) = field(record, "coins", &mut errors) {
            profile.coins = coins;
        }
        if let Some(score) = field(record, "score", &mut errors) {
            profile.score = score;
        }
        if let Some(kills) = field(record, "kills", &mut errors) {
            profile.kills = kills;
        }
        if let Some(unlocked) = field::<BTreeSet<WeaponId>>(record, "unlocked", &mut errors) {
            profile.unlocked.extend(unlocked);
        }
        if let Some(weapon) = field(record, "weapon", &mut errors) {
            profile.weapon = weapon;
        }

        // Unknown weapons and upgrade names are skipped individually
        if let Some(raw) = field::<BTreeMap<String, Value>>(record, "ammo", &mut errors) {
            for (name, count) in raw {
                let id = serde_json::from_value::<WeaponId>(Value::String(name.clone()));
                match (id, count.as_u64()) {
                    (Ok(id), Some(n)) => {
                        profile.ammo.insert(id, n.min(u32::MAX as u64) as u32);
                    }
                    _ => log::debug!("Skipping ammo entry `{name}`"),
                }
            }
        }
        if let Some(raw) = field::<BTreeMap<String, Value>>(record, "upgrades", &mut errors) {
            for (name, level) in raw {
                match (UpgradeKind::parse(&name), level.as_u64()) {
                    (Some(kind), Some(n)) => {
                        profile.upgrades.insert(kind, n.min(u32::MAX as u64) as u32);
                    }
                    _ => log::debug!("Skipping upgrade entry `{name}`"),
                }
            }
        }

        if !profile.unlocked.contains(&profile.weapon) {
            profile.weapon = WeaponId::Pistol;
        }

        (profile, errors)
    }

    pub fn owns(&self, weapon: WeaponId) -> bool {
        self.unlocked.contains(&weapon)
    }

    pub fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades.get(&kind).copied().unwrap_or(0)
    }
}

fn invalid(name: &str) -> Error {
    Error::InvalidProfileData {
        field: name.to_string(),
    }
}

/// Missing fields are silent; present but malformed ones are reported
fn field<T: DeserializeOwned>(
    record: &serde_json::Map<String, Value>,
    name: &str,
    errors: &mut Vec<Error>,
) -> Option<T> {
    let raw = record.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(invalid(name));
            None
        }
    }
}
