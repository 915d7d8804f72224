//! Coin shop: weapon unlocks and one-time upgrades

use super::Session;
use crate::sim::{UpgradeKind, WeaponId};

/// Result of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Bought { remaining: u64 },
    AlreadyOwned,
    InsufficientFunds { price: u64 },
}

impl Session {
    pub fn buy_weapon(&mut self, weapon: WeaponId) -> Purchase {
        if self.ctx.profile.owns(weapon) {
            return Purchase::AlreadyOwned;
        }
        let price = weapon.spec().price;
        let Some(remaining) = self.debit(price) else {
            return Purchase::InsufficientFunds { price };
        };
        self.ctx.profile.unlocked.insert(weapon);
        log::info!("Unlocked {} for {price} coins", weapon.name());
        self.persist();
        Purchase::Bought { remaining }
    }

    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Purchase {
        if self.ctx.profile.upgrade_level(kind) > 0 {
            return Purchase::AlreadyOwned;
        }
        let price = kind.price();
        let Some(remaining) = self.debit(price) else {
            return Purchase::InsufficientFunds { price };
        };
        self.ctx.profile.upgrades.insert(kind, 1);
        log::info!("Bought {} upgrade for {price} coins", kind.as_str());
        self.persist();
        Purchase::Bought { remaining }
    }

    fn debit(&mut self, price: u64) -> Option<u64> {
        let coins = &mut self.ctx.profile.coins;
        *coins = coins.checked_sub(price)?;
        Some(*coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn rich_session(coins: u64) -> Session {
        let mut session = Session::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()), 1);
        session.login("shopper");
        session.ctx.profile.coins = coins;
        session
    }

    #[test]
    fn test_buy_weapon() {
        let mut session = rich_session(120);
        assert_eq!(session.buy_weapon(WeaponId::Rocket), Purchase::Bought { remaining: 20 });
        assert!(session.ctx.profile.owns(WeaponId::Rocket));
        assert_eq!(session.buy_weapon(WeaponId::Rocket), Purchase::AlreadyOwned);
        assert_eq!(session.buy_weapon(WeaponId::Pistol), Purchase::AlreadyOwned);
        let saved = session.profile_store().load("shopper").unwrap();
        assert!(saved.owns(WeaponId::Rocket));
        assert_eq!(saved.coins, 20);
    }

    #[test]
    fn test_unaffordable_is_rejected_without_change() {
        let mut session = rich_session(99);
        assert_eq!(
            session.buy_upgrade(UpgradeKind::MaxHp),
            Purchase::InsufficientFunds { price: 100 }
        );
        assert_eq!(session.ctx.coins(), 99);
        assert_eq!(session.ctx.profile.upgrade_level(UpgradeKind::MaxHp), 0);
    }

    #[test]
    fn test_upgrade_once() {
        let mut session = rich_session(1000);
        assert_eq!(
            session.buy_upgrade(UpgradeKind::DamageMult),
            Purchase::Bought { remaining: 700 }
        );
        assert_eq!(session.buy_upgrade(UpgradeKind::DamageMult), Purchase::AlreadyOwned);
        assert_eq!(session.ctx.coins(), 700);
    }
}
