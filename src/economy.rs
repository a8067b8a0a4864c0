//! In-run currency and upgrade tracks
//!
//! Crystals credit a single integer balance. Six upgrade tracks each have a
//! short cost table and a value formula derived from the base player config;
//! buying a level debits the balance and re-applies the stat to the ship
//! immediately.

use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::sim::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKey {
    BulletDamage,
    FireRate,
    DoubleShot,
    MaxHp,
    MissileCooldown,
    MissileCount,
}

impl UpgradeKey {
    pub const ALL: [UpgradeKey; 6] = [
        UpgradeKey::BulletDamage,
        UpgradeKey::FireRate,
        UpgradeKey::DoubleShot,
        UpgradeKey::MaxHp,
        UpgradeKey::MissileCooldown,
        UpgradeKey::MissileCount,
    ];

    /// Cost of each level, indexed by the level being bought from
    pub fn costs(self) -> &'static [u32] {
        match self {
            UpgradeKey::BulletDamage => &[25, 45, 70],
            UpgradeKey::FireRate => &[20, 40, 65],
            UpgradeKey::DoubleShot => &[50],
            UpgradeKey::MaxHp => &[30, 50, 75],
            UpgradeKey::MissileCooldown => &[35, 55, 80],
            UpgradeKey::MissileCount => &[60],
        }
    }

    pub fn max_level(self) -> u32 {
        self.costs().len() as u32
    }

    /// Price of buying the next level from `level`, None when maxed
    pub fn cost(self, level: u32) -> Option<u32> {
        self.costs().get(level as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKey::BulletDamage => "Bullet Damage",
            UpgradeKey::FireRate => "Fire Rate",
            UpgradeKey::DoubleShot => "Double Shot",
            UpgradeKey::MaxHp => "Max HP",
            UpgradeKey::MissileCooldown => "Missile Cooldown",
            UpgradeKey::MissileCount => "Missile Count",
        }
    }
}

/// Integer `base * num^level / den^level`, rounding down once at the end
fn scaled(base: u64, num: u64, den: u64, level: u32) -> u64 {
    base * num.pow(level) / den.pow(level)
}

fn millis(seconds: f32) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Stat values for a given upgrade level
pub mod values {
    use super::*;

    pub fn bullet_damage(level: u32, config: &PlayerConfig) -> i32 {
        scaled(config.bullet_damage.max(0) as u64, 10 + 2 * level as u64, 10, 1) as i32
    }

    /// Seconds between shots
    pub fn fire_interval(level: u32, config: &PlayerConfig) -> f32 {
        scaled(millis(config.fire_interval), 9, 10, level) as f32 / 1000.0
    }

    pub fn shot_count(level: u32) -> u32 {
        1 + level
    }

    pub fn max_hp(level: u32, config: &PlayerConfig) -> i32 {
        scaled(config.max_hp.max(0) as u64, 10 + 2 * level as u64, 10, 1) as i32
    }

    /// Seconds per missile recharge
    pub fn missile_recharge(level: u32, config: &PlayerConfig) -> f32 {
        scaled(millis(config.missile_recharge), 85, 100, level) as f32 / 1000.0
    }

    pub fn max_missiles(level: u32) -> u32 {
        1 + level
    }
}

/// Read model for the upgrade panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub key: UpgradeKey,
    pub level: u32,
    /// None once maxed
    pub cost: Option<u32>,
    pub maxed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub balance: u32,
    pub tracks: Vec<TrackSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Economy {
    pub balance: u32,
    levels: [u32; 6],
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(key: UpgradeKey) -> usize {
        key as usize
    }

    pub fn level(&self, key: UpgradeKey) -> u32 {
        self.levels[Self::slot(key)]
    }

    pub fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Whether `purchase(key)` would succeed right now
    pub fn can_afford(&self, key: UpgradeKey) -> bool {
        key.cost(self.level(key)).is_some_and(|c| self.balance >= c)
    }

    /// Buy the next level of `key`. No state changes unless it succeeds.
    pub fn purchase(&mut self, key: UpgradeKey, player: &mut Player, config: &PlayerConfig) -> bool {
        let level = self.level(key);
        let Some(cost) = key.cost(level) else {
            log::debug!("{} already maxed", key.name());
            return false;
        };
        if self.balance < cost {
            log::debug!("Cannot afford {} ({} < {cost})", key.name(), self.balance);
            return false;
        }
        self.balance -= cost;
        self.levels[Self::slot(key)] = level + 1;
        self.apply(key, player, config);
        log::info!("Purchased {} level {} for {cost}", key.name(), level + 1);
        true
    }

    /// Re-derive the stat governed by `key` on `player`
    pub fn apply(&self, key: UpgradeKey, player: &mut Player, config: &PlayerConfig) {
        let level = self.level(key);
        match key {
            UpgradeKey::BulletDamage => player.bullet_damage = values::bullet_damage(level, config),
            UpgradeKey::FireRate => player.fire_interval = values::fire_interval(level, config),
            UpgradeKey::DoubleShot => player.shot_count = values::shot_count(level),
            UpgradeKey::MaxHp => {
                let new_max = values::max_hp(level, config);
                if new_max != player.max_hp && player.max_hp > 0 {
                    // Keep the current HP ratio
                    player.hp = (player.hp as i64 * new_max as i64 / player.max_hp as i64) as i32;
                }
                player.max_hp = new_max;
                player.hp = player.hp.min(new_max);
            }
            UpgradeKey::MissileCooldown => player.missile_recharge = values::missile_recharge(level, config),
            UpgradeKey::MissileCount => {
                let new_max = values::max_missiles(level);
                let gained = new_max.saturating_sub(player.max_missiles);
                player.max_missiles = new_max;
                player.missiles = (player.missiles + gained).min(new_max);
            }
        }
    }

    /// Apply every track to a fresh ship (full HP and missiles)
    pub fn apply_all(&self, player: &mut Player, config: &PlayerConfig) {
        for key in UpgradeKey::ALL {
            self.apply(key, player, config);
        }
        player.hp = player.max_hp;
        player.missiles = player.max_missiles;
    }

    pub fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            balance: self.balance,
            tracks: UpgradeKey::ALL
                .iter()
                .map(|&key| {
                    let level = self.level(key);
                    TrackSnapshot {
                        key,
                        level,
                        cost: key.cost(level),
                        maxed: level >= key.max_level(),
                    }
                })
                .collect(),
        }
    }

    /// Cheapest affordable track, if any
    pub fn cheapest_affordable(&self) -> Option<UpgradeKey> {
        UpgradeKey::ALL
            .iter()
            .copied()
            .filter(|&k| self.can_afford(k))
            .min_by_key(|&k| key_cost(self, k))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn key_cost(economy: &Economy, key: UpgradeKey) -> u32 {
    key.cost(economy.level(key)).unwrap_or(u32::MAX)
}
