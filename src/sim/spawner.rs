//! Spawners: stationary enemy emitters
//!
//! A spawner drips one enemy on a fixed interval, fires a burst when a screen
//! starts, and emits a bonus enemy each time its health drops into a lower
//! damage bucket. Once its hit points fall below the low-health threshold it
//! draws enemies from the next difficulty tier.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::enemy::EnemyKind;
use crate::config::SpawnerConfig;
use crate::heading;

/// Difficulty tier a spawner draws enemy types from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

impl Difficulty {
    /// One tier harder (elite stays elite)
    pub fn escalate(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard | Difficulty::Elite => Difficulty::Elite,
        }
    }

    /// Spawn weights, ordered like `EnemyKind::ALL`
    pub fn weights(self) -> [u32; 5] {
        match self {
            Difficulty::Easy => [80, 15, 5, 0, 0],
            Difficulty::Medium => [40, 25, 15, 15, 5],
            Difficulty::Hard => [20, 20, 20, 25, 15],
            Difficulty::Elite => [10, 15, 25, 30, 20],
        }
    }
}

/// Weighted random pick from a difficulty's table
pub fn select_enemy_type(difficulty: Difficulty, rng: &mut Pcg32) -> EnemyKind {
    let weights = difficulty.weights();
    let total: u32 = weights.iter().sum();
    let mut roll = rng.random_range(0..total);
    for (kind, weight) in EnemyKind::ALL.iter().zip(weights) {
        if roll < weight {
            return *kind;
        }
        roll -= weight;
    }
    EnemyKind::Scout
}

/// Who created a spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnerOwner {
    /// Placed by the wave controller for the current screen
    Screen,
    /// Summoned by the boss
    Boss,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnerHit {
    /// Health crossed into a lower bucket; emit one bonus enemy
    pub bonus_spawn: bool,
    /// This hit destroyed the spawner
    pub destroyed: bool,
}

/// A spawner entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub id: u32,
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub radius: f32,
    pub difficulty: Difficulty,
    pub owner: SpawnerOwner,
    /// Stops all emission (screen cleared) without destroying the spawner
    pub disabled: bool,
    destroyed: bool,
    drip_timer: f32,
    /// Last damage bucket reached, counts down from `buckets()`
    last_bucket: u32,
    damage_step: f32,
    low_hp_threshold: f32,
}

impl Spawner {
    pub fn new(id: u32, pos: Vec2, difficulty: Difficulty, owner: SpawnerOwner, config: &SpawnerConfig) -> Self {
        let damage_step = config.damage_spawn_step.clamp(0.01, 1.0);
        let mut spawner = Self {
            id,
            pos,
            hp: config.hp,
            max_hp: config.hp,
            radius: config.hit_radius,
            difficulty,
            owner,
            disabled: false,
            destroyed: false,
            drip_timer: 0.0,
            last_bucket: 0,
            damage_step,
            low_hp_threshold: config.low_hp_threshold,
        };
        spawner.last_bucket = spawner.buckets();
        spawner
    }

    /// Override hit points (boss summons are weaker)
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self.max_hp = hp.max(1);
        self
    }

    fn buckets(&self) -> u32 {
        (1.0 / self.damage_step).round() as u32
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp.max(0) as f32 / self.max_hp.max(1) as f32
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Alive and still counting toward screen completion
    pub fn is_active(&self) -> bool {
        !self.destroyed
    }

    /// May emit enemies
    pub fn can_emit(&self) -> bool {
        !self.destroyed && !self.disabled
    }

    /// Tier used for the next spawn (escalates when nearly dead)
    pub fn effective_difficulty(&self) -> Difficulty {
        if self.hp_fraction() < self.low_hp_threshold {
            self.difficulty.escalate()
        } else {
            self.difficulty
        }
    }

    /// Advance the drip timer. Returns true when a drip spawn is due.
    pub fn update(&mut self, dt: f32, drip_interval: f32) -> bool {
        if !self.can_emit() {
            return false;
        }
        self.drip_timer += dt;
        if self.drip_timer >= drip_interval {
            self.drip_timer = 0.0;
            return true;
        }
        false
    }

    /// Apply damage, reporting a bonus spawn or destruction
    pub fn apply_damage(&mut self, amount: i32) -> SpawnerHit {
        if self.destroyed {
            return SpawnerHit::default();
        }
        self.hp -= amount;

        let mut hit = SpawnerHit::default();
        if self.hp <= 0 {
            self.hp = 0;
            hit.destroyed = self.mark_destroyed();
            return hit;
        }

        let bucket = (self.hp_fraction() / self.damage_step).ceil() as u32;
        if bucket < self.last_bucket && !self.disabled {
            self.last_bucket = bucket;
            hit.bonus_spawn = true;
        }
        hit
    }

    /// Flag as destroyed. Returns true only the first time.
    pub fn mark_destroyed(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        true
    }

    /// Random point on the emission ring around the spawner
    pub fn spawn_point(&self, rng: &mut Pcg32, config: &SpawnerConfig) -> Vec2 {
        let angle = rng.random::<f32>() * TAU;
        let lo = config.spawn_ring_min.min(config.spawn_ring_max);
        let hi = config.spawn_ring_max.max(lo);
        let distance = lo + rng.random::<f32>() * (hi - lo);
        self.pos + heading(angle) * distance
    }
}

/// Number of enemies in an initial burst
pub fn burst_size(rng: &mut Pcg32, config: &SpawnerConfig) -> u32 {
    config.burst_base + rng.random_range(0..=config.burst_bonus)
}

/// Evenly spaced spawner positions across the arena width inside the safe band
pub fn screen_layout(count: u32, width: f32, rng: &mut Pcg32, config: &SpawnerConfig) -> Vec<Vec2> {
    let spacing = width / (count as f32 + 1.0);
    (0..count)
        .map(|i| {
            let y = config.band_top + rng.random::<f32>() * config.band_height;
            Vec2::new(spacing * (i as f32 + 1.0), y)
        })
        .collect()
}
