//! The boss encounter
//!
//! The boss drifts between random waypoints in the upper part of the arena,
//! is ringed by orbiting shields that eat projectiles, periodically summons
//! weakened spawners and fires bullet fans at the player. It grows more
//! aggressive in three phases driven purely by its remaining hit points.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::spawner::Difficulty;
use crate::config::{ArenaConfig, BossConfig};
use crate::consts::BOSS_ARRIVE_DISTANCE;
use crate::{angle_to, heading};

/// Phase (1..=3) for a hit-point fraction
pub fn phase_for(hp_fraction: f32, thresholds: [f32; 2]) -> u8 {
    if hp_fraction <= thresholds[1] {
        3
    } else if hp_fraction <= thresholds[0] {
        2
    } else {
        1
    }
}

/// Bullet angles of a symmetric fan centred on `base`
pub fn fan_angles(base: f32, count: u32, spread: f32) -> Vec<f32> {
    let mid = (count as f32 - 1.0) / 2.0;
    (0..count).map(|i| base + spread * (i as f32 - mid)).collect()
}

/// An orbiting shield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub pos: Vec2,
    pub radius: f32,
}

/// Summon request produced by a boss update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summon {
    pub pos: Vec2,
    pub difficulty: Difficulty,
}

/// Everything a boss decided during one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BossUpdate {
    pub summon: Option<Summon>,
    /// Bullet angles of a fan attack
    pub fan: Vec<f32>,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BossHit {
    pub destroyed: bool,
    pub phase_changed: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub radius: f32,
    pub phase: u8,
    pub waypoint: Vec2,
    pub shields: Vec<Shield>,
    /// Ids of live boss-summoned spawners
    pub summons: Vec<u32>,
    shield_angle: f32,
    move_timer: f32,
    summon_timer: f32,
    attack_timer: f32,
    destroyed: bool,
}

impl Boss {
    pub fn new(id: u32, pos: Vec2, config: &BossConfig) -> Self {
        let mut boss = Self {
            id,
            pos,
            hp: config.hp,
            max_hp: config.hp.max(1),
            radius: config.hit_radius,
            phase: 1,
            waypoint: pos,
            shields: vec![
                Shield {
                    pos,
                    radius: config.shield_radius,
                };
                config.shield_count
            ],
            summons: Vec::new(),
            shield_angle: 0.0,
            move_timer: 0.0,
            summon_timer: 0.0,
            attack_timer: 0.0,
            destroyed: false,
        };
        boss.place_shields(config);
        boss
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp.max(0) as f32 / self.max_hp as f32
    }

    fn phase_index(&self) -> usize {
        (self.phase.clamp(1, 3) - 1) as usize
    }

    /// Raise the phase if hit points call for it. Never lowers it.
    fn refresh_phase(&mut self, config: &BossConfig) -> Option<u8> {
        let next = self.phase.max(phase_for(self.hp_fraction(), config.phase_thresholds));
        if next != self.phase {
            self.phase = next;
            Some(next)
        } else {
            None
        }
    }

    fn place_shields(&mut self, config: &BossConfig) {
        let n = self.shields.len().max(1) as f32;
        for (i, shield) in self.shields.iter_mut().enumerate() {
            let angle = self.shield_angle + TAU / n * i as f32;
            shield.pos = self.pos + heading(angle) * config.shield_orbit;
        }
    }

    /// Advance movement, shields and attack timers
    pub fn update(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        arena: &ArenaConfig,
        config: &BossConfig,
        rng: &mut Pcg32,
    ) -> BossUpdate {
        let mut out = BossUpdate::default();
        if self.destroyed {
            return out;
        }
        let idx = self.phase_index();

        // Waypoint movement
        self.move_timer += dt;
        if self.move_timer >= config.retarget_interval {
            self.move_timer = 0.0;
            let m = config.waypoint_margin;
            let span = (arena.width - 2.0 * m).max(0.0);
            self.waypoint = Vec2::new(
                m + rng.random::<f32>() * span,
                m + rng.random::<f32>() * arena.height * config.waypoint_band,
            );
        }
        let to_waypoint = self.waypoint - self.pos;
        let distance = to_waypoint.length();
        if distance > BOSS_ARRIVE_DISTANCE {
            let step = (config.speed * dt).min(distance);
            self.pos += to_waypoint / distance * step;
        }

        self.shield_angle += config.shield_speed[idx] * dt;
        self.place_shields(config);

        // Summoning is gated on the live-summon cap; the timer holds while capped
        self.summon_timer += dt;
        if self.summon_timer >= config.summon_interval[idx] && self.summons.len() < config.summon_cap {
            self.summon_timer = 0.0;
            let angle = rng.random::<f32>() * TAU;
            let lo = config.summon_ring_min;
            let distance = lo + rng.random::<f32>() * (config.summon_ring_max - lo).max(0.0);
            let raw = self.pos + heading(angle) * distance;
            let pos = Vec2::new(
                raw.x.clamp(50.0, (arena.width - 50.0).max(50.0)),
                raw.y.clamp(50.0, (arena.height - 150.0).max(50.0)),
            );
            let difficulty = match self.phase {
                3 => Difficulty::Hard,
                2 => Difficulty::Medium,
                _ => Difficulty::Easy,
            };
            out.summon = Some(Summon { pos, difficulty });
        }

        self.attack_timer += dt;
        if self.attack_timer >= config.attack_interval[idx] {
            self.attack_timer = 0.0;
            if let Some(target) = player {
                out.fan = fan_angles(angle_to(self.pos, target), config.fan_count[idx], config.fan_spread);
            }
        }

        out
    }

    /// First shield overlapping a circle at `pos`
    pub fn shield_hit(&self, pos: Vec2, radius: f32) -> Option<&Shield> {
        if self.destroyed {
            return None;
        }
        self.shields
            .iter()
            .find(|s| s.pos.distance(pos) < s.radius + radius)
    }

    pub fn apply_damage(&mut self, amount: i32, config: &BossConfig) -> BossHit {
        if self.destroyed {
            return BossHit::default();
        }
        self.hp -= amount;
        let mut hit = BossHit {
            destroyed: false,
            phase_changed: self.refresh_phase(config),
        };
        if self.hp <= 0 {
            self.hp = 0;
            hit.destroyed = self.mark_destroyed();
        }
        hit
    }

    /// Flag as destroyed and drop the shields. Returns true only the first time.
    pub fn mark_destroyed(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.shields.clear();
        true
    }
}
