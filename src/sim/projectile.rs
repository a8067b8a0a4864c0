//! Bullets and missiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ArenaConfig, MissileConfig};
use crate::heading;

/// Which side fired a bullet (selects its target group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Straight-line bullet with a fixed lifespan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub owner: BulletOwner,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub radius: f32,
    pub age: f32,
    pub lifespan: f32,
    pub active: bool,
}

impl Bullet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        owner: BulletOwner,
        pos: Vec2,
        angle: f32,
        speed: f32,
        damage: i32,
        radius: f32,
        lifespan: f32,
    ) -> Self {
        Self {
            id,
            owner,
            pos,
            vel: heading(angle) * speed,
            damage,
            radius,
            age: 0.0,
            lifespan,
            active: true,
        }
    }

    /// Move and age the bullet; deactivates it when expired or off-screen
    pub fn update(&mut self, dt: f32, arena: &ArenaConfig) {
        if !self.active {
            return;
        }
        self.pos += self.vel * dt;
        self.age += dt;
        if self.age >= self.lifespan || arena.is_offscreen(self.pos) {
            self.active = false;
        }
    }
}

/// Why a missile blew up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detonation {
    /// Reached its target point
    Target,
    /// Left the play bounds
    Bounds,
    /// Struck a boss shield
    Shield,
    /// Struck an enemy, spawner or the boss body
    Contact,
}

/// Homing-free missile flying toward a fixed target point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    pub id: u32,
    pub pos: Vec2,
    pub target: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Distance covered since launch
    pub traveled: f32,
    min_travel: f32,
    proximity: f32,
    exploded: bool,
}

impl Missile {
    /// Launch from a ship at `ship_pos` facing `angle`
    pub fn launch(id: u32, ship_pos: Vec2, angle: f32, muzzle: f32, config: &MissileConfig) -> Self {
        let dir = heading(angle);
        let mut target = ship_pos + dir * config.target_distance;
        if target.distance(ship_pos) < config.near_target {
            target = ship_pos + dir * config.extended_target;
        }
        Self {
            id,
            pos: ship_pos + dir * muzzle,
            target,
            vel: dir * config.speed,
            radius: config.hit_radius,
            traveled: 0.0,
            min_travel: config.min_travel,
            proximity: config.target_proximity,
            exploded: false,
        }
    }

    /// Armed missiles may detonate on contact or at their target
    pub fn is_armed(&self) -> bool {
        self.traveled >= self.min_travel
    }

    pub fn is_live(&self) -> bool {
        !self.exploded
    }

    /// Fly one step. Returns a detonation cause when the missile should blow up.
    pub fn update(&mut self, dt: f32, arena: &ArenaConfig) -> Option<Detonation> {
        if self.exploded {
            return None;
        }
        let step = self.vel * dt;
        self.pos += step;
        self.traveled += step.length();

        if arena.is_offscreen(self.pos) {
            return Some(Detonation::Bounds);
        }
        if self.is_armed() && self.pos.distance(self.target) < self.proximity {
            return Some(Detonation::Target);
        }
        None
    }

    /// Decide whether `cause` may detonate the missile now, and latch it.
    /// Returns false for an already exploded or unarmed-contact missile.
    pub fn detonate(&mut self, cause: Detonation) -> bool {
        if self.exploded {
            return false;
        }
        if cause == Detonation::Contact && !self.is_armed() {
            return false;
        }
        self.exploded = true;
        true
    }
}
