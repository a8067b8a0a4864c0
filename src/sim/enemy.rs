//! Enemy archetypes and per-frame behavior

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, TAU};

use crate::{angle_to, heading};

/// Seconds between zig-zag direction flips
pub const ZIGZAG_PERIOD: f32 = 0.5;
/// Lateral deviation of a zig-zag heading
pub const ZIGZAG_OFFSET: f32 = FRAC_PI_4;
/// Angular frequency (rad/s) of swarm wobble
pub const SWARM_FREQUENCY: f32 = 5.0;
/// Amplitude (radians) of swarm wobble
pub const SWARM_AMPLITUDE: f32 = 0.5;
/// Shooter stops approaching inside this distance
pub const SHOOTER_STANDOFF: f32 = 200.0;
/// Seconds between shooter shots
pub const SHOOTER_FIRE_INTERVAL: f32 = 1.5;

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    Scout,
    Drifter,
    Tank,
    Shooter,
    Swarm,
}

/// Movement/attack rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Chase,
    Zigzag,
    Shoot,
    Swarm,
}

/// Static stats of an enemy variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub hp: i32,
    pub speed: f32,
    pub behavior: Behavior,
    pub points: u32,
    /// Crystals dropped on death
    pub crystals: u32,
    /// Sprite size; hit radius is half of it
    pub size: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Scout,
        EnemyKind::Drifter,
        EnemyKind::Tank,
        EnemyKind::Shooter,
        EnemyKind::Swarm,
    ];

    pub fn archetype(self) -> Archetype {
        match self {
            EnemyKind::Scout => Archetype {
                hp: 20,
                speed: 200.0,
                behavior: Behavior::Chase,
                points: 10,
                crystals: 1,
                size: 24.0,
            },
            EnemyKind::Drifter => Archetype {
                hp: 30,
                speed: 150.0,
                behavior: Behavior::Zigzag,
                points: 15,
                crystals: 1,
                size: 28.0,
            },
            EnemyKind::Tank => Archetype {
                hp: 80,
                speed: 60.0,
                behavior: Behavior::Chase,
                points: 30,
                crystals: 2,
                size: 48.0,
            },
            EnemyKind::Shooter => Archetype {
                hp: 40,
                speed: 100.0,
                behavior: Behavior::Shoot,
                points: 25,
                crystals: 3,
                size: 32.0,
            },
            EnemyKind::Swarm => Archetype {
                hp: 10,
                speed: 250.0,
                behavior: Behavior::Swarm,
                points: 5,
                crystals: 1,
                size: 16.0,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Scout => "scout",
            EnemyKind::Drifter => "drifter",
            EnemyKind::Tank => "tank",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Swarm => "swarm",
        }
    }
}

/// A live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub radius: f32,
    /// Current heading (radians)
    pub angle: f32,
    /// Cleared on death; dead enemies are skipped by every system
    pub active: bool,
    /// Seconds alive, drives the swarm wobble
    pub age: f32,
    zigzag_timer: f32,
    zigzag_sign: f32,
    swarm_phase: f32,
    fire_cooldown: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, rng: &mut Pcg32) -> Self {
        let a = kind.archetype();
        Self {
            id,
            kind,
            pos,
            hp: a.hp,
            max_hp: a.hp,
            speed: a.speed,
            radius: a.size * 0.5,
            angle: 0.0,
            active: true,
            age: 0.0,
            zigzag_timer: 0.0,
            zigzag_sign: 1.0,
            swarm_phase: rng.random::<f32>() * TAU,
            fire_cooldown: 0.0,
        }
    }

    /// Apply damage. Returns true only on the hit that kills.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.active {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn points(&self) -> u32 {
        self.kind.archetype().points
    }

    pub fn crystals(&self) -> u32 {
        self.kind.archetype().crystals
    }
}

/// Advance one enemy toward `target`. Returns the firing angle when it shoots.
pub fn update_enemy(enemy: &mut Enemy, target: Vec2, dt: f32) -> Option<f32> {
    if !enemy.active {
        return None;
    }
    enemy.age += dt;

    let pursuit = angle_to(enemy.pos, target);
    let mut moving = true;
    let mut fire = None;

    let angle = match enemy.kind.archetype().behavior {
        Behavior::Chase => pursuit,
        Behavior::Zigzag => {
            enemy.zigzag_timer += dt;
            if enemy.zigzag_timer > ZIGZAG_PERIOD {
                enemy.zigzag_timer = 0.0;
                enemy.zigzag_sign = -enemy.zigzag_sign;
            }
            pursuit + enemy.zigzag_sign * ZIGZAG_OFFSET
        }
        Behavior::Shoot => {
            enemy.fire_cooldown = (enemy.fire_cooldown - dt).max(0.0);
            if enemy.pos.distance(target) <= SHOOTER_STANDOFF {
                moving = false;
                if enemy.fire_cooldown <= 0.0 {
                    enemy.fire_cooldown = SHOOTER_FIRE_INTERVAL;
                    fire = Some(pursuit);
                }
            }
            pursuit
        }
        Behavior::Swarm => {
            pursuit + (enemy.age * SWARM_FREQUENCY + enemy.swarm_phase).sin() * SWARM_AMPLITUDE
        }
    };

    enemy.angle = angle;
    if moving {
        enemy.pos += heading(angle) * enemy.speed * dt;
    }
    fire
}
