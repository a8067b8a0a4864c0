//! Player ship

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::consts::AIM_DEADZONE;
use crate::{angle_to, frame_lerp, heading};

/// One bullet the ship wants to fire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub angle: f32,
    pub damage: i32,
}

/// Outcome of `Player::take_damage`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerHit {
    /// Damage went through (not invulnerable, not dead)
    pub applied: bool,
    /// This hit killed the player
    pub died: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Pointer position the ship eases toward
    pub target: Vec2,
    /// Facing (radians); shots and missiles leave along it
    pub angle: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub radius: f32,
    /// Seconds of invulnerability left
    pub invulnerable: f32,
    pub dead: bool,

    pub bullet_damage: i32,
    /// Seconds between shots
    pub fire_interval: f32,
    pub shot_count: u32,
    fire_cooldown: f32,

    pub missiles: u32,
    pub max_missiles: u32,
    /// Seconds to recharge one missile
    pub missile_recharge: f32,
    recharge_timer: f32,
}

impl Player {
    pub fn new(pos: Vec2, config: &PlayerConfig) -> Self {
        Self {
            pos,
            target: pos,
            angle: -std::f32::consts::FRAC_PI_2,
            hp: config.max_hp,
            max_hp: config.max_hp,
            radius: config.hit_radius,
            invulnerable: 0.0,
            dead: false,
            bullet_damage: config.bullet_damage,
            fire_interval: config.fire_interval,
            shot_count: 1,
            fire_cooldown: 0.0,
            missiles: 1,
            max_missiles: 1,
            missile_recharge: config.missile_recharge,
            recharge_timer: 0.0,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Ease toward the pointer, face it, tick invulnerability and missile recharge
    pub fn update(&mut self, dt: f32, config: &PlayerConfig) {
        if self.dead {
            return;
        }
        let t = frame_lerp(config.lerp_factor, dt);
        self.pos = self.pos.lerp(self.target, t);

        if self.pos.distance(self.target) > AIM_DEADZONE {
            self.angle = angle_to(self.pos, self.target);
        }

        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        if self.missiles < self.max_missiles {
            self.recharge_timer += dt;
            if self.recharge_timer >= self.missile_recharge {
                self.recharge_timer = 0.0;
                self.missiles += 1;
            }
        } else {
            self.recharge_timer = 0.0;
        }
    }

    /// Auto-fire: returns the shots due this frame (empty while cooling down)
    pub fn fire(&mut self, config: &PlayerConfig) -> Vec<Shot> {
        if self.dead || self.fire_cooldown > 0.0 {
            return Vec::new();
        }
        self.fire_cooldown = self.fire_interval;

        let dir = heading(self.angle);
        let muzzle = self.pos + dir * config.muzzle_offset;
        let shot = |pos| Shot {
            pos,
            angle: self.angle,
            damage: self.bullet_damage,
        };

        if self.shot_count >= 2 {
            let side = dir.perp() * config.double_shot_offset;
            vec![shot(muzzle + side), shot(muzzle - side)]
        } else {
            vec![shot(muzzle)]
        }
    }

    /// Spend one missile. Returns false when the stock is empty.
    pub fn take_missile(&mut self) -> bool {
        if self.dead || self.missiles == 0 {
            return false;
        }
        self.missiles -= 1;
        true
    }

    pub fn take_damage(&mut self, amount: i32, config: &PlayerConfig) -> PlayerHit {
        if self.dead || self.is_invulnerable() {
            return PlayerHit::default();
        }
        self.hp = (self.hp - amount).max(0);
        self.invulnerable = config.invulnerability;
        let died = self.hp == 0;
        if died {
            self.dead = true;
        }
        PlayerHit { applied: true, died }
    }

    pub fn heal(&mut self, amount: i32) {
        if !self.dead {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }

    /// Back to a fresh ship at `pos` with base stats
    pub fn reset(&mut self, pos: Vec2, config: &PlayerConfig) {
        *self = Self::new(pos, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(Vec2::new(640.0, 520.0), &PlayerConfig::default())
    }

    #[test]
    fn test_damage_clamps_and_kills_once() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.hp = 10;
        let hit = p.take_damage(15, &config);
        assert!(hit.applied && hit.died);
        assert_eq!(p.hp, 0);

        p.invulnerable = 0.0;
        let again = p.take_damage(15, &config);
        assert!(!again.applied && !again.died);
        assert_eq!(p.hp, 0);
    }

    #[test]
    fn test_invulnerability_window() {
        let config = PlayerConfig::default();
        let mut p = player();
        assert!(p.take_damage(20, &config).applied);
        assert!(!p.take_damage(20, &config).applied);
        assert_eq!(p.hp, 80);

        p.update(0.5, &config);
        assert!(p.take_damage(20, &config).applied);
        assert_eq!(p.hp, 60);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut p = player();
        p.hp = 90;
        p.heal(25);
        assert_eq!(p.hp, 100);
    }

    #[test]
    fn test_fire_cadence_and_double_shot() {
        let config = PlayerConfig::default();
        let mut p = player();
        assert_eq!(p.fire(&config).len(), 1);
        assert!(p.fire(&config).is_empty());

        p.update(0.2, &config);
        p.shot_count = 2;
        let shots = p.fire(&config);
        assert_eq!(shots.len(), 2);
        assert!((shots[0].pos.distance(shots[1].pos) - 16.0).abs() < 1e-3);
        assert!(shots.iter().all(|s| s.damage == 10));
    }

    #[test]
    fn test_faces_pointer() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.set_target(p.pos + Vec2::new(100.0, 0.0));
        p.update(1.0 / 60.0, &config);
        assert!(p.angle.abs() < 1e-3);

        // Inside the dead zone the heading is kept
        p.set_target(p.pos + Vec2::new(0.0, 2.0));
        p.update(1.0 / 60.0, &config);
        assert!(p.angle.abs() < 1e-3);
    }

    #[test]
    fn test_missile_recharge() {
        let config = PlayerConfig::default();
        let mut p = player();
        assert!(p.take_missile());
        assert!(!p.take_missile());
        p.update(2.4, &config);
        assert_eq!(p.missiles, 0);
        p.update(0.2, &config);
        assert_eq!(p.missiles, 1);
    }

    proptest! {
        #[test]
        fn prop_hp_never_negative(hits in prop::collection::vec(0i32..200, 1..30)) {
            let config = PlayerConfig::default();
            let mut p = player();
            let mut deaths = 0;
            for h in hits {
                p.invulnerable = 0.0;
                if p.take_damage(h, &config).died {
                    deaths += 1;
                }
                prop_assert!(p.hp >= 0);
            }
            prop_assert!(deaths <= 1);
        }
    }
}
