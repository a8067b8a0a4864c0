//! Crystals and health drops

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::angle_to;
use crate::config::DropConfig;
use crate::heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrystalSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Crystal(CrystalSize),
    Health,
}

impl CollectibleKind {
    /// Currency for crystals, hit points for health drops
    pub fn value(self, drops: &DropConfig) -> u32 {
        match self {
            CollectibleKind::Crystal(CrystalSize::Small) => drops.crystal_small,
            CollectibleKind::Crystal(CrystalSize::Medium) => drops.crystal_medium,
            CollectibleKind::Crystal(CrystalSize::Large) => drops.crystal_large,
            CollectibleKind::Health => drops.health_restore.max(0) as u32,
        }
    }

    /// Seconds before an uncollected drop fades
    pub fn lifetime(self, drops: &DropConfig) -> f32 {
        match self {
            CollectibleKind::Crystal(_) => drops.crystal_lifetime,
            CollectibleKind::Health => drops.health_lifetime,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    pub value: u32,
    pub radius: f32,
    pub collected: bool,
    pub expired: bool,
    /// Homing toward the player instead of floating
    pub magnetized: bool,
    age: f32,
    float_phase: f32,
}

impl Collectible {
    pub fn new(id: u32, kind: CollectibleKind, pos: Vec2, drops: &DropConfig, rng: &mut Pcg32) -> Self {
        Self {
            id,
            kind,
            pos,
            value: kind.value(drops),
            radius: drops.pickup_radius,
            collected: false,
            expired: false,
            magnetized: false,
            age: 0.0,
            float_phase: rng.random::<f32>() * TAU,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.collected && !self.expired
    }

    pub fn magnetize(&mut self) {
        self.magnetized = true;
    }

    /// Float in place, or home toward `player` when magnetized
    pub fn update(&mut self, dt: f32, player: Vec2, magnet_speed: f32) {
        if !self.is_live() {
            return;
        }
        self.age += dt;
        if self.magnetized {
            let to_player = player - self.pos;
            let step = (magnet_speed * dt).min(to_player.length());
            self.pos += heading(angle_to(self.pos, player)) * step;
        } else {
            // Gentle bob, 0.5 px per 60 Hz frame at peak
            self.pos.y += (self.age * 3.0 + self.float_phase).sin() * 0.5 * dt * 60.0;
        }
    }

    /// Consume the drop. Returns its value the first time only.
    pub fn collect(&mut self) -> Option<u32> {
        if !self.is_live() {
            return None;
        }
        self.collected = true;
        Some(self.value)
    }

    /// Lifetime ran out (no-op once collected)
    pub fn expire(&mut self) {
        if !self.collected {
            self.expired = true;
        }
    }
}

/// Random offset in a `scatter`-wide square around `pos`
pub fn scatter(pos: Vec2, scatter: f32, rng: &mut Pcg32) -> Vec2 {
    pos + Vec2::new(
        (rng.random::<f32>() - 0.5) * scatter,
        (rng.random::<f32>() - 0.5) * scatter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn crystal(size: CrystalSize) -> Collectible {
        let mut rng = Pcg32::seed_from_u64(1);
        Collectible::new(1, CollectibleKind::Crystal(size), Vec2::ZERO, &DropConfig::default(), &mut rng)
    }

    #[test]
    fn test_values() {
        assert_eq!(crystal(CrystalSize::Small).value, 5);
        assert_eq!(crystal(CrystalSize::Medium).value, 15);
        assert_eq!(crystal(CrystalSize::Large).value, 30);
        assert_eq!(CollectibleKind::Health.value(&DropConfig::default()), 25);
    }

    #[test]
    fn test_collect_once() {
        let mut c = crystal(CrystalSize::Small);
        assert_eq!(c.collect(), Some(5));
        assert_eq!(c.collect(), None);
    }

    #[test]
    fn test_expired_cannot_be_collected() {
        let mut c = crystal(CrystalSize::Large);
        c.expire();
        assert_eq!(c.collect(), None);
    }

    #[test]
    fn test_collected_does_not_expire() {
        let mut c = crystal(CrystalSize::Large);
        c.collect();
        c.expire();
        assert!(!c.expired);
    }

    #[test]
    fn test_magnetized_homes_without_overshoot() {
        let mut c = crystal(CrystalSize::Small);
        c.magnetize();
        let player = Vec2::new(100.0, 0.0);
        c.update(0.1, player, 500.0);
        assert!((c.pos.x - 50.0).abs() < 1e-3);
        c.update(0.3, player, 500.0);
        assert!((c.pos - player).length() < 1e-3);
    }

    #[test]
    fn test_idle_float_stays_put_horizontally() {
        let mut c = crystal(CrystalSize::Small);
        c.update(0.5, Vec2::new(100.0, 0.0), 500.0);
        assert_eq!(c.pos.x, 0.0);
    }

    #[test]
    fn test_scatter_bounds() {
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..20 {
            let p = scatter(Vec2::ZERO, 30.0, &mut rng);
            assert!(p.x.abs() <= 15.0 && p.y.abs() <= 15.0);
        }
    }
}
