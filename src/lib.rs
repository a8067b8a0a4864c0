//! Neon Siege - arcade combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, waves, session state machine)
//! - `economy`: In-run currency and upgrade tracks
//! - `config`: Data-driven game balance
//! - `progress`: Persisted section conquests (collaborator interface)
//! - `audio`: Event-driven sound cues (collaborator interface)
//! - `stats`: Per-run statistics

pub mod audio;
pub mod config;
pub mod economy;
pub mod progress;
pub mod sim;
pub mod stats;

pub use config::GameConfig;
pub use economy::{Economy, UpgradeKey};
pub use sim::{Session, SessionPhase, TickInput, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame timestep (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest delta accepted by a single tick (long stalls are clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Distance under which the player keeps its previous heading
    pub const AIM_DEADZONE: f32 = 5.0;
    /// Distance under which the boss stops approaching its waypoint
    pub const BOSS_ARRIVE_DISTANCE: f32 = 5.0;

    /// Upper bound on live entities per group (runaway spawn protection)
    pub const MAX_ENEMIES: usize = 256;
    pub const MAX_BULLETS: usize = 512;
    pub const MAX_COLLECTIBLES: usize = 256;
}

/// Angle (radians) of the vector pointing from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for a heading angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Convert a per-frame (60 Hz) smoothing factor into the factor for `dt` seconds
///
/// Keeps lerp-style smoothing frame-rate independent.
#[inline]
pub fn frame_lerp(per_frame: f32, dt: f32) -> f32 {
    1.0 - (1.0 - per_frame.clamp(0.0, 1.0)).powf(dt / consts::FRAME_DT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_to() {
        assert!((angle_to(Vec2::ZERO, Vec2::new(1.0, 0.0))).abs() < 1e-6);
        assert!((angle_to(Vec2::ZERO, Vec2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_to(Vec2::ZERO, Vec2::new(-1.0, 0.0)).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_frame_lerp_matches_single_frame() {
        let f = frame_lerp(0.08, consts::FRAME_DT);
        assert!((f - 0.08).abs() < 1e-5);

        // Two half-frames compose to one full frame
        let half = frame_lerp(0.08, consts::FRAME_DT / 2.0);
        let composed = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((composed - 0.08).abs() < 1e-5);
    }
}
