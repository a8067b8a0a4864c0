//! Game balance configuration
//!
//! Every tunable number of the simulation lives here. All sections default to
//! the shipped balance and may be partially overridden from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::waves::{SectionDef, default_campaign};

/// Play-field dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// How far past the edges an entity may travel before it counts as off-screen
    pub offscreen_margin: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            offscreen_margin: 50.0,
        }
    }
}

impl ArenaConfig {
    /// True if `pos` lies outside the play bounds (including margin)
    pub fn is_offscreen(&self, pos: glam::Vec2) -> bool {
        let m = self.offscreen_margin;
        pos.x < -m || pos.x > self.width + m || pos.y < -m || pos.y > self.height + m
    }
}

/// Player ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: i32,
    /// Per-frame (60 Hz) smoothing toward the pointer
    pub lerp_factor: f32,
    /// Seconds of invulnerability after a hit
    pub invulnerability: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    pub bullet_damage: i32,
    pub bullet_speed: f32,
    /// Distance ahead of the ship where shots appear
    pub muzzle_offset: f32,
    /// Lateral offset of each bullet in a double shot
    pub double_shot_offset: f32,
    pub hit_radius: f32,
    /// Seconds to recharge one missile
    pub missile_recharge: f32,
    /// Spawn offset above the bottom edge
    pub spawn_from_bottom: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: 100,
            lerp_factor: 0.08,
            invulnerability: 0.5,
            fire_interval: 0.2,
            bullet_damage: 10,
            bullet_speed: 800.0,
            muzzle_offset: 25.0,
            double_shot_offset: 8.0,
            hit_radius: 16.0,
            missile_recharge: 2.5,
            spawn_from_bottom: 200.0,
        }
    }
}

/// Player missile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileConfig {
    pub speed: f32,
    /// Damage dealt to whatever the missile physically strikes
    pub direct_damage: i32,
    pub aoe_damage: i32,
    pub aoe_radius: f32,
    /// Distance a missile must travel before it is armed
    pub min_travel: f32,
    /// Detonate when this close to the target point
    pub target_proximity: f32,
    /// How far ahead of the ship the target point is placed
    pub target_distance: f32,
    /// Targets closer than this are pushed out along the same heading
    pub near_target: f32,
    pub extended_target: f32,
    pub hit_radius: f32,
    /// Seconds between missiles in one volley
    pub launch_spacing: f32,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            speed: 400.0,
            direct_damage: 50,
            aoe_damage: 25,
            aoe_radius: 80.0,
            min_travel: 100.0,
            target_proximity: 30.0,
            target_distance: 800.0,
            near_target: 150.0,
            extended_target: 500.0,
            hit_radius: 10.0,
            launch_spacing: 0.2,
        }
    }
}

/// Damage the player takes from hostile contact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub contact: i32,
    pub enemy_bullet: i32,
    /// Multiplier on `contact` when ramming the boss body
    pub boss_contact_multiplier: i32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            contact: 20,
            enemy_bullet: 15,
            boss_contact_multiplier: 2,
        }
    }
}

/// Bullet tuning shared by both owners
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub enemy_speed: f32,
    /// Seconds before a bullet self-destructs
    pub lifespan: f32,
    pub player_radius: f32,
    pub enemy_radius: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            enemy_speed: 300.0,
            lifespan: 3.0,
            player_radius: 5.0,
            enemy_radius: 5.0,
        }
    }
}

/// Collectible tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub health_restore: i32,
    pub crystal_small: u32,
    pub crystal_medium: u32,
    pub crystal_large: u32,
    /// Chance that a dying enemy also drops health
    pub health_chance: f64,
    /// Seconds before an uncollected crystal expires
    pub crystal_lifetime: f32,
    pub health_lifetime: f32,
    pub magnet_speed: f32,
    pub pickup_radius: f32,
    /// Random scatter around an enemy death position
    pub scatter: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            health_restore: 25,
            crystal_small: 5,
            crystal_medium: 15,
            crystal_large: 30,
            health_chance: 0.03,
            crystal_lifetime: 15.0,
            health_lifetime: 10.0,
            magnet_speed: 500.0,
            pickup_radius: 15.0,
            scatter: 30.0,
        }
    }
}

/// Spawner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub hp: i32,
    /// Seconds between drip spawns
    pub drip_interval: f32,
    pub burst_base: u32,
    /// Random extra enemies added to a burst (inclusive)
    pub burst_bonus: u32,
    /// Seconds between enemies of one burst
    pub burst_spacing: f32,
    /// Fraction of max HP lost per bonus spawn
    pub damage_spawn_step: f32,
    /// Below this HP fraction the spawner draws from the next difficulty tier
    pub low_hp_threshold: f32,
    pub hit_radius: f32,
    pub spawn_ring_min: f32,
    pub spawn_ring_max: f32,
    pub death_drop_min: u32,
    pub death_drop_max: u32,
    pub death_drop_spacing: f32,
    pub death_score: u64,
    /// Vertical band where screen spawners are placed
    pub band_top: f32,
    pub band_height: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            hp: 200,
            drip_interval: 10.0,
            burst_base: 3,
            burst_bonus: 1,
            burst_spacing: 0.2,
            damage_spawn_step: 0.2,
            low_hp_threshold: 0.3,
            hit_radius: 38.0,
            spawn_ring_min: 50.0,
            spawn_ring_max: 80.0,
            death_drop_min: 3,
            death_drop_max: 5,
            death_drop_spacing: 0.1,
            death_score: 500,
            band_top: 150.0,
            band_height: 100.0,
        }
    }
}

/// Boss tuning. Per-phase arrays are indexed by `phase - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub hp: i32,
    pub hit_radius: f32,
    pub speed: f32,
    /// Height at which the boss enters
    pub spawn_y: f32,
    /// Seconds between waypoint changes
    pub retarget_interval: f32,
    /// Margin kept from the screen edges when choosing waypoints
    pub waypoint_margin: f32,
    /// Fraction of the screen height used as the waypoint band
    pub waypoint_band: f32,
    pub shield_count: usize,
    pub shield_orbit: f32,
    pub shield_radius: f32,
    pub shield_speed: [f32; 3],
    pub summon_interval: [f32; 3],
    pub summon_cap: usize,
    pub summon_hp: i32,
    pub summon_ring_min: f32,
    pub summon_ring_max: f32,
    pub attack_interval: [f32; 3],
    pub fan_count: [u32; 3],
    pub fan_spread: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    /// HP fractions at or below which phase 2 and 3 begin
    pub phase_thresholds: [f32; 2],
    pub death_drops: u32,
    pub death_drop_spacing: f32,
    pub death_drop_scatter: f32,
    pub death_score: u64,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            hp: 2000,
            hit_radius: 48.0,
            speed: 40.0,
            spawn_y: 200.0,
            retarget_interval: 3.0,
            waypoint_margin: 150.0,
            waypoint_band: 0.4,
            shield_count: 4,
            shield_orbit: 100.0,
            shield_radius: 25.0,
            shield_speed: [1.5, 2.0, 3.0],
            summon_interval: [8.0, 6.0, 5.0],
            summon_cap: 3,
            summon_hp: 100,
            summon_ring_min: 150.0,
            summon_ring_max: 250.0,
            attack_interval: [2.0, 1.5, 1.0],
            fan_count: [3, 5, 7],
            fan_spread: std::f32::consts::PI / 8.0,
            bullet_speed: 250.0,
            bullet_damage: 20,
            phase_thresholds: [0.6, 0.3],
            death_drops: 20,
            death_drop_spacing: 0.05,
            death_drop_scatter: 100.0,
            death_score: 5000,
        }
    }
}

/// Delays of the progression flow, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub initial_burst_delay: f32,
    pub screen_grace: f32,
    pub next_screen_delay: f32,
    pub boss_warning: f32,
    pub victory_grace: f32,
    pub enemy_removal: f32,
    pub spawner_removal: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_burst_delay: 0.5,
            screen_grace: 2.5,
            next_screen_delay: 1.0,
            boss_warning: 2.0,
            victory_grace: 2.0,
            enemy_removal: 0.2,
            spawner_removal: 0.5,
        }
    }
}

/// Sound cue volumes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub player: PlayerConfig,
    pub missile: MissileConfig,
    pub damage: DamageConfig,
    pub bullets: BulletConfig,
    pub drops: DropConfig,
    pub spawner: SpawnerConfig,
    pub boss: BossConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub campaign: Vec<SectionDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            player: PlayerConfig::default(),
            missile: MissileConfig::default(),
            damage: DamageConfig::default(),
            bullets: BulletConfig::default(),
            drops: DropConfig::default(),
            spawner: SpawnerConfig::default(),
            boss: BossConfig::default(),
            timing: TimingConfig::default(),
            audio: AudioConfig::default(),
            campaign: default_campaign(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a file, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {e} - using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read config {}: {e} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Player start position
    pub fn player_spawn(&self) -> glam::Vec2 {
        glam::Vec2::new(
            self.arena.width / 2.0,
            self.arena.height - self.player.spawn_from_bottom,
        )
    }
}
