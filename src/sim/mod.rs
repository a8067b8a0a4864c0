//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, config and input
//! sequence a run replays identically:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Deferred work through the scheduler, never wall-clock timers
//! - No rendering or platform dependencies

pub mod boss;
pub mod collectible;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod player;
pub mod projectile;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod waves;

pub use boss::Boss;
pub use collectible::{Collectible, CollectibleKind, CrystalSize};
pub use collision::{CollisionReport, apply_area_damage, resolve};
pub use enemy::{Enemy, EnemyKind};
pub use events::{EventBus, EventKind, EventListener, GameEvent};
pub use player::Player;
pub use projectile::{Bullet, BulletOwner, Missile};
pub use scheduler::{Scheduler, TaskHandle};
pub use session::{ScheduledAction, Session, SessionPhase};
pub use spawner::{Difficulty, Spawner, SpawnerOwner, select_enemy_type};
pub use state::World;
pub use tick::{TickInput, tick};
pub use waves::{ScreenDef, SectionDef, WaveController};
