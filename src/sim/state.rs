//! Entity world
//!
//! Every live entity of a run plus the seeded RNG. Collections are kept in id
//! order so iteration is deterministic; destroyed entities stay in place with
//! their active flag cleared until they are pruned or despawned, so systems
//! running later in the same tick can safely skip them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::boss::Boss;
use super::collectible::{Collectible, CollectibleKind};
use super::enemy::{Enemy, EnemyKind};
use super::player::Player;
use super::projectile::{Bullet, BulletOwner, Missile};
use super::spawner::{Difficulty, Spawner, SpawnerOwner};
use crate::config::GameConfig;
use crate::consts::{MAX_BULLETS, MAX_COLLECTIBLES, MAX_ENEMIES};

#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub spawners: Vec<Spawner>,
    pub boss: Option<Boss>,
    pub bullets: Vec<Bullet>,
    pub missiles: Vec<Missile>,
    pub collectibles: Vec<Collectible>,
    pub score: u64,
    /// New collectibles are magnetized on creation (screen cleared)
    pub auto_magnetize: bool,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64, config: &GameConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(config.player_spawn(), &config.player),
            enemies: Vec::new(),
            spawners: Vec::new(),
            boss: None,
            bullets: Vec::new(),
            missiles: Vec::new(),
            collectibles: Vec::new(),
            score: 0,
            auto_magnetize: false,
            next_id: 1,
        }
    }

    /// Clear every entity and reset the player, keeping the RNG stream
    pub fn reset(&mut self, config: &GameConfig) {
        self.player.reset(config.player_spawn(), &config.player);
        self.enemies.clear();
        self.spawners.clear();
        self.boss = None;
        self.bullets.clear();
        self.missiles.clear();
        self.collectibles.clear();
        self.score = 0;
        self.auto_magnetize = false;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> Option<u32> {
        if self.live_enemy_count() >= MAX_ENEMIES {
            log::warn!("Enemy cap reached, dropping {} spawn", kind.name());
            return None;
        }
        let id = self.next_entity_id();
        let enemy = Enemy::new(id, kind, pos, &mut self.rng);
        self.enemies.push(enemy);
        log::debug!("Spawned {} #{id} at ({:.0}, {:.0})", kind.name(), pos.x, pos.y);
        Some(id)
    }

    pub fn spawn_spawner(
        &mut self,
        pos: Vec2,
        difficulty: Difficulty,
        owner: SpawnerOwner,
        hp: Option<i32>,
        config: &GameConfig,
    ) -> u32 {
        let id = self.next_entity_id();
        let mut spawner = Spawner::new(id, pos, difficulty, owner, &config.spawner);
        if let Some(hp) = hp {
            spawner = spawner.with_hp(hp);
        }
        self.spawners.push(spawner);
        id
    }

    pub fn spawn_bullet(
        &mut self,
        owner: BulletOwner,
        pos: Vec2,
        angle: f32,
        speed: f32,
        damage: i32,
        config: &GameConfig,
    ) -> Option<u32> {
        if self.bullets.len() >= MAX_BULLETS {
            return None;
        }
        let radius = match owner {
            BulletOwner::Player => config.bullets.player_radius,
            BulletOwner::Enemy => config.bullets.enemy_radius,
        };
        let id = self.next_entity_id();
        self.bullets.push(Bullet::new(
            id,
            owner,
            pos,
            angle,
            speed,
            damage,
            radius,
            config.bullets.lifespan,
        ));
        Some(id)
    }

    /// Launch a missile along the player's heading
    pub fn spawn_missile(&mut self, config: &GameConfig) -> u32 {
        let id = self.next_entity_id();
        let missile = Missile::launch(
            id,
            self.player.pos,
            self.player.angle,
            config.player.muzzle_offset,
            &config.missile,
        );
        self.missiles.push(missile);
        id
    }

    pub fn spawn_collectible(&mut self, kind: CollectibleKind, pos: Vec2, config: &GameConfig) -> Option<u32> {
        if self.collectibles.len() >= MAX_COLLECTIBLES {
            return None;
        }
        let id = self.next_entity_id();
        let mut collectible = Collectible::new(id, kind, pos, &config.drops, &mut self.rng);
        if self.auto_magnetize {
            collectible.magnetize();
        }
        self.collectibles.push(collectible);
        Some(id)
    }

    /// Spawners not yet destroyed (disabled ones still count)
    pub fn active_spawner_count(&self) -> usize {
        self.spawners.iter().filter(|s| s.is_active()).count()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn boss_active(&self) -> bool {
        self.boss.as_ref().is_some_and(|b| !b.is_destroyed())
    }

    pub fn magnetize_all(&mut self) {
        for c in self.collectibles.iter_mut().filter(|c| c.is_live()) {
            c.magnetize();
        }
    }

    pub fn spawner(&self, id: u32) -> Option<&Spawner> {
        self.spawners.iter().find(|s| s.id == id)
    }

    pub fn collectible_mut(&mut self, id: u32) -> Option<&mut Collectible> {
        self.collectibles.iter_mut().find(|c| c.id == id)
    }

    /// Drop spent projectiles and consumed collectibles
    pub fn prune(&mut self) {
        self.bullets.retain(|b| b.active);
        self.missiles.retain(|m| m.is_live());
        self.collectibles.retain(|c| c.is_live());
    }

    /// Nearest live hostile (enemy, spawner or boss) to `pos`
    pub fn nearest_hostile(&self, pos: Vec2) -> Option<Vec2> {
        let enemies = self.enemies.iter().filter(|e| e.active).map(|e| e.pos);
        let spawners = self.spawners.iter().filter(|s| s.is_active()).map(|s| s.pos);
        let boss = self.boss.iter().filter(|b| !b.is_destroyed()).map(|b| b.pos);
        enemies
            .chain(spawners)
            .chain(boss)
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        let a = world.spawn_enemy(EnemyKind::Scout, Vec2::ZERO).unwrap();
        let b = world.spawn_spawner(Vec2::ZERO, Difficulty::Easy, SpawnerOwner::Screen, None, &config);
        let c = world.spawn_missile(&config);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_auto_magnetize_new_collectibles() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        world.auto_magnetize = true;
        world.spawn_collectible(CollectibleKind::Health, Vec2::ZERO, &config);
        assert!(world.collectibles[0].magnetized);
    }

    #[test]
    fn test_enemy_cap() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        for _ in 0..MAX_ENEMIES {
            assert!(world.spawn_enemy(EnemyKind::Swarm, Vec2::ZERO).is_some());
        }
        assert!(world.spawn_enemy(EnemyKind::Swarm, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_enemy_cap_ignores_dying_enemies() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        for _ in 0..MAX_ENEMIES {
            world.spawn_enemy(EnemyKind::Swarm, Vec2::ZERO);
        }
        // Killed but still waiting for removal
        world.enemies[0].apply_damage(9999);
        assert_eq!(world.enemies.len(), MAX_ENEMIES);
        assert!(world.spawn_enemy(EnemyKind::Swarm, Vec2::ZERO).is_some());
        assert!(world.spawn_enemy(EnemyKind::Swarm, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_boss_spawner_hp_override() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        let id = world.spawn_spawner(Vec2::ZERO, Difficulty::Easy, SpawnerOwner::Boss, Some(100), &config);
        assert_eq!(world.spawner(id).map(|s| s.max_hp), Some(100));
    }

    #[test]
    fn test_nearest_hostile() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        world.spawn_enemy(EnemyKind::Scout, Vec2::new(100.0, 0.0));
        world.spawn_spawner(Vec2::new(10.0, 0.0), Difficulty::Easy, SpawnerOwner::Screen, None, &config);
        assert_eq!(world.nearest_hostile(Vec2::ZERO), Some(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_reset_clears_entities() {
        let config = GameConfig::default();
        let mut world = World::new(1, &config);
        world.spawn_enemy(EnemyKind::Tank, Vec2::ZERO);
        world.score = 99;
        world.player.hp = 1;
        world.reset(&config);
        assert!(world.enemies.is_empty());
        assert_eq!(world.score, 0);
        assert_eq!(world.player.hp, config.player.max_hp);
    }
}
