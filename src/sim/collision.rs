//! Collision detection and resolution
//!
//! One pass per tick over every relevant pair of entity groups using circle
//! overlap. Damage helpers here are shared with area (missile) damage so both
//! paths publish identical notifications. Consumed or destroyed entities are
//! only flagged, never removed, so later checks in the same pass skip them.

use glam::Vec2;

use super::events::{EventBus, GameEvent};
use super::projectile::{BulletOwner, Detonation};
use super::collectible::CollectibleKind;
use super::spawner::{SpawnerOwner, select_enemy_type};
use super::state::World;
use crate::config::GameConfig;

/// Hit counters for run statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub bullet_hits: u32,
    pub missile_hits: u32,
}

/// Circle-circle overlap test (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Damage enemy at `idx`, publishing its death exactly once
pub fn damage_enemy(world: &mut World, idx: usize, amount: i32, bus: &mut EventBus) {
    let Some(enemy) = world.enemies.get_mut(idx) else {
        return;
    };
    if enemy.apply_damage(amount) {
        bus.publish(GameEvent::EnemyDied {
            enemy: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos,
            points: enemy.points(),
            crystals: enemy.crystals(),
        });
    }
}

/// Damage spawner at `idx`: bonus spawns and a single destruction notice
pub fn damage_spawner(world: &mut World, idx: usize, amount: i32, bus: &mut EventBus, config: &GameConfig) {
    let Some(spawner) = world.spawners.get_mut(idx) else {
        return;
    };
    let hit = spawner.apply_damage(amount);
    let (id, pos, owner) = (spawner.id, spawner.pos, spawner.owner);
    if hit.bonus_spawn {
        let difficulty = spawner.effective_difficulty();
        let spawn_pos = spawner.spawn_point(&mut world.rng, &config.spawner);
        let kind = select_enemy_type(difficulty, &mut world.rng);
        bus.publish(GameEvent::EnemySpawnRequest {
            spawner: id,
            pos: spawn_pos,
            kind,
        });
    }
    if hit.destroyed {
        log::debug!("Spawner #{id} destroyed");
        bus.publish(GameEvent::SpawnerDestroyed {
            spawner: id,
            pos,
            boss_owned: owner == SpawnerOwner::Boss,
        });
    }
}

/// Damage the boss, publishing phase changes and its defeat
pub fn damage_boss(world: &mut World, amount: i32, bus: &mut EventBus, config: &GameConfig) {
    let Some(boss) = world.boss.as_mut() else {
        return;
    };
    let hit = boss.apply_damage(amount, &config.boss);
    if let Some(phase) = hit.phase_changed {
        log::info!("Boss enters phase {phase}");
        bus.publish(GameEvent::BossPhaseChanged { phase });
    }
    if hit.destroyed {
        bus.publish(GameEvent::BossDefeated { pos: boss.pos });
    }
}

/// Hurt the player (respecting invulnerability), publishing damage and death
pub fn damage_player(world: &mut World, amount: i32, bus: &mut EventBus, config: &GameConfig) {
    let player = &mut world.player;
    let hit = player.take_damage(amount, &config.player);
    if hit.applied {
        bus.publish(GameEvent::PlayerDamaged {
            amount,
            hp: player.hp,
        });
    }
    if hit.died {
        bus.publish(GameEvent::PlayerDied { pos: player.pos });
    }
}

/// Area damage: every enemy and spawner within `radius` of `pos` takes
/// exactly `damage`; the boss takes it if within `radius` plus its own radius,
/// shields notwithstanding.
pub fn apply_area_damage(
    world: &mut World,
    pos: Vec2,
    radius: f32,
    damage: i32,
    bus: &mut EventBus,
    config: &GameConfig,
) {
    for idx in 0..world.enemies.len() {
        let e = &world.enemies[idx];
        if e.active && e.pos.distance(pos) <= radius {
            damage_enemy(world, idx, damage, bus);
        }
    }
    for idx in 0..world.spawners.len() {
        let s = &world.spawners[idx];
        if s.is_active() && s.pos.distance(pos) <= radius {
            damage_spawner(world, idx, damage, bus, config);
        }
    }
    let boss_in_range = world
        .boss
        .as_ref()
        .is_some_and(|b| !b.is_destroyed() && b.pos.distance(pos) <= radius + b.radius);
    if boss_in_range {
        damage_boss(world, damage, bus, config);
    }
}

fn detonate_missile(world: &mut World, idx: usize, cause: Detonation, bus: &mut EventBus, config: &GameConfig) -> bool {
    let missile = &mut world.missiles[idx];
    if !missile.detonate(cause) {
        return false;
    }
    bus.publish(GameEvent::MissileDetonated {
        pos: missile.pos,
        radius: config.missile.aoe_radius,
        damage: config.missile.aoe_damage,
    });
    true
}

fn player_bullets(world: &mut World, bus: &mut EventBus, config: &GameConfig, report: &mut CollisionReport) {
    for bi in 0..world.bullets.len() {
        let b = &world.bullets[bi];
        if !b.active || b.owner != BulletOwner::Player {
            continue;
        }
        let (bpos, brad, damage) = (b.pos, b.radius, b.damage);

        // Boss first: a shield block consumes the bullet before the body test
        if let Some(boss) = world.boss.as_ref().filter(|b| !b.is_destroyed()) {
            if let Some(shield) = boss.shield_hit(bpos, brad) {
                let at = shield.pos;
                world.bullets[bi].active = false;
                bus.publish(GameEvent::ShieldBlocked { pos: at });
                continue;
            }
            if circles_overlap(bpos, brad, boss.pos, boss.radius) {
                world.bullets[bi].active = false;
                report.bullet_hits += 1;
                damage_boss(world, damage, bus, config);
                continue;
            }
        }

        let enemy = world
            .enemies
            .iter()
            .position(|e| e.active && circles_overlap(bpos, brad, e.pos, e.radius));
        if let Some(ei) = enemy {
            world.bullets[bi].active = false;
            report.bullet_hits += 1;
            damage_enemy(world, ei, damage, bus);
            continue;
        }

        let spawner = world
            .spawners
            .iter()
            .position(|s| s.is_active() && circles_overlap(bpos, brad, s.pos, s.radius));
        if let Some(si) = spawner {
            world.bullets[bi].active = false;
            report.bullet_hits += 1;
            damage_spawner(world, si, damage, bus, config);
        }
    }
}

fn missiles(world: &mut World, bus: &mut EventBus, config: &GameConfig, report: &mut CollisionReport) {
    let direct = config.missile.direct_damage;
    for mi in 0..world.missiles.len() {
        let m = &world.missiles[mi];
        if !m.is_live() {
            continue;
        }
        let (mpos, mrad) = (m.pos, m.radius);

        if let Some(boss) = world.boss.as_ref().filter(|b| !b.is_destroyed()) {
            if let Some(shield) = boss.shield_hit(mpos, mrad) {
                let at = shield.pos;
                if detonate_missile(world, mi, Detonation::Shield, bus, config) {
                    bus.publish(GameEvent::ShieldBlocked { pos: at });
                }
                continue;
            }
            if circles_overlap(mpos, mrad, boss.pos, boss.radius) {
                if detonate_missile(world, mi, Detonation::Contact, bus, config) {
                    report.missile_hits += 1;
                    damage_boss(world, direct, bus, config);
                }
                continue;
            }
        }

        let enemy = world
            .enemies
            .iter()
            .position(|e| e.active && circles_overlap(mpos, mrad, e.pos, e.radius));
        if let Some(ei) = enemy {
            if detonate_missile(world, mi, Detonation::Contact, bus, config) {
                report.missile_hits += 1;
                damage_enemy(world, ei, direct, bus);
            }
            continue;
        }

        let spawner = world
            .spawners
            .iter()
            .position(|s| s.is_active() && circles_overlap(mpos, mrad, s.pos, s.radius));
        if let Some(si) = spawner {
            if detonate_missile(world, mi, Detonation::Contact, bus, config) {
                report.missile_hits += 1;
                damage_spawner(world, si, direct, bus, config);
            }
        }
    }
}

fn hostiles_vs_player(world: &mut World, bus: &mut EventBus, config: &GameConfig) {
    let (ppos, prad) = (world.player.pos, world.player.radius);

    for bi in 0..world.bullets.len() {
        let b = &world.bullets[bi];
        if b.active && b.owner == BulletOwner::Enemy && circles_overlap(b.pos, b.radius, ppos, prad) {
            let damage = b.damage;
            world.bullets[bi].active = false;
            damage_player(world, damage, bus, config);
        }
    }

    let rammed = world
        .enemies
        .iter()
        .any(|e| e.active && circles_overlap(e.pos, e.radius, ppos, prad));
    if rammed {
        damage_player(world, config.damage.contact, bus, config);
    }

    if let Some(boss) = world.boss.as_ref().filter(|b| !b.is_destroyed()) {
        let body = circles_overlap(boss.pos, boss.radius, ppos, prad);
        let shield = boss.shield_hit(ppos, prad).is_some();
        if body {
            let damage = config.damage.contact * config.damage.boss_contact_multiplier;
            damage_player(world, damage, bus, config);
        }
        if shield {
            damage_player(world, config.damage.contact, bus, config);
        }
    }
}

fn pickups(world: &mut World, bus: &mut EventBus) {
    let (ppos, prad) = (world.player.pos, world.player.radius);
    for c in world.collectibles.iter_mut() {
        if !c.is_live() || !circles_overlap(c.pos, c.radius, ppos, prad) {
            continue;
        }
        if let Some(value) = c.collect() {
            if c.kind == CollectibleKind::Health {
                world.player.heal(value as i32);
            }
            bus.publish(GameEvent::CollectibleCollected {
                id: c.id,
                kind: c.kind,
                value,
            });
        }
    }
}

/// Evaluate all pair groups once, after positions were updated
pub fn resolve(world: &mut World, bus: &mut EventBus, config: &GameConfig) -> CollisionReport {
    let mut report = CollisionReport::default();
    if world.player.dead {
        return report;
    }
    player_bullets(world, bus, config, &mut report);
    missiles(world, bus, config, &mut report);
    hostiles_vs_player(world, bus, config);
    pickups(world, bus);
    report
}
