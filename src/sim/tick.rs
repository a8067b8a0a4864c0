//! Per-frame simulation tick
//!
//! Advances one session by a variable delta: input, scheduled actions,
//! entity updates, collision resolution, then event draining. Only the
//! Playing phase runs gameplay.

use glam::Vec2;

use super::collision;
use super::enemy::update_enemy;
use super::events::GameEvent;
use super::projectile::BulletOwner;
use super::session::{ScheduledAction, Session, SessionPhase};
use super::spawner::{SpawnerOwner, select_enemy_type};
use super::state::World;
use crate::consts::MAX_FRAME_DT;

/// How far below its target the autopilot parks the ship
const AUTOPILOT_STANDOFF: f32 = 250.0;
/// Autopilot re-parks once it drifts this far from its station
const AUTOPILOT_SLACK: f32 = 60.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Pointer position the ship steers toward
    pub pointer: Option<Vec2>,
    /// Start / fire missiles / restart, depending on phase
    pub click: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the session by `dt` seconds
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    let mut input = *input;
    if input.idle_mode {
        autopilot(session, &mut input);
    }

    if let Some(pointer) = input.pointer {
        session.set_pointer(pointer);
    }
    if input.pause {
        session.toggle_pause();
    }
    if input.click {
        session.click();
    }

    if session.phase != SessionPhase::Playing {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    session.stats.play_time += dt;

    for action in session.scheduler.advance(dt) {
        session.run_action(action);
    }
    if session.phase != SessionPhase::Playing {
        // Section or campaign ended at this boundary
        session.drain_events();
        return;
    }

    update_player(session, dt);
    update_enemies(session, dt);
    update_spawners(session, dt);
    update_boss(session, dt);
    update_projectiles(session, dt);

    let report = collision::resolve(&mut session.world, &mut session.bus, &session.config);
    session.stats.bullets_hit += report.bullet_hits;
    session.stats.missiles_hit += report.missile_hits;

    update_collectibles(session, dt);

    session.drain_events();
    session.world.prune();
}

fn update_player(session: &mut Session, dt: f32) {
    let cfg = &session.config.player;
    session.world.player.update(dt, cfg);
    for shot in session.world.player.fire(cfg) {
        let fired = session.world.spawn_bullet(
            BulletOwner::Player,
            shot.pos,
            shot.angle,
            cfg.bullet_speed,
            shot.damage,
            &session.config,
        );
        if fired.is_some() {
            session.stats.bullets_fired += 1;
        }
    }
}

fn update_enemies(session: &mut Session, dt: f32) {
    let target = session.world.player.pos;
    for enemy in session.world.enemies.iter_mut() {
        if let Some(angle) = update_enemy(enemy, target, dt) {
            session.bus.publish(GameEvent::EnemyFired {
                pos: enemy.pos,
                angle,
                speed: session.config.bullets.enemy_speed,
                damage: session.config.damage.enemy_bullet,
            });
        }
    }
}

/// Drip spawns from every spawner still allowed to emit
fn update_spawners(session: &mut Session, dt: f32) {
    let cfg = &session.config.spawner;
    let World { spawners, rng, .. } = &mut session.world;
    for spawner in spawners.iter_mut() {
        if spawner.update(dt, cfg.drip_interval) {
            let pos = spawner.spawn_point(rng, cfg);
            let kind = select_enemy_type(spawner.effective_difficulty(), rng);
            session.bus.publish(GameEvent::EnemySpawnRequest {
                spawner: spawner.id,
                pos,
                kind,
            });
        }
    }
}

fn update_boss(session: &mut Session, dt: f32) {
    let player = Some(session.world.player.pos);
    let cfg = &session.config;
    let World { boss, rng, .. } = &mut session.world;
    let Some(boss) = boss.as_mut() else {
        return;
    };
    let update = boss.update(dt, player, &cfg.arena, &cfg.boss, rng);
    let origin = boss.pos;

    for angle in update.fan {
        session.bus.publish(GameEvent::EnemyFired {
            pos: origin,
            angle,
            speed: cfg.boss.bullet_speed,
            damage: cfg.boss.bullet_damage,
        });
    }

    if let Some(summon) = update.summon {
        let id = session.world.spawn_spawner(
            summon.pos,
            summon.difficulty,
            SpawnerOwner::Boss,
            Some(cfg.boss.summon_hp),
            cfg,
        );
        if let Some(boss) = session.world.boss.as_mut() {
            boss.summons.push(id);
        }
        log::debug!("Boss summoned spawner #{id}");
        session.scheduler.schedule_once(
            cfg.timing.initial_burst_delay,
            ScheduledAction::InitialBurst { spawner: id },
        );
    }
}

fn update_projectiles(session: &mut Session, dt: f32) {
    let arena = &session.config.arena;
    for bullet in session.world.bullets.iter_mut() {
        bullet.update(dt, arena);
    }
    let missile_cfg = &session.config.missile;
    for missile in session.world.missiles.iter_mut() {
        if let Some(cause) = missile.update(dt, arena) {
            if missile.detonate(cause) {
                log::debug!("Missile #{} detonated ({cause:?})", missile.id);
                session.bus.publish(GameEvent::MissileDetonated {
                    pos: missile.pos,
                    radius: missile_cfg.aoe_radius,
                    damage: missile_cfg.aoe_damage,
                });
            }
        }
    }
}

fn update_collectibles(session: &mut Session, dt: f32) {
    let player = session.world.player.pos;
    let speed = session.config.drops.magnet_speed;
    for collectible in session.world.collectibles.iter_mut() {
        collectible.update(dt, player, speed);
    }
}

/// Demo player: parks below the nearest hostile, keeps it in the line of
/// fire, empties the missile rack and spends everything at checkpoints
fn autopilot(session: &mut Session, input: &mut TickInput) {
    match session.phase {
        SessionPhase::Idle => input.click = true,
        SessionPhase::Checkpoint => {
            while let Some(key) = session.economy.cheapest_affordable() {
                if !session.purchase(key) {
                    break;
                }
            }
            session.proceed_to_next();
        }
        SessionPhase::Playing => {
            let ship = session.world.player.pos;
            let Some(target) = session.world.nearest_hostile(ship) else {
                return;
            };
            let arena = &session.config.arena;
            let station = Vec2::new(
                target.x.clamp(0.0, arena.width),
                (target.y + AUTOPILOT_STANDOFF).clamp(0.0, arena.height - 40.0),
            );
            input.pointer = Some(if ship.distance(station) > AUTOPILOT_SLACK {
                station
            } else {
                // Nudge toward the target so the ship turns to face it
                ship + (target - ship).normalize_or_zero() * 8.0
            });
            input.click = session.world.player.missiles > 0;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::FRAME_DT;
    use crate::progress::MemoryProgress;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::spawner::Difficulty;

    fn started() -> Session {
        let mut session = Session::new(GameConfig::default(), 7, Box::new(MemoryProgress::new()));
        session.start();
        session.world.player.invulnerable = f32::MAX;
        session
    }

    #[test]
    fn test_idle_does_not_advance() {
        let mut session = Session::new(GameConfig::default(), 7, Box::new(MemoryProgress::new()));
        tick(&mut session, &TickInput::default(), FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.stats.play_time, 0.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut session = started();
        tick(&mut session, &TickInput::default(), 5.0);
        assert!((session.stats.play_time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_auto_fire_counts_bullets() {
        let mut session = started();
        for _ in 0..30 {
            tick(&mut session, &TickInput::default(), FRAME_DT);
        }
        // One shot every 0.2 s over half a second
        assert_eq!(session.stats.bullets_fired, 3);
    }

    #[test]
    fn test_shooter_fires_at_player() {
        let mut session = started();
        let near = session.world.player.pos + Vec2::new(150.0, 0.0);
        session.world.spawn_enemy(EnemyKind::Shooter, near);
        tick(&mut session, &TickInput::default(), FRAME_DT);
        let enemy_bullets: Vec<_> = session
            .world
            .bullets
            .iter()
            .filter(|b| b.owner == BulletOwner::Enemy)
            .collect();
        assert_eq!(enemy_bullets.len(), 1);
        assert_eq!(enemy_bullets[0].damage, 15);
    }

    #[test]
    fn test_missile_area_damage_reaches_spawner() {
        let mut session = started();
        let id = session.world.spawn_spawner(
            Vec2::new(700.0, 300.0),
            Difficulty::Easy,
            SpawnerOwner::Screen,
            None,
            &session.config,
        );
        session.fire_missiles();
        session.world.missiles[0].target = Vec2::new(640.0, 300.0);

        for _ in 0..30 {
            tick(&mut session, &TickInput::default(), FRAME_DT);
        }
        assert!(session.world.missiles.is_empty());
        assert_eq!(session.world.spawner(id).map(|s| s.hp), Some(175));
    }

    #[test]
    fn test_pointer_steers_ship() {
        let mut session = started();
        let start = session.world.player.pos;
        let input = TickInput {
            pointer: Some(start + Vec2::new(200.0, 0.0)),
            ..TickInput::default()
        };
        for _ in 0..10 {
            tick(&mut session, &input, FRAME_DT);
        }
        assert!(session.world.player.pos.x > start.x + 50.0);
        assert!(session.world.player.angle.abs() < 1e-3);
    }

    #[test]
    fn test_autopilot_starts_and_plays() {
        let mut session = Session::new(GameConfig::default(), 11, Box::new(MemoryProgress::new()));
        let input = TickInput {
            idle_mode: true,
            ..TickInput::default()
        };
        tick(&mut session, &input, FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Playing);

        for _ in 0..600 {
            tick(&mut session, &input, FRAME_DT);
        }
        assert!(session.stats.bullets_fired > 0);
        assert_ne!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs must replay the same run
        let input = TickInput {
            idle_mode: true,
            ..TickInput::default()
        };
        let mut a = Session::new(GameConfig::default(), 99999, Box::new(MemoryProgress::new()));
        let mut b = Session::new(GameConfig::default(), 99999, Box::new(MemoryProgress::new()));
        for _ in 0..1200 {
            tick(&mut a, &input, FRAME_DT);
            tick(&mut b, &input, FRAME_DT);
        }

        assert_eq!(a.world.enemies.len(), b.world.enemies.len());
        assert_eq!(a.world.player.pos, b.world.player.pos);
        let left = serde_json::to_string(&a.summary()).unwrap();
        let right = serde_json::to_string(&b.summary()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_autopilot_spends_at_checkpoint() {
        let mut session = started();
        for idx in 0..session.world.spawners.len() {
            collision::damage_spawner(&mut session.world, idx, 9999, &mut session.bus, &session.config);
        }
        for _ in 0..160 {
            tick(&mut session, &TickInput::default(), FRAME_DT);
        }
        assert_eq!(session.phase(), SessionPhase::Checkpoint);

        session.economy.balance = 45;
        let input = TickInput {
            idle_mode: true,
            ..TickInput::default()
        };
        tick(&mut session, &input, FRAME_DT);
        // Fire rate (20) then bullet damage (25)
        assert_eq!(session.economy.balance, 0);
        assert_eq!(session.stats.upgrades_purchased, 2);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }
}
