//! Session state machine
//!
//! Owns the world, progression, economy, scheduler and event bus for one run
//! and gates the per-frame tick:
//!
//! ```text
//! Idle --start--> Playing <--pause--> Paused
//!                    |  \--section cleared--> Checkpoint --proceed--> Playing
//!                    |                                   \--last----> Completed
//!                    +--player died--> Defeated
//!                    +--boss down + grace--> Completed
//! Completed/Defeated --restart--> Idle
//! ```
//!
//! Deferred effects are `ScheduledAction`s on the scheduler; notifications
//! flow through the bus and are handled here after each tick phase.

use glam::Vec2;
use rand::Rng;

use super::boss::Boss;
use super::collectible::{CollectibleKind, CrystalSize, scatter};
use super::collision;
use super::events::{EventBus, EventListener, GameEvent};
use super::scheduler::Scheduler;
use super::spawner::{SpawnerOwner, burst_size, screen_layout, select_enemy_type};
use super::state::World;
use super::waves::{Advance, ScreenDef, WaveController};
use crate::config::GameConfig;
use crate::economy::{Economy, EconomySnapshot, UpgradeKey};
use crate::progress::ProgressStore;
use crate::sim::projectile::BulletOwner;
use crate::stats::{DeathLocation, RunOutcome, RunStats, RunSummary};

/// Top-level mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    /// Waiting for the start action
    Idle,
    Playing,
    Paused,
    /// Section cleared, upgrade panel open
    Checkpoint,
    Completed,
    Defeated,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Defeated)
    }
}

/// Entity a deferred removal points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Enemy(u32),
    Spawner(u32),
}

/// Deferred work run at a tick boundary. Entity-bound actions no-op when
/// their target is already gone.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    /// Spawner's opening burst after it appears
    InitialBurst { spawner: u32 },
    /// One enemy of a burst
    BurstSpawn { spawner: u32 },
    /// Post-clear grace period ended
    ScreenGraceElapsed,
    StartScreen,
    /// Boss warning elapsed
    SpawnBoss,
    /// Post-boss grace period ended
    VictoryGrace,
    /// One missile of a volley
    LaunchMissile,
    DropCollectible { pos: Vec2, kind: CollectibleKind },
    ExpireCollectible { id: u32 },
    Despawn(EntityRef),
}

pub struct Session {
    pub(crate) config: GameConfig,
    pub(crate) world: World,
    pub(crate) waves: WaveController,
    pub(crate) economy: Economy,
    pub(crate) scheduler: Scheduler<ScheduledAction>,
    pub(crate) bus: EventBus,
    pub(crate) phase: SessionPhase,
    pub(crate) stats: RunStats,
    progress: Box<dyn ProgressStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("section", &self.waves.section_index())
            .field("screen", &self.waves.screen_index())
            .field("score", &self.world.score)
            .field("balance", &self.economy.balance)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: GameConfig, seed: u64, progress: Box<dyn ProgressStore>) -> Self {
        let world = World::new(seed, &config);
        let waves = WaveController::new(config.campaign.clone());
        Self {
            config,
            world,
            waves,
            economy: Economy::new(),
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            phase: SessionPhase::Idle,
            stats: RunStats::new(),
            progress,
        }
    }

    /// Register a read-only observer (HUD, audio, achievements)
    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.bus.subscribe(listener);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn waves(&self) -> &WaveController {
        &self.waves
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn score(&self) -> u64 {
        self.world.score
    }

    /// Boss screen in progress (warning or fight)
    pub fn is_boss_fight(&self) -> bool {
        self.phase == SessionPhase::Playing && self.waves.is_boss_fight()
    }

    /// Sections conquered in this or earlier runs
    pub fn conquered_sections(&self) -> Vec<String> {
        self.progress.conquered_sections()
    }

    pub fn upgrade_snapshot(&self) -> EconomySnapshot {
        self.economy.snapshot()
    }

    /// Pointer moved: the ship eases toward it
    pub fn set_pointer(&mut self, pos: Vec2) {
        self.world.player.set_target(pos);
    }

    /// Begin a run from Idle
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.world.reset(&self.config);
        self.waves.reset();
        self.scheduler.reset();
        self.bus.clear();
        self.stats = RunStats::new();
        self.economy.apply_all(&mut self.world.player, &self.config.player);
        self.phase = SessionPhase::Playing;
        log::info!("Run started (seed {})", self.world.seed);
        self.enter_screen();
        true
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Playing,
            other => other,
        };
    }

    /// Context action: start, fire missiles or restart
    pub fn click(&mut self) {
        match self.phase {
            SessionPhase::Idle => {
                self.start();
            }
            SessionPhase::Playing => self.fire_missiles(),
            SessionPhase::Completed | SessionPhase::Defeated => {
                self.restart();
            }
            SessionPhase::Paused | SessionPhase::Checkpoint => {}
        }
    }

    /// Launch the whole missile stock, one every launch spacing
    pub fn fire_missiles(&mut self) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let stock = self.world.player.missiles;
        if stock == 0 {
            return;
        }
        self.launch_missile();
        for i in 1..stock {
            let delay = i as f32 * self.config.missile.launch_spacing;
            self.scheduler.schedule_once(delay, ScheduledAction::LaunchMissile);
        }
    }

    /// Back to Idle with every collection and the economy cleared
    pub fn restart(&mut self) -> bool {
        if !self.phase.is_terminal() {
            return false;
        }
        self.world.reset(&self.config);
        self.waves.reset();
        self.scheduler.reset();
        self.bus.clear();
        self.economy.reset();
        self.stats = RunStats::new();
        self.phase = SessionPhase::Idle;
        log::info!("Session reset");
        true
    }

    /// Buy an upgrade; only possible at a checkpoint
    pub fn purchase(&mut self, key: UpgradeKey) -> bool {
        if self.phase != SessionPhase::Checkpoint {
            return false;
        }
        let bought = self.economy.purchase(key, &mut self.world.player, &self.config.player);
        if bought {
            self.stats.upgrades_purchased += 1;
        }
        bought
    }

    /// Leave the checkpoint for the next section (or finish the campaign)
    pub fn proceed_to_next(&mut self) -> bool {
        if self.phase != SessionPhase::Checkpoint {
            return false;
        }
        if self.waves.proceed() {
            self.phase = SessionPhase::Playing;
            self.scheduler
                .schedule_once(self.config.timing.next_screen_delay, ScheduledAction::StartScreen);
        } else {
            self.phase = SessionPhase::Completed;
            log::info!("Campaign complete, score {}", self.world.score);
        }
        true
    }

    /// Drop listeners and pending work
    pub fn teardown(&mut self) {
        self.bus.unsubscribe_all();
        self.bus.clear();
        self.scheduler.clear();
    }

    pub fn summary(&self) -> RunSummary {
        let outcome = match self.phase {
            SessionPhase::Completed => RunOutcome::Victory,
            SessionPhase::Defeated => RunOutcome::Defeat,
            _ => RunOutcome::Unfinished,
        };
        self.stats.summarize(outcome, self.world.score, self.world.seed)
    }

    // === Progression ===

    fn current_section_id(&self) -> String {
        self.waves
            .current_section()
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    fn enter_screen(&mut self) {
        self.world.auto_magnetize = false;
        self.world.spawners.clear();
        let Some(screen) = self.waves.begin_screen() else {
            return;
        };
        match screen {
            ScreenDef::Wave { difficulty, spawners } => {
                let positions = screen_layout(
                    spawners,
                    self.config.arena.width,
                    &mut self.world.rng,
                    &self.config.spawner,
                );
                for pos in positions {
                    let id = self
                        .world
                        .spawn_spawner(pos, difficulty, SpawnerOwner::Screen, None, &self.config);
                    self.scheduler.schedule_once(
                        self.config.timing.initial_burst_delay,
                        ScheduledAction::InitialBurst { spawner: id },
                    );
                }
            }
            ScreenDef::Boss => {
                self.world.enemies.clear();
                self.world.boss = None;
                log::info!("Boss incoming");
                self.scheduler
                    .schedule_once(self.config.timing.boss_warning, ScheduledAction::SpawnBoss);
            }
        }
    }

    /// Shared by the spawner-destroyed handler and the per-tick poll
    pub(crate) fn check_screen_complete(&mut self) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let spawners = self.world.active_spawner_count();
        if self.waves.try_complete_screen(spawners, self.world.boss_active()) {
            self.complete_screen();
        }
    }

    fn complete_screen(&mut self) {
        for idx in 0..self.world.enemies.len() {
            let enemy = &self.world.enemies[idx];
            if enemy.active {
                let hp = enemy.hp.max(1);
                collision::damage_enemy(&mut self.world, idx, hp, &mut self.bus);
            }
        }
        self.world.bullets.clear();
        self.world.missiles.clear();
        self.scheduler
            .cancel_where(|a| matches!(a, ScheduledAction::LaunchMissile));
        for spawner in &mut self.world.spawners {
            spawner.disabled = true;
        }
        self.world.magnetize_all();
        self.world.auto_magnetize = true;

        self.bus.publish(GameEvent::ScreenCompleted {
            section: self.waves.section_index(),
            screen: self.waves.screen_index(),
        });
        self.scheduler
            .schedule_once(self.config.timing.screen_grace, ScheduledAction::ScreenGraceElapsed);
    }

    fn section_cleared(&mut self) {
        let section = self.current_section_id();
        log::info!("Section '{section}' cleared");
        self.progress.mark_section_conquered(&section);
        self.stats.sections_completed.push(section.clone());
        self.bus.publish(GameEvent::SectionCompleted { section });
    }

    fn launch_missile(&mut self) {
        if self.world.player.take_missile() {
            self.world.spawn_missile(&self.config);
            self.stats.missiles_fired += 1;
        }
    }

    /// Ask spawner `id` for one enemy (no-op if it is gone or disabled)
    pub(crate) fn request_spawn(&mut self, id: u32) {
        let World { spawners, rng, .. } = &mut self.world;
        let Some(spawner) = spawners.iter().find(|s| s.id == id) else {
            return;
        };
        if !spawner.can_emit() {
            return;
        }
        let pos = spawner.spawn_point(rng, &self.config.spawner);
        let kind = select_enemy_type(spawner.effective_difficulty(), rng);
        self.bus.publish(GameEvent::EnemySpawnRequest { spawner: id, pos, kind });
    }

    pub(crate) fn run_action(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::InitialBurst { spawner } => {
                let live = self.world.spawner(spawner).is_some_and(|s| s.can_emit());
                if !live {
                    return;
                }
                let count = burst_size(&mut self.world.rng, &self.config.spawner);
                for i in 0..count {
                    self.scheduler.schedule_once(
                        i as f32 * self.config.spawner.burst_spacing,
                        ScheduledAction::BurstSpawn { spawner },
                    );
                }
            }
            ScheduledAction::BurstSpawn { spawner } => self.request_spawn(spawner),
            ScheduledAction::ScreenGraceElapsed => match self.waves.advance() {
                Some(Advance::NextScreen) => {
                    self.scheduler
                        .schedule_once(self.config.timing.next_screen_delay, ScheduledAction::StartScreen);
                }
                Some(Advance::SectionComplete) => {
                    self.section_cleared();
                    self.phase = SessionPhase::Checkpoint;
                }
                None => {}
            },
            ScheduledAction::StartScreen => self.enter_screen(),
            ScheduledAction::SpawnBoss => {
                if self.waves.boss_spawned() {
                    let id = self.world.next_entity_id();
                    let pos = Vec2::new(self.config.arena.width / 2.0, self.config.boss.spawn_y);
                    self.world.boss = Some(Boss::new(id, pos, &self.config.boss));
                    log::info!("Boss #{id} spawned");
                }
            }
            ScheduledAction::VictoryGrace => {
                if self.phase.is_terminal() {
                    return;
                }
                self.waves.finish();
                self.section_cleared();
                self.phase = SessionPhase::Completed;
                log::info!("Victory, score {}", self.world.score);
            }
            ScheduledAction::LaunchMissile => self.launch_missile(),
            ScheduledAction::DropCollectible { pos, kind } => {
                self.bus.publish(GameEvent::CollectibleSpawnRequest { pos, kind });
            }
            ScheduledAction::ExpireCollectible { id } => {
                if let Some(c) = self.world.collectible_mut(id) {
                    c.expire();
                }
            }
            ScheduledAction::Despawn(EntityRef::Enemy(id)) => {
                self.world.enemies.retain(|e| e.id != id || e.active);
            }
            ScheduledAction::Despawn(EntityRef::Spawner(id)) => {
                self.world.spawners.retain(|s| s.id != id || s.is_active());
            }
        }
    }

    // === Event handling ===

    /// Drain the bus (handlers may publish more), polling screen completion
    /// until nothing is left
    pub(crate) fn drain_events(&mut self) {
        loop {
            while let Some(event) = self.bus.pop() {
                self.handle_event(event);
            }
            self.check_screen_complete();
            if self.bus.is_empty() {
                break;
            }
        }
        self.prune_summons();
    }

    fn prune_summons(&mut self) {
        let World { boss, spawners, .. } = &mut self.world;
        if let Some(boss) = boss.as_mut() {
            boss.summons
                .retain(|id| spawners.iter().any(|s| s.id == *id && s.is_active()));
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::EnemySpawnRequest { spawner, pos, kind } => {
                // Requests queued before the screen cleared are stale
                if self.world.spawner(spawner).is_some_and(|s| s.can_emit()) {
                    self.world.spawn_enemy(kind, pos);
                }
            }
            GameEvent::EnemyFired {
                pos,
                angle,
                speed,
                damage,
            } => {
                self.world
                    .spawn_bullet(BulletOwner::Enemy, pos, angle, speed, damage, &self.config);
            }
            GameEvent::EnemyDied {
                enemy,
                kind,
                pos,
                points,
                crystals,
            } => {
                log::debug!("{} #{enemy} died", kind.name());
                self.world.score += points as u64;
                self.stats.record_kill(kind);
                let drops = &self.config.drops;
                for _ in 0..crystals {
                    let at = scatter(pos, drops.scatter, &mut self.world.rng);
                    self.bus.publish(GameEvent::CollectibleSpawnRequest {
                        pos: at,
                        kind: CollectibleKind::Crystal(CrystalSize::Small),
                    });
                }
                if self.world.rng.random_bool(drops.health_chance.clamp(0.0, 1.0)) {
                    self.bus.publish(GameEvent::CollectibleSpawnRequest {
                        pos,
                        kind: CollectibleKind::Health,
                    });
                }
                self.scheduler.schedule_once(
                    self.config.timing.enemy_removal,
                    ScheduledAction::Despawn(EntityRef::Enemy(enemy)),
                );
            }
            GameEvent::SpawnerDestroyed { spawner, pos, .. } => {
                let cfg = &self.config.spawner;
                self.world.score += cfg.death_score;
                self.stats.spawners_destroyed += 1;
                let lo = cfg.death_drop_min.min(cfg.death_drop_max);
                let count = self.world.rng.random_range(lo..=cfg.death_drop_max.max(lo));
                for i in 0..count {
                    let at = scatter(pos, self.config.drops.scatter, &mut self.world.rng);
                    self.scheduler.schedule_once(
                        i as f32 * cfg.death_drop_spacing,
                        ScheduledAction::DropCollectible {
                            pos: at,
                            kind: CollectibleKind::Crystal(CrystalSize::Large),
                        },
                    );
                }
                self.scheduler.schedule_once(
                    self.config.timing.spawner_removal,
                    ScheduledAction::Despawn(EntityRef::Spawner(spawner)),
                );
                self.prune_summons();
                self.check_screen_complete();
            }
            GameEvent::CollectibleSpawnRequest { pos, kind } => {
                if let Some(id) = self.world.spawn_collectible(kind, pos, &self.config) {
                    self.scheduler.schedule_once(
                        kind.lifetime(&self.config.drops),
                        ScheduledAction::ExpireCollectible { id },
                    );
                }
            }
            GameEvent::CollectibleCollected { id, kind, value } => {
                if let CollectibleKind::Crystal(_) = kind {
                    self.economy.credit(value);
                    self.stats.crystals_collected += value;
                }
                self.scheduler
                    .cancel_where(|a| *a == ScheduledAction::ExpireCollectible { id });
            }
            GameEvent::MissileDetonated { pos, radius, damage } => {
                collision::apply_area_damage(&mut self.world, pos, radius, damage, &mut self.bus, &self.config);
            }
            GameEvent::PlayerDied { pos } => {
                if self.phase.is_terminal() {
                    return;
                }
                self.stats.death = Some(DeathLocation {
                    section: self.current_section_id(),
                    screen: self.waves.screen_index(),
                });
                self.phase = SessionPhase::Defeated;
                log::info!("Player destroyed at ({:.0}, {:.0}), score {}", pos.x, pos.y, self.world.score);
            }
            GameEvent::BossDefeated { pos } => self.boss_defeated(pos),
            GameEvent::ShieldBlocked { .. }
            | GameEvent::BossPhaseChanged { .. }
            | GameEvent::PlayerDamaged { .. }
            | GameEvent::ScreenCompleted { .. }
            | GameEvent::SectionCompleted { .. } => {}
        }
    }

    fn boss_defeated(&mut self, pos: Vec2) {
        if !self.waves.boss_defeated() {
            return;
        }
        log::info!("Boss defeated");
        for idx in 0..self.world.spawners.len() {
            let s = &self.world.spawners[idx];
            if s.owner == SpawnerOwner::Boss && s.is_active() {
                collision::damage_spawner(&mut self.world, idx, 9999, &mut self.bus, &self.config);
            }
        }

        let boss = &self.config.boss;
        for i in 0..boss.death_drops {
            let at = scatter(pos, boss.death_drop_scatter, &mut self.world.rng);
            self.scheduler.schedule_once(
                i as f32 * boss.death_drop_spacing,
                ScheduledAction::DropCollectible {
                    pos: at,
                    kind: CollectibleKind::Crystal(CrystalSize::Medium),
                },
            );
        }
        self.world.score += boss.death_score;
        self.world.magnetize_all();
        self.world.auto_magnetize = true;
        self.scheduler
            .schedule_once(self.config.timing.victory_grace, ScheduledAction::VictoryGrace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::progress::MemoryProgress;
    use crate::sim::events::EventKind;
    use crate::sim::tick::{TickInput, tick};
    use crate::sim::waves::{ScreenState, SectionDef};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder(Vec<EventKind>);

    impl EventListener for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.0.push(event.kind());
        }
    }

    fn session_with(config: GameConfig) -> (Session, Rc<RefCell<Recorder>>) {
        let mut session = Session::new(config, 42, Box::new(MemoryProgress::new()));
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        session.subscribe(Box::new(recorder.clone()));
        (session, recorder)
    }

    fn started() -> (Session, Rc<RefCell<Recorder>>) {
        let (mut session, recorder) = session_with(GameConfig::default());
        assert!(session.start());
        // Keep the ship alive for timing-focused tests
        session.world.player.invulnerable = f32::MAX;
        (session, recorder)
    }

    fn run(session: &mut Session, seconds: f32) {
        let frames = (seconds / FRAME_DT).ceil() as u32;
        for _ in 0..frames {
            tick(session, &TickInput::default(), FRAME_DT);
        }
    }

    fn seen(recorder: &Rc<RefCell<Recorder>>, kind: EventKind) -> usize {
        recorder.borrow().0.iter().filter(|&&k| k == kind).count()
    }

    fn destroy_spawners(session: &mut Session) {
        for idx in 0..session.world.spawners.len() {
            collision::damage_spawner(&mut session.world, idx, 9999, &mut session.bus, &session.config);
        }
    }

    #[test]
    fn test_start_places_first_screen() {
        let (mut session, _) = started();
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.world.spawners.len(), 2);
        assert!(session.world.enemies.is_empty());

        run(&mut session, 0.6);
        assert!(session.world.live_enemy_count() >= 1);
    }

    #[test]
    fn test_start_only_from_idle() {
        let (mut session, _) = started();
        assert!(!session.start());
    }

    #[test]
    fn test_screen_completion_fires_once() {
        let (mut session, recorder) = started();
        run(&mut session, 1.0);
        destroy_spawners(&mut session);
        tick(&mut session, &TickInput::default(), FRAME_DT);
        tick(&mut session, &TickInput::default(), FRAME_DT);

        assert_eq!(seen(&recorder, EventKind::SpawnerDestroyed), 2);
        assert_eq!(seen(&recorder, EventKind::ScreenCompleted), 1);
        assert_eq!(session.waves.state(), ScreenState::Cleared);
        assert_eq!(session.world.live_enemy_count(), 0);
        assert!(session.world.missiles.is_empty());
        assert!(session.world.auto_magnetize);
    }

    #[test]
    fn test_no_spawns_after_screen_clear() {
        let (mut session, recorder) = started();
        assert!(session.world.enemies.is_empty());
        session.world.spawners[1].hp = 165;

        // One collision pass: first spawner dies, second drops a damage
        // bucket (queuing a bonus spawn) and then dies too
        collision::damage_spawner(&mut session.world, 0, 9999, &mut session.bus, &session.config);
        collision::damage_spawner(&mut session.world, 1, 10, &mut session.bus, &session.config);
        collision::damage_spawner(&mut session.world, 1, 9999, &mut session.bus, &session.config);
        session.drain_events();

        assert_eq!(seen(&recorder, EventKind::EnemySpawnRequest), 1);
        assert_eq!(seen(&recorder, EventKind::ScreenCompleted), 1);
        assert_eq!(session.waves.state(), ScreenState::Cleared);
        assert_eq!(session.world.live_enemy_count(), 0);
    }

    #[test]
    fn test_boss_enters_at_configured_height() {
        let mut config = GameConfig {
            campaign: vec![SectionDef {
                id: "boss".into(),
                name: "Final Guardian".into(),
                screens: vec![ScreenDef::Boss],
            }],
            ..GameConfig::default()
        };
        config.boss.spawn_y = 260.0;
        let (mut session, _) = session_with(config);
        session.start();
        session.world.player.invulnerable = f32::MAX;

        run(&mut session, 2.1);
        let boss_pos = session.world.boss.as_ref().map(|b| b.pos);
        assert_eq!(boss_pos, Some(Vec2::new(640.0, 260.0)));
    }

    #[test]
    fn test_section_checkpoint_and_purchase() {
        let (mut session, recorder) = started();
        destroy_spawners(&mut session);
        run(&mut session, 2.6);

        assert_eq!(session.phase(), SessionPhase::Checkpoint);
        assert_eq!(seen(&recorder, EventKind::SectionCompleted), 1);
        assert_eq!(session.conquered_sections(), vec!["about"]);
        // 500 per spawner
        assert!(session.score() >= 1000);

        // Gameplay is frozen at the checkpoint
        let before = session.scheduler.now();
        run(&mut session, 1.0);
        assert_eq!(session.scheduler.now(), before);

        session.economy.balance = 50;
        assert!(session.purchase(UpgradeKey::BulletDamage));
        assert_eq!(session.economy.balance, 25);
        assert_eq!(session.world.player.bullet_damage, 12);
        assert!(!session.purchase(UpgradeKey::BulletDamage));
        assert_eq!(session.economy.balance, 25);
        assert_eq!(session.stats.upgrades_purchased, 1);

        assert!(session.proceed_to_next());
        assert_eq!(session.phase(), SessionPhase::Playing);
        run(&mut session, 1.1);
        assert_eq!(session.waves.section_index(), 1);
        assert_eq!(session.world.active_spawner_count(), 2);
    }

    #[test]
    fn test_purchase_rejected_while_playing() {
        let (mut session, _) = started();
        session.economy.balance = 100;
        assert!(!session.purchase(UpgradeKey::FireRate));
        assert_eq!(session.economy.balance, 100);
    }

    #[test]
    fn test_defeat_fires_once() {
        let (mut session, recorder) = started();
        session.world.player.invulnerable = 0.0;
        session.world.player.hp = 10;
        let pos = session.world.player.pos;
        session
            .world
            .spawn_bullet(BulletOwner::Enemy, pos, 0.0, 0.0, 15, &session.config);
        session
            .world
            .spawn_bullet(BulletOwner::Enemy, pos, 0.0, 0.0, 15, &session.config);
        tick(&mut session, &TickInput::default(), FRAME_DT);

        assert_eq!(session.phase(), SessionPhase::Defeated);
        assert_eq!(session.world.player.hp, 0);
        assert_eq!(seen(&recorder, EventKind::PlayerDied), 1);
        assert_eq!(
            session.stats.death,
            Some(DeathLocation {
                section: "about".into(),
                screen: 0,
            })
        );
        assert_eq!(session.summary().outcome, RunOutcome::Defeat);
    }

    #[test]
    fn test_restart_clears_run() {
        let (mut session, _) = started();
        session.economy.balance = 80;
        session.world.player.invulnerable = 0.0;
        session.world.player.hp = 1;
        let pos = session.world.player.pos;
        session
            .world
            .spawn_bullet(BulletOwner::Enemy, pos, 0.0, 0.0, 15, &session.config);
        tick(&mut session, &TickInput::default(), FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Defeated);

        let click = TickInput {
            click: true,
            ..TickInput::default()
        };
        tick(&mut session, &click, FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.economy.balance, 0);
        assert!(session.world.spawners.is_empty());
        assert_eq!(session.world.player.hp, session.config.player.max_hp);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let (mut session, _) = started();
        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        tick(&mut session, &pause, FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Paused);
        run(&mut session, 1.0);
        assert!(session.world.enemies.is_empty());
        assert_eq!(session.scheduler.now(), 0.0);

        tick(&mut session, &pause, FRAME_DT);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_missile_volley_is_spaced() {
        let (mut session, _) = started();
        session.world.player.max_missiles = 2;
        session.world.player.missiles = 2;
        session.fire_missiles();
        assert_eq!(session.world.missiles.len(), 1);
        assert_eq!(session.world.player.missiles, 1);

        run(&mut session, 0.25);
        assert_eq!(session.stats.missiles_fired, 2);
        assert_eq!(session.world.player.missiles, 0);
    }

    #[test]
    fn test_collectible_expiry_and_cancel() {
        let (mut session, _) = started();
        session.bus.publish(GameEvent::CollectibleSpawnRequest {
            pos: Vec2::new(100.0, 600.0),
            kind: CollectibleKind::Health,
        });
        let ppos = session.world.player.pos;
        session.bus.publish(GameEvent::CollectibleSpawnRequest {
            pos: ppos,
            kind: CollectibleKind::Crystal(CrystalSize::Small),
        });
        session.drain_events();
        assert_eq!(session.world.collectibles.len(), 2);

        let id_of = |session: &Session, health: bool| {
            session
                .world
                .collectibles
                .iter()
                .find(|c| (c.kind == CollectibleKind::Health) == health)
                .map(|c| c.id)
        };
        let (health, crystal) = (id_of(&session, true), id_of(&session, false));

        tick(&mut session, &TickInput::default(), FRAME_DT);
        // Crystal under the ship was collected and its expiry cancelled
        assert_eq!(session.economy.balance, 5);
        assert_eq!(session.world.collectibles.len(), 1);
        let expiry = crystal.map(|id| ScheduledAction::ExpireCollectible { id });
        assert_eq!(session.scheduler.cancel_where(|a| Some(a) == expiry.as_ref()), 0);

        run(&mut session, 10.1);
        assert!(session.world.collectibles.iter().all(|c| Some(c.id) != health));
    }

    #[test]
    fn test_boss_fight_to_victory() {
        let config = GameConfig {
            campaign: vec![SectionDef {
                id: "boss".into(),
                name: "Final Guardian".into(),
                screens: vec![ScreenDef::Boss],
            }],
            ..GameConfig::default()
        };
        let (mut session, recorder) = session_with(config);
        session.start();
        session.world.player.invulnerable = f32::MAX;
        assert!(session.is_boss_fight());
        assert!(session.world.boss.is_none());

        run(&mut session, 2.1);
        let boss_pos = session.world.boss.as_ref().map(|b| b.pos);
        assert_eq!(boss_pos, Some(Vec2::new(640.0, 200.0)));

        // A summoned spawner dying mid-fight must not clear the screen
        session.world.spawn_spawner(
            Vec2::new(300.0, 300.0),
            crate::sim::spawner::Difficulty::Easy,
            SpawnerOwner::Boss,
            Some(100),
            &session.config,
        );
        destroy_spawners(&mut session);
        tick(&mut session, &TickInput::default(), FRAME_DT);
        assert_eq!(seen(&recorder, EventKind::ScreenCompleted), 0);
        assert_eq!(session.phase(), SessionPhase::Playing);

        collision::damage_boss(&mut session.world, 5000, &mut session.bus, &session.config);
        tick(&mut session, &TickInput::default(), FRAME_DT);
        assert_eq!(seen(&recorder, EventKind::BossDefeated), 1);
        assert!(session.score() >= 5000);

        run(&mut session, 2.1);
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.conquered_sections(), vec!["boss"]);
        assert_eq!(session.summary().outcome, RunOutcome::Victory);
    }

    #[test]
    fn test_boss_death_destroys_summons() {
        let config = GameConfig {
            campaign: vec![SectionDef {
                id: "boss".into(),
                name: "Final Guardian".into(),
                screens: vec![ScreenDef::Boss],
            }],
            ..GameConfig::default()
        };
        let (mut session, recorder) = session_with(config);
        session.start();
        session.world.player.invulnerable = f32::MAX;
        run(&mut session, 2.1);

        let id = session.world.spawn_spawner(
            Vec2::new(300.0, 300.0),
            crate::sim::spawner::Difficulty::Easy,
            SpawnerOwner::Boss,
            Some(100),
            &session.config,
        );
        if let Some(boss) = session.world.boss.as_mut() {
            boss.summons.push(id);
        }
        collision::damage_boss(&mut session.world, 5000, &mut session.bus, &session.config);
        tick(&mut session, &TickInput::default(), FRAME_DT);

        assert_eq!(seen(&recorder, EventKind::SpawnerDestroyed), 1);
        assert_eq!(session.world.active_spawner_count(), 0);
        assert!(session.world.boss.as_ref().is_some_and(|b| b.summons.is_empty()));
    }
}
