//! Typed event bus
//!
//! Entities and systems publish `GameEvent`s into a FIFO queue; the session
//! drains it once per tick, reacting to each event (which may publish more)
//! and forwarding every event to the registered listeners. Listeners see
//! events by shared reference and have no handle on the simulation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collectible::CollectibleKind;
use super::enemy::EnemyKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A spawner wants an enemy of `kind` at `pos`
    EnemySpawnRequest { spawner: u32, pos: Vec2, kind: EnemyKind },
    /// An enemy or the boss fired a bullet
    EnemyFired { pos: Vec2, angle: f32, speed: f32, damage: i32 },
    EnemyDied {
        enemy: u32,
        kind: EnemyKind,
        pos: Vec2,
        points: u32,
        crystals: u32,
    },
    SpawnerDestroyed { spawner: u32, pos: Vec2, boss_owned: bool },
    CollectibleSpawnRequest { pos: Vec2, kind: CollectibleKind },
    MissileDetonated { pos: Vec2, radius: f32, damage: i32 },
    PlayerDied { pos: Vec2 },
    BossDefeated { pos: Vec2 },
    ShieldBlocked { pos: Vec2 },
    BossPhaseChanged { phase: u8 },
    PlayerDamaged { amount: i32, hp: i32 },
    CollectibleCollected { id: u32, kind: CollectibleKind, value: u32 },
    ScreenCompleted { section: usize, screen: usize },
    SectionCompleted { section: String },
}

/// Payload-free discriminant of `GameEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    EnemySpawnRequest,
    EnemyFired,
    EnemyDied,
    SpawnerDestroyed,
    CollectibleSpawnRequest,
    MissileDetonated,
    PlayerDied,
    BossDefeated,
    ShieldBlocked,
    BossPhaseChanged,
    PlayerDamaged,
    CollectibleCollected,
    ScreenCompleted,
    SectionCompleted,
}

impl EventKind {
    /// Stable wire name
    pub fn name(self) -> &'static str {
        match self {
            EventKind::EnemySpawnRequest => "enemy-spawn-request",
            EventKind::EnemyFired => "enemy-fired",
            EventKind::EnemyDied => "enemy-died",
            EventKind::SpawnerDestroyed => "spawner-destroyed",
            EventKind::CollectibleSpawnRequest => "collectible-spawn-request",
            EventKind::MissileDetonated => "missile-detonated",
            EventKind::PlayerDied => "player-died",
            EventKind::BossDefeated => "boss-defeated",
            EventKind::ShieldBlocked => "shield-blocked",
            EventKind::BossPhaseChanged => "boss-phase-changed",
            EventKind::PlayerDamaged => "player-damaged",
            EventKind::CollectibleCollected => "collectible-collected",
            EventKind::ScreenCompleted => "screen-completed",
            EventKind::SectionCompleted => "section-completed",
        }
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::EnemySpawnRequest { .. } => EventKind::EnemySpawnRequest,
            GameEvent::EnemyFired { .. } => EventKind::EnemyFired,
            GameEvent::EnemyDied { .. } => EventKind::EnemyDied,
            GameEvent::SpawnerDestroyed { .. } => EventKind::SpawnerDestroyed,
            GameEvent::CollectibleSpawnRequest { .. } => EventKind::CollectibleSpawnRequest,
            GameEvent::MissileDetonated { .. } => EventKind::MissileDetonated,
            GameEvent::PlayerDied { .. } => EventKind::PlayerDied,
            GameEvent::BossDefeated { .. } => EventKind::BossDefeated,
            GameEvent::ShieldBlocked { .. } => EventKind::ShieldBlocked,
            GameEvent::BossPhaseChanged { .. } => EventKind::BossPhaseChanged,
            GameEvent::PlayerDamaged { .. } => EventKind::PlayerDamaged,
            GameEvent::CollectibleCollected { .. } => EventKind::CollectibleCollected,
            GameEvent::ScreenCompleted { .. } => EventKind::ScreenCompleted,
            GameEvent::SectionCompleted { .. } => EventKind::SectionCompleted,
        }
    }
}

/// Read-only subscriber (HUD, audio, achievements)
pub trait EventListener {
    fn on_event(&mut self, event: &GameEvent);
}

impl<L: EventListener> EventListener for Rc<RefCell<L>> {
    fn on_event(&mut self, event: &GameEvent) {
        self.borrow_mut().on_event(event);
    }
}

/// Event queue plus subscriber list
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Pop the oldest event and show it to every listener
    pub fn pop(&mut self) -> Option<GameEvent> {
        let event = self.queue.pop_front()?;
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        Some(event)
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Remove every listener
    pub fn unsubscribe_all(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<EventKind>,
    }

    impl EventListener for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.seen.push(event.kind());
        }
    }

    #[test]
    fn test_fifo_delivery() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(recorder.clone()));

        bus.publish(GameEvent::BossPhaseChanged { phase: 2 });
        bus.publish(GameEvent::PlayerDied { pos: Vec2::ZERO });
        assert_eq!(bus.len(), 2);

        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::BossPhaseChanged));
        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::PlayerDied));
        assert!(bus.pop().is_none());

        assert_eq!(
            recorder.borrow().seen,
            vec![EventKind::BossPhaseChanged, EventKind::PlayerDied]
        );
    }

    #[test]
    fn test_clear_skips_listeners() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(recorder.clone()));
        bus.publish(GameEvent::ShieldBlocked { pos: Vec2::ZERO });
        bus.clear();
        assert!(bus.pop().is_none());
        assert!(recorder.borrow().seen.is_empty());
    }

    #[test]
    fn test_names_are_kebab_case() {
        assert_eq!(EventKind::SpawnerDestroyed.name(), "spawner-destroyed");
        assert_eq!(EventKind::CollectibleSpawnRequest.name(), "collectible-spawn-request");
        assert_eq!(
            GameEvent::SectionCompleted { section: "about".into() }.kind().name(),
            "section-completed"
        );
    }
}
