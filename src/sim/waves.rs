//! Wave and section progression
//!
//! The campaign is an ordered list of sections, each an ordered list of
//! screens. `WaveController` tracks the current screen and its lifecycle as
//! an explicit state machine; every transition is a guarded method that
//! returns whether it fired, so callers on several paths (event-driven and
//! polling) can share one code path without double-firing.

use serde::{Deserialize, Serialize};

use super::spawner::Difficulty;

/// One screen of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenDef {
    Wave { difficulty: Difficulty, spawners: u32 },
    Boss,
}

impl ScreenDef {
    pub fn is_boss(&self) -> bool {
        matches!(self, ScreenDef::Boss)
    }
}

/// A named group of screens ending in an upgrade checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDef {
    pub id: String,
    pub name: String,
    pub screens: Vec<ScreenDef>,
}

impl SectionDef {
    fn new(id: &str, name: &str, screens: Vec<ScreenDef>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            screens,
        }
    }
}

fn wave(difficulty: Difficulty, spawners: u32) -> ScreenDef {
    ScreenDef::Wave { difficulty, spawners }
}

/// Shipped campaign: three wave sections and a boss finale
pub fn default_campaign() -> Vec<SectionDef> {
    use Difficulty::*;
    vec![
        SectionDef::new("about", "About", vec![wave(Easy, 2)]),
        SectionDef::new("experience", "Experience", vec![wave(Medium, 2), wave(Medium, 3)]),
        SectionDef::new(
            "portfolio",
            "Portfolio",
            vec![wave(Medium, 3), wave(Hard, 3), wave(Hard, 4)],
        ),
        SectionDef::new("boss", "Final Guardian", vec![ScreenDef::Boss]),
    ]
}

/// Lifecycle of the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenState {
    /// Waiting for the screen to be entered
    Pending,
    /// Spawners placed, fighting
    Active,
    /// All spawners down, grace period running
    Cleared,
    /// Boss screen entered, warning delay running
    BossWarning,
    BossFight,
    /// Boss down, victory grace running
    BossDefeated,
    /// Section exhausted, waiting for the player to proceed
    Checkpoint,
    /// Campaign over
    Finished,
}

/// What happened when a cleared screen's grace period ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Another screen of the same section is pending
    NextScreen,
    /// The section is complete
    SectionComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveController {
    sections: Vec<SectionDef>,
    section: usize,
    screen: usize,
    state: ScreenState,
}

impl WaveController {
    pub fn new(sections: Vec<SectionDef>) -> Self {
        let state = if sections.is_empty() {
            ScreenState::Finished
        } else {
            ScreenState::Pending
        };
        Self {
            sections,
            section: 0,
            screen: 0,
            state,
        }
    }

    /// Rewind to the first screen of the first section
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.sections));
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn section_index(&self) -> usize {
        self.section
    }

    pub fn screen_index(&self) -> usize {
        self.screen
    }

    pub fn sections(&self) -> &[SectionDef] {
        &self.sections
    }

    pub fn current_section(&self) -> Option<&SectionDef> {
        self.sections.get(self.section)
    }

    pub fn current_screen(&self) -> Option<&ScreenDef> {
        self.current_section()?.screens.get(self.screen)
    }

    pub fn is_boss_fight(&self) -> bool {
        matches!(self.state, ScreenState::BossWarning | ScreenState::BossFight)
    }

    pub fn is_last_section(&self) -> bool {
        self.section + 1 >= self.sections.len()
    }

    /// Enter the pending screen. Returns its definition, or None if no screen
    /// is pending.
    pub fn begin_screen(&mut self) -> Option<ScreenDef> {
        if self.state != ScreenState::Pending {
            return None;
        }
        let screen = self.current_screen()?.clone();
        self.state = if screen.is_boss() {
            ScreenState::BossWarning
        } else {
            ScreenState::Active
        };
        log::info!(
            "Entering section {} screen {}{}",
            self.section,
            self.screen,
            if screen.is_boss() { " (boss)" } else { "" }
        );
        Some(screen)
    }

    /// Warning elapsed and the boss is on the field
    pub fn boss_spawned(&mut self) -> bool {
        if self.state != ScreenState::BossWarning {
            return false;
        }
        self.state = ScreenState::BossFight;
        true
    }

    /// Single completion check shared by the spawner-destroyed handler and the
    /// per-tick poll. Fires at most once per screen, never during a boss fight.
    pub fn try_complete_screen(&mut self, active_spawners: usize, boss_active: bool) -> bool {
        if self.state != ScreenState::Active || active_spawners > 0 || boss_active {
            return false;
        }
        self.state = ScreenState::Cleared;
        log::info!("Screen {}/{} cleared", self.section, self.screen);
        true
    }

    /// Boss death; fires once per boss screen
    pub fn boss_defeated(&mut self) -> bool {
        if self.state != ScreenState::BossFight {
            return false;
        }
        self.state = ScreenState::BossDefeated;
        true
    }

    /// Grace period after a cleared screen ended
    pub fn advance(&mut self) -> Option<Advance> {
        if self.state != ScreenState::Cleared {
            return None;
        }
        let len = self.current_section().map_or(0, |s| s.screens.len());
        if self.screen + 1 < len {
            self.screen += 1;
            self.state = ScreenState::Pending;
            Some(Advance::NextScreen)
        } else {
            self.state = ScreenState::Checkpoint;
            Some(Advance::SectionComplete)
        }
    }

    /// Leave a checkpoint. Returns true if another section is pending, false
    /// if the campaign is finished.
    pub fn proceed(&mut self) -> bool {
        if self.state != ScreenState::Checkpoint {
            return false;
        }
        self.section += 1;
        self.screen = 0;
        if self.section >= self.sections.len() {
            self.state = ScreenState::Finished;
            false
        } else {
            self.state = ScreenState::Pending;
            true
        }
    }

    /// Mark the campaign finished (after the boss victory grace)
    pub fn finish(&mut self) {
        self.state = ScreenState::Finished;
    }
}
