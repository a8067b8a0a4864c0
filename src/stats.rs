//! Run statistics
//!
//! Counters gathered during one session and the serializable summary produced
//! when the run ends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::enemy::EnemyKind;

/// Where the player died
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathLocation {
    pub section: String,
    pub screen: usize,
}

/// Counters for a single run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub kills_by_kind: BTreeMap<EnemyKind, u32>,
    pub spawners_destroyed: u32,
    pub bullets_fired: u32,
    pub bullets_hit: u32,
    pub missiles_fired: u32,
    pub missiles_hit: u32,
    pub crystals_collected: u32,
    pub sections_completed: Vec<String>,
    pub upgrades_purchased: u32,
    pub death: Option<DeathLocation>,
    /// Seconds spent in the Playing phase
    pub play_time: f32,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_kill(&mut self, kind: EnemyKind) {
        *self.kills_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn total_kills(&self) -> u32 {
        self.kills_by_kind.values().sum()
    }

    /// Hits per projectile fired (bullets and missiles together)
    pub fn accuracy(&self) -> f32 {
        let fired = self.bullets_fired + self.missiles_fired;
        if fired == 0 {
            return 0.0;
        }
        (self.bullets_hit + self.missiles_hit) as f32 / fired as f32
    }

    pub fn summarize(&self, outcome: RunOutcome, score: u64, seed: u64) -> RunSummary {
        RunSummary {
            outcome,
            seed,
            score,
            kills: self.total_kills(),
            accuracy: self.accuracy(),
            stats: self.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Victory,
    Defeat,
    /// Still running (or never started) when summarized
    Unfinished,
}

/// End-of-run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub seed: u64,
    pub score: u64,
    pub kills: u32,
    pub accuracy: f32,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kills_by_kind() {
        let mut stats = RunStats::new();
        stats.record_kill(EnemyKind::Scout);
        stats.record_kill(EnemyKind::Scout);
        stats.record_kill(EnemyKind::Tank);
        assert_eq!(stats.kills_by_kind.get(&EnemyKind::Scout), Some(&2));
        assert_eq!(stats.total_kills(), 3);
    }

    #[test]
    fn test_accuracy() {
        let mut stats = RunStats::new();
        assert_eq!(stats.accuracy(), 0.0);
        stats.bullets_fired = 8;
        stats.bullets_hit = 3;
        stats.missiles_fired = 2;
        stats.missiles_hit = 2;
        assert!((stats.accuracy() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_summary_json() {
        let mut stats = RunStats::new();
        stats.record_kill(EnemyKind::Swarm);
        let summary = stats.summarize(RunOutcome::Victory, 1234, 7);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcome"], "victory");
        assert_eq!(json["score"], 1234);
        assert_eq!(json["kills"], 1);
    }
}
