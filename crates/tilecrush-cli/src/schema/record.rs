use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilecrush_engine::{Board, ColorSeed, EffectEvent, EngineConfig, Pos, SessionStats, SwapOutcome};

/// Auto-played session, recorded for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Seed used for piece colors and swap choices
    pub seed: ColorSeed,
    pub config: EngineConfig,
    pub initial_board: Board,
    pub final_board: Board,
    pub final_score: u64,
    pub final_stats: SessionStats,
    /// Swaps in play order, each with its full cascade
    pub swaps: Vec<SwapRecord>,
}

/// One player swap and everything it set off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Turn number (0-indexed)
    pub turn: usize,
    pub from: Pos,
    pub to: Pos,
    pub outcome: SwapOutcome,
    pub score_delta: u64,
    pub events: Vec<EffectEvent>,
}

/// Result of the `swap` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReport {
    pub seed: ColorSeed,
    pub outcome: SwapOutcome,
    pub events: Vec<EffectEvent>,
    pub score: u64,
    pub board: Board,
}
