use std::path::PathBuf;

use chrono::Utc;
use rand::{SeedableRng as _, rngs::StdRng, seq::IndexedRandom as _};
use tilecrush_engine::{ColorSeed, EngineConfig, ResolverSession};
use tracing::info;

use crate::{
    schema::record::{SimulationRecord, SwapRecord},
    util::Output,
};

use super::ConfigArg;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Maximum number of swaps to play
    #[arg(long, default_value_t = 50)]
    swaps: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Swap picker seeded from the color seed, so a record replays exactly.
fn picker_rng(seed: ColorSeed) -> StdRng {
    let mut bytes = [0; 32];
    bytes[..16].copy_from_slice(&seed.to_u128().to_be_bytes());
    StdRng::from_seed(bytes)
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let (config, seed) = arg.config.load()?;
    let record = play(config, seed, arg.swaps)?;
    Output::save_json(&record, arg.output.clone())
}

/// Auto-plays up to `max_swaps` random valid swaps.
fn play(
    config: EngineConfig,
    seed: ColorSeed,
    max_swaps: usize,
) -> anyhow::Result<SimulationRecord> {
    let mut session = ResolverSession::new(config.clone())?;
    let initial_board = session.board().clone();
    let mut rng = picker_rng(seed);

    let mut swaps = Vec::with_capacity(max_swaps);
    for turn in 0..max_swaps {
        let candidates = session.valid_swaps();
        let Some(&(from, to)) = candidates.choose(&mut rng) else {
            info!(turn, "no valid swaps left");
            break;
        };
        let score_before = session.score().total();
        let outcome = session.try_swap(from, to)?;
        let events = session.run_until_stable();
        swaps.push(SwapRecord {
            turn,
            from,
            to,
            outcome,
            score_delta: session.score().total() - score_before,
            events,
        });
    }

    info!(
        swaps = swaps.len(),
        score = session.score().total(),
        longest_chain = session.stats().longest_chain(),
        "simulation finished"
    );

    Ok(SimulationRecord {
        recorded_at: Utc::now(),
        seed,
        config,
        initial_board,
        final_board: session.board().clone(),
        final_score: session.score().total(),
        final_stats: session.stats().clone(),
        swaps,
    })
}
