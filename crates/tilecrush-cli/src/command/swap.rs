use std::path::PathBuf;

use rand::Rng as _;
use tilecrush_engine::{ColorSeed, EngineConfig, Pos, ResolverSession, SeededColors};

use crate::{
    schema::record::SwapReport,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SwapArg {
    /// Board text file, one row per line
    #[arg(long)]
    board: PathBuf,
    /// Cell of the dragged piece, as `row,col`
    #[arg(long)]
    from: Pos,
    /// Cell it is dropped on, as `row,col`
    #[arg(long)]
    to: Pos,
    /// Number of colors used for refilled pieces
    #[arg(long, default_value_t = EngineConfig::DEFAULT_COLOR_COUNT)]
    colors: u8,
    /// Color seed as 32 hex digits
    #[arg(long)]
    seed: Option<ColorSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SwapArg) -> anyhow::Result<()> {
    let board = util::read_board_file(&arg.board)?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let config = EngineConfig {
        rows: board.rows(),
        cols: board.cols(),
        color_count: arg.colors,
        seed: Some(seed),
    };
    let mut session = ResolverSession::from_board(config, board, SeededColors::with_seed(seed))?;

    let outcome = session.try_swap(arg.from, arg.to)?;
    let events = session.run_until_stable();
    let report = SwapReport {
        seed,
        outcome,
        events,
        score: session.score().total(),
        board: session.board().clone(),
    };
    Output::save_json(&report, arg.output.clone())
}
