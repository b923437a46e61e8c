use tilecrush_engine::ResolverSession;
use tracing::info;

use super::ConfigArg;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    #[clap(flatten)]
    config: ConfigArg,
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let (config, seed) = arg.config.load()?;
    let session = ResolverSession::new(config)?;
    info!(%seed, "generated board");
    println!("{}", session.board());
    Ok(())
}
