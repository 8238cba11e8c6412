mod cmd;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use eyre::Result;
use human_panic::setup_panic;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Coverage profiling of KEGG metabolic pathway modules against observed KO sets.
struct Args {
    #[clap(flatten)]
    verbose: Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a compiled module catalog from definition/name/class tables.
    BuildCatalog(cmd::build_catalog::BuildCatalogCmd),

    /// Profile coverage of one or more genomes' KO sets against a catalog.
    ProfileCoverage(cmd::profile_coverage::ProfileCoverageCmd),

    /// Hypergeometric enrichment test of a query KO set against a catalog.
    Enrich(cmd::enrich::EnrichCmd),
}

fn main() -> Result<()> {
    setup_panic!();
    jane_eyre::install()?;

    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Commands::BuildCatalog(cmd) => cmd.run()?,
        Commands::ProfileCoverage(cmd) => cmd.run()?,
        Commands::Enrich(cmd) => cmd.run()?,
    }
    Ok(())
}
