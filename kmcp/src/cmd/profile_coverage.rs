use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use libkmcp::{
    batch::{self, BatchOptions},
    io::{catalog_io, ko_list, tables},
};

#[derive(Parser, Debug)]
pub struct ProfileCoverageCmd {
    /// KO list input: one KO per line, or a `genome_id`, `ko` table.
    #[clap(long)]
    kos: PathBuf,

    /// Genome name to use when `--kos` is a single-column KO list.
    #[clap(long, default_value = "genome")]
    name: String,

    /// Directory to write `coverage.tsv.gz` and `step_coverage.tsv.gz` into.
    #[clap(long)]
    output_dir: PathBuf,

    /// Compiled module catalog, as produced by `build-catalog`.
    #[clap(long)]
    database: PathBuf,

    /// Row index column name in the output tables.
    #[clap(long, default_value = "id_genome")]
    index_name: String,

    /// Number of worker threads; defaults to rayon's global pool sizing.
    #[clap(short = 'j', long)]
    n_jobs: Option<usize>,

    /// Show a progress spinner while genomes are evaluated.
    #[clap(long)]
    progress: bool,
}

impl ProfileCoverageCmd {
    pub fn run(self) -> eyre::Result<()> {
        let (catalog, failures) = catalog_io::load_catalog(&self.database)?;
        for (module_id, err) in &failures {
            log::warn!("dropping unreadable module {module_id}: {err}");
        }
        log::info!("loaded {} modules from {}", catalog.len(), self.database.display());

        let genomes = ko_list::read_ko_list(&self.kos)?.into_genomes(&self.name);
        log::info!("profiling {} genome(s)", genomes.len());

        let spinner = self.progress.then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}").unwrap());
            bar.set_message("evaluating coverage");
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar
        });

        let options = BatchOptions {
            n_jobs: self.n_jobs,
            ..BatchOptions::default()
        };
        let report = batch::run_batch(&catalog, &genomes, options);

        if let Some(bar) = spinner {
            bar.finish_with_message("done");
        }

        std::fs::create_dir_all(&self.output_dir)?;
        tables::write_coverage_table(
            self.output_dir.join("coverage.tsv.gz"),
            &self.index_name,
            &report.module_ids,
            &report.coverage,
        )?;
        tables::write_step_coverage_table(
            self.output_dir.join("step_coverage.tsv.gz"),
            &self.index_name,
            &report.module_ids,
            &report.step_counts,
            &report.step_coverage,
        )?;

        Ok(())
    }
}
