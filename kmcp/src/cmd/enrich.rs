use std::{collections::HashSet, path::PathBuf};

use clap::{Parser, ValueEnum};
use libkmcp::{
    enrichment::{self, CorrectionMethod},
    io::{catalog_io, ko_list},
    ko::Ko,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    Bh,
    By,
}

impl From<Method> for CorrectionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Bh => CorrectionMethod::BenjaminiHochberg,
            Method::By => CorrectionMethod::BenjaminiYekutieli,
        }
    }
}

#[derive(Parser, Debug)]
pub struct EnrichCmd {
    /// Query KO list (one KO per line).
    #[clap(long)]
    kos: PathBuf,

    /// Compiled module catalog, as produced by `build-catalog`.
    #[clap(long)]
    database: PathBuf,

    /// Enrichment results TSV to write.
    #[clap(long)]
    output: PathBuf,

    /// Background KO universe; defaults to the union of every catalog
    /// module's indexed KOs and the query KOs.
    #[clap(long)]
    background: Option<PathBuf>,

    /// Multiple-testing correction method.
    #[clap(long, value_enum, default_value = "bh")]
    method: Method,

    /// Significance threshold applied to the corrected p-values.
    #[clap(long)]
    alpha: Option<f64>,
}

impl EnrichCmd {
    pub fn run(self) -> eyre::Result<()> {
        let (catalog, failures) = catalog_io::load_catalog(&self.database)?;
        for (module_id, err) in &failures {
            log::warn!("dropping unreadable module {module_id}: {err}");
        }

        let query_kos = read_ko_set(&self.kos)?;
        let background = self.background.as_ref().map(read_ko_set).transpose()?;

        let method_name = match self.method {
            Method::Bh => "bh",
            Method::By => "by",
        };
        let rows = enrichment::enrich(
            &catalog,
            &query_kos,
            background.as_ref(),
            self.method.into(),
            self.alpha,
        )?;

        write_rows(&self.output, method_name, &rows)?;
        log::info!("wrote {} rows to {}", rows.len(), self.output.display());
        Ok(())
    }
}

fn read_ko_set(path: &PathBuf) -> eyre::Result<HashSet<Ko>> {
    match ko_list::read_ko_list(path)? {
        ko_list::KoListInput::SingleGenome(kos) => Ok(kos),
        ko_list::KoListInput::MultiGenome(_) => {
            eyre::bail!("expected a single-column KO list, got a genome_id/ko table")
        }
    }
}

fn write_rows(path: &PathBuf, method_name: &str, rows: &[enrichment::EnrichmentRow]) -> eyre::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(file);
    wtr.write_record([
        "module_id",
        "method",
        "M",
        "n",
        "N",
        "k",
        "intersecting_features",
        "extra_features",
        "p_value",
        "fdr",
        "significant",
    ])?;
    for row in rows {
        wtr.write_record([
            row.module_id.clone(),
            method_name.to_string(),
            row.background_size.to_string(),
            row.pathway_size.to_string(),
            row.query_size.to_string(),
            row.intersection_size.to_string(),
            format_kos(&row.intersecting_features),
            format_kos(&row.extra_features),
            row.p_value.to_string(),
            row.fdr.to_string(),
            row.significant.map(|b| b.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_kos(kos: &[Ko]) -> String {
    kos.iter().map(Ko::as_str).collect::<Vec<_>>().join(",")
}
