use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use libkmcp::{
    catalog,
    io::{catalog_io, tsv},
    remote::{KeggRestSource, KeggSource},
};

#[derive(Parser, Debug)]
pub struct BuildCatalogCmd {
    /// Headerless TSV of `module_id`, `definition_string`.
    #[clap(long)]
    definitions: Option<PathBuf>,

    /// Headerless TSV of `module_id`, `name`.
    #[clap(long)]
    names: Option<PathBuf>,

    /// Headerless TSV of `module_id`, `class_string` (one row per class).
    #[clap(long)]
    classes: Option<PathBuf>,

    /// Path to the compiled catalog container to write.
    #[clap(long)]
    output: PathBuf,

    /// Fetch module records from the remote KEGG REST endpoint instead of
    /// reading `--definitions`/`--names`/`--classes`.
    #[clap(long)]
    download: bool,

    /// Directory to write the intermediate definitions/names/classes TSVs
    /// fetched with `--download`. Defaults to the output file's directory.
    #[clap(long)]
    intermediate_dir: Option<PathBuf>,

    /// Skip writing the intermediate TSVs when `--download` is used.
    #[clap(long)]
    no_intermediate_files: bool,

    /// Database version tag recorded alongside the catalog.
    #[clap(long)]
    version_tag: Option<String>,

    /// Continue (and still write the catalog) even if some modules failed
    /// to parse.
    #[clap(long)]
    force: bool,
}

impl BuildCatalogCmd {
    pub fn run(self) -> eyre::Result<()> {
        let (definitions, names, classes) = if self.download {
            self.download_tables()?
        } else {
            let definitions_path = self
                .definitions
                .ok_or_else(|| eyre::eyre!("--definitions is required unless --download is given"))?;
            let names_path = self
                .names
                .ok_or_else(|| eyre::eyre!("--names is required unless --download is given"))?;
            let classes_path = self
                .classes
                .ok_or_else(|| eyre::eyre!("--classes is required unless --download is given"))?;
            (
                tsv::read_two_column_map(definitions_path)?,
                tsv::read_two_column_map(names_path)?,
                tsv::read_two_column_map(classes_path)?,
            )
        };

        let (catalog, failures) =
            catalog::build_from_tables(&definitions, &names, &classes, self.version_tag.clone());

        for (module_id, err) in &failures {
            log::warn!("skipping module {module_id}: {err}");
        }
        if !failures.is_empty() && !self.force {
            eyre::bail!(
                "{} module(s) failed to parse; rerun with --force to build anyway",
                failures.len()
            );
        }

        catalog_io::save_catalog(&catalog, &self.output)?;
        log::info!("wrote {} modules to {}", catalog.len(), self.output.display());

        let version_path = format!("{}.version", self.output.display());
        fs::write(version_path, self.version_tag.unwrap_or_else(|| "unknown".to_string()))?;

        Ok(())
    }

    fn download_tables(
        &self,
    ) -> eyre::Result<(Vec<(String, String)>, Vec<(String, String)>, Vec<(String, String)>)> {
        let source = KeggRestSource::default();
        let module_ids = source.list_modules()?;

        let mut definitions = Vec::with_capacity(module_ids.len());
        let mut names = Vec::with_capacity(module_ids.len());
        let mut classes = Vec::new();

        for module_id in &module_ids {
            let record = source.fetch_module(module_id)?;
            definitions.push((record.id.clone(), record.definition));
            names.push((record.id.clone(), record.name));
            for class in record.classes {
                classes.push((record.id.clone(), class));
            }
        }

        if !self.no_intermediate_files {
            let dir = self
                .intermediate_dir
                .clone()
                .or_else(|| self.output.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)?;
            write_two_column(&dir.join("definitions.tsv"), &definitions)?;
            write_two_column(&dir.join("names.tsv"), &names)?;
            write_two_column(&dir.join("classes.tsv"), &classes)?;
        }

        Ok((definitions, names, classes))
    }
}

fn write_two_column(path: &Path, rows: &[(String, String)]) -> eyre::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)?;
    for (a, b) in rows {
        wtr.write_record([a, b])?;
    }
    wtr.flush()?;
    Ok(())
}
