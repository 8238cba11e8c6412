//! Coverage / step-coverage table writers (spec §6). Both are TSV, written
//! with `csv::Writer`, gzip-wrapped with `flate2::write::GzEncoder` when the
//! output path ends in `.gz` -- matching the `coverage.tsv.gz` /
//! `step_coverage.tsv.gz` names spec.md §6 gives.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use flate2::{write::GzEncoder, Compression};

const DEFAULT_INDEX_NAME: &str = "id_genome";

fn open_writer<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn Write>> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Box::new(file))
    }
}

/// Writes the dense `coverage` table: rows = genomes, columns = module ids,
/// values = coverage in `[0,1]`, missing modules encoded as `0.0`.
pub fn write_coverage_table<P: AsRef<Path>>(
    path: P,
    index_name: &str,
    module_ids: &[String],
    rows: &BTreeMap<String, BTreeMap<String, f64>>,
) -> anyhow::Result<()> {
    let writer = open_writer(path)?;
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut header = vec![index_name.to_string()];
    header.extend(module_ids.iter().cloned());
    wtr.write_record(&header)?;

    for (genome, coverages) in rows {
        let mut record = vec![genome.clone()];
        for module_id in module_ids {
            let value = coverages.get(module_id).copied().unwrap_or(0.0);
            record.push(format!("{value}"));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One module's per-step coverage bits for one genome, in path order.
pub type StepCoverageRow = BTreeMap<String, Vec<u8>>;

/// Writes the `step_coverage` table: a two-level column header whose upper
/// level is the module id and lower level is the 1-based step index. Modules
/// where a genome produced no path contribute zero columns (nothing to
/// write -- spec.md §4.5 says "all step columns for that module are 0", but
/// a genome with no path for a module has zero steps, so there is nothing
/// to pad; genomes sharing a module compute their column counts from the
/// widest step count observed for that module across all rows).
pub fn write_step_coverage_table<P: AsRef<Path>>(
    path: P,
    index_name: &str,
    module_ids: &[String],
    step_counts: &BTreeMap<String, usize>,
    rows: &BTreeMap<String, StepCoverageRow>,
) -> anyhow::Result<()> {
    let writer = open_writer(path)?;
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut upper = vec![index_name.to_string()];
    let mut lower = vec![String::new()];
    for module_id in module_ids {
        let steps = step_counts.get(module_id).copied().unwrap_or(0);
        for step in 1..=steps.max(1) {
            upper.push(module_id.clone());
            lower.push(step.to_string());
        }
    }
    wtr.write_record(&upper)?;
    wtr.write_record(&lower)?;

    for (genome, genome_steps) in rows {
        let mut record = vec![genome.clone()];
        for module_id in module_ids {
            let steps = step_counts.get(module_id).copied().unwrap_or(0);
            let bits = genome_steps.get(module_id);
            for i in 0..steps.max(1) {
                let bit = bits.and_then(|b| b.get(i)).copied().unwrap_or(0);
                record.push(bit.to_string());
            }
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn default_index_name() -> &'static str {
    DEFAULT_INDEX_NAME
}
