//! Batch driver (spec §4.5): evaluates many (genome, module) pairs and
//! aggregates coverage / step-coverage tables. Parallelized per genome with
//! `rayon`, following the teacher's own `rayon::ThreadPoolBuilder` use in
//! its training driver; cooperative cancellation is checked at genome
//! boundaries (spec §5).

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use rayon::prelude::*;

use crate::{catalog::Catalog, evaluator, io::tables::StepCoverageRow, ko::Ko};

#[derive(Clone)]
pub struct BatchOptions {
    /// `None` uses rayon's global pool; `Some(n)` builds a dedicated pool
    /// of `n` threads (the CLI's `--n-jobs`).
    pub n_jobs: Option<usize>,
    /// Checked at genome boundaries; genomes observed after this flips MUST
    /// NOT appear in the output (spec §5).
    pub cancel: Arc<AtomicBool>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            n_jobs: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

pub struct BatchReport {
    pub module_ids: Vec<String>,
    pub coverage: BTreeMap<String, BTreeMap<String, f64>>,
    pub step_counts: BTreeMap<String, usize>,
    pub step_coverage: BTreeMap<String, StepCoverageRow>,
}

struct GenomeResult {
    genome_id: String,
    coverage: BTreeMap<String, f64>,
    steps: BTreeMap<String, Vec<u8>>,
}

/// Runs the batch coverage profile across every (genome, module) pair.
/// Results are independent of worker count and scheduling order (spec §5):
/// each genome is evaluated independently against the read-only catalog and
/// aggregation is a deterministic fold over sorted genome ids.
pub fn run_batch(
    catalog: &Catalog,
    genomes: &HashMap<String, HashSet<Ko>>,
    options: BatchOptions,
) -> BatchReport {
    let mut module_ids: Vec<String> = catalog.module_ids().map(str::to_string).collect();
    module_ids.sort();

    let evaluate_all = || -> Vec<GenomeResult> {
        genomes
            .par_iter()
            .filter_map(|(genome_id, kos)| {
                if options.cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let mut coverage = BTreeMap::new();
                let mut steps = BTreeMap::new();
                for module_id in &module_ids {
                    let entry = catalog.get(module_id).expect("module_ids drawn from catalog");
                    let result = evaluator::evaluate(entry, kos);
                    coverage.insert(module_id.clone(), result.coverage);
                    steps.insert(module_id.clone(), result.step_coverage);
                }
                Some(GenomeResult {
                    genome_id: genome_id.clone(),
                    coverage,
                    steps,
                })
            })
            .collect()
    };

    let results = match options.n_jobs {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .expect("valid thread pool size")
            .install(evaluate_all),
        None => evaluate_all(),
    };

    let mut step_counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in &results {
        for (module_id, bits) in &result.steps {
            let entry = step_counts.entry(module_id.clone()).or_insert(0);
            *entry = (*entry).max(bits.len());
        }
    }

    let mut coverage: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut step_coverage: BTreeMap<String, StepCoverageRow> = BTreeMap::new();
    for result in results {
        coverage.insert(result.genome_id.clone(), result.coverage);
        step_coverage.insert(result.genome_id, result.steps);
    }

    BatchReport {
        module_ids,
        coverage,
        step_counts,
        step_coverage,
    }
}
