//! Hypergeometric enrichment test (spec §4.6): scores over-representation of
//! a query KO set in each module's most-complete-path KO set, with FDR
//! correction across modules. `statrs` is already a teacher dependency;
//! `adjustp` is grounded on `Georgakopoulos-Soares-lab-TaxaGO`, which uses it
//! for exactly this multiple-testing-correction step.

use std::collections::{HashMap, HashSet};

use adjustp::{adjust, Procedure};
use statrs::distribution::{DiscreteCDF, Hypergeometric};

use crate::{catalog::Catalog, error::EnrichmentError, evaluator, ko::Ko};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionMethod {
    BenjaminiHochberg,
    BenjaminiYekutieli,
}

impl From<CorrectionMethod> for Procedure {
    fn from(method: CorrectionMethod) -> Self {
        match method {
            CorrectionMethod::BenjaminiHochberg => Procedure::BenjaminiHochberg,
            CorrectionMethod::BenjaminiYekutieli => Procedure::BenjaminiYekutieli,
        }
    }
}

/// One row of the enrichment output table (spec §4.6's column list).
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRow {
    pub module_id: String,
    pub background_size: usize,
    pub pathway_size: usize,
    pub query_size: usize,
    pub intersection_size: usize,
    pub intersecting_features: Vec<Ko>,
    pub extra_features: Vec<Ko>,
    pub p_value: f64,
    pub fdr: f64,
    pub significant: Option<bool>,
}

/// Tests over-representation of `query_kos` against every module in
/// `catalog`. `background` defaults to the union of every module's indexed
/// KOs and the query KOs (spec §4.6, §9); an explicit background must be a
/// superset of `query_kos` or `BackgroundMismatch` is raised.
pub fn enrich(
    catalog: &Catalog,
    query_kos: &HashSet<Ko>,
    background: Option<&HashSet<Ko>>,
    method: CorrectionMethod,
    alpha: Option<f64>,
) -> Result<Vec<EnrichmentRow>, EnrichmentError> {
    let owned_background;
    let background: &HashSet<Ko> = match background {
        Some(bg) => bg,
        None => {
            let mut universe = catalog.all_indexed_kos();
            universe.extend(query_kos.iter().cloned());
            owned_background = universe;
            &owned_background
        }
    };

    let missing: Vec<String> = query_kos
        .iter()
        .filter(|ko| !background.contains(*ko))
        .map(|ko| ko.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EnrichmentError::BackgroundMismatch { missing });
    }

    let population = background.len() as u64;
    let draws = query_kos.len() as u64;

    let mut module_ids: Vec<&String> = catalog.entries.keys().collect();
    module_ids.sort();

    let mut rows = Vec::with_capacity(module_ids.len());
    let mut p_values = Vec::with_capacity(module_ids.len());

    for module_id in &module_ids {
        let entry = &catalog.entries[*module_id];
        let result = evaluator::evaluate(entry, query_kos);
        let pathway_kos: HashSet<Ko> = result.most_complete_path.iter().cloned().collect();
        // Restrict the path's KOs to the enrichment universe before sizing
        // the hypergeometric draw, so `successes <= population` always holds
        // even when an explicit `--background` doesn't cover this module's
        // most-complete path.
        let pathway_kos: HashSet<Ko> = pathway_kos.intersection(background).cloned().collect();

        let successes = pathway_kos.len() as u64;
        let intersecting: Vec<Ko> = pathway_kos.intersection(query_kos).cloned().collect();
        let k = intersecting.len() as u64;

        let p_value = if k == 0 {
            1.0
        } else if successes == 0 || draws == 0 {
            1.0
        } else {
            match Hypergeometric::new(population, successes, draws) {
                // P(X >= k) = 1 - P(X <= k-1); k > 0 here so no underflow.
                Some(dist) => 1.0 - dist.cdf(k - 1),
                None => 1.0,
            }
        };

        let mut extra: Vec<Ko> = pathway_kos.difference(query_kos).cloned().collect();
        extra.sort();
        let mut intersecting_sorted = intersecting.clone();
        intersecting_sorted.sort();

        p_values.push(p_value);
        rows.push(EnrichmentRow {
            module_id: (*module_id).clone(),
            background_size: population as usize,
            pathway_size: successes as usize,
            query_size: draws as usize,
            intersection_size: intersecting.len(),
            intersecting_features: intersecting_sorted,
            extra_features: extra,
            p_value,
            fdr: 0.0,
            significant: None,
        });
    }

    let fdr_values = adjust(&p_values, method.into());
    for (row, fdr) in rows.iter_mut().zip(fdr_values) {
        row.fdr = fdr;
        row.significant = alpha.map(|a| fdr <= a);
    }

    Ok(rows)
}

/// Convenience accessor used by the CLI to echo module names alongside ids.
pub fn module_names(catalog: &Catalog) -> HashMap<String, String> {
    catalog
        .entries
        .values()
        .map(|e| (e.id.clone(), e.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn catalog_with(entries: &[(&str, &str)]) -> Catalog {
        let mut catalog = Catalog::new();
        for (id, definition) in entries {
            let entry =
                CatalogEntry::compile(id.to_string(), id.to_string(), vec![], definition.to_string())
                    .unwrap();
            catalog.entries.insert(entry.id.clone(), entry);
        }
        catalog
    }

    fn kos(xs: &[&str]) -> HashSet<Ko> {
        xs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn p10_p_values_are_bounded_and_fdr_monotone() {
        let catalog = catalog_with(&[
            ("M00001", "K00001 K00002"),
            ("M00002", "K00003 K00004"),
        ]);
        let query = kos(&["K00001", "K00002"]);
        let rows = enrich(&catalog, &query, None, CorrectionMethod::BenjaminiHochberg, None).unwrap();

        for row in &rows {
            assert!(row.p_value >= 0.0 && row.p_value <= 1.0);
            assert!(row.fdr >= 0.0 && row.fdr <= 1.0);
        }

        let mut sorted = rows.clone();
        sorted.sort_by(|a, b| a.p_value.partial_cmp(&b.p_value).unwrap());
        for window in sorted.windows(2) {
            assert!(window[0].fdr <= window[1].fdr + 1e-9);
        }
    }

    #[test]
    fn s6_enriched_module_scores_lower_p_value_than_unrelated_one() {
        let catalog = catalog_with(&[
            ("M00001", "K00001 K00002"),
            ("M99999", "K09000 K09001"),
        ]);
        let query = kos(&["K00001", "K00002"]);
        let rows = enrich(&catalog, &query, None, CorrectionMethod::BenjaminiHochberg, None).unwrap();

        let enriched = rows.iter().find(|r| r.module_id == "M00001").unwrap();
        let unrelated = rows.iter().find(|r| r.module_id == "M99999").unwrap();
        assert!(enriched.p_value < unrelated.p_value);
    }

    #[test]
    fn background_mismatch_when_query_escapes_explicit_background() {
        let catalog = catalog_with(&[("M00001", "K00001 K00002")]);
        let query = kos(&["K00001", "K00099"]);
        let background = kos(&["K00001", "K00002"]);
        let err = enrich(
            &catalog,
            &query,
            Some(&background),
            CorrectionMethod::BenjaminiHochberg,
            None,
        )
        .unwrap_err();
        match err {
            EnrichmentError::BackgroundMismatch { missing } => {
                assert_eq!(missing, vec!["K00099".to_string()])
            }
        }
    }
}
