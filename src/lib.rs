//! KEGG metabolic pathway module coverage profiler.
//!
//! Compiles KEGG module definitions into weighted DAG multigraphs, scores
//! observed KO sets against them, and aggregates coverage across genomes and
//! a hypergeometric enrichment test over the resulting best-path KO sets.

pub mod batch;
pub mod catalog;
pub mod definition;
pub mod enrichment;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod io;
pub mod ko;
pub mod remote;

pub use catalog::{Catalog, CatalogEntry};
pub use error::{DefinitionError, EnrichmentError, EvalError, GraphError};
pub use evaluator::EvaluationResult;
pub use ko::Ko;
