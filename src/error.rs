//! Typed error enums for the library's core components, following the
//! teacher's `region::FilterError` convention of small `thiserror` enums per
//! component rather than one monolithic error type.

use thiserror::Error;

use crate::ko::InvalidKo;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("lexical error at byte offset {offset}: unexpected character {ch:?}")]
    LexError { offset: usize, ch: char },

    #[error("unbalanced parenthesis")]
    UnbalancedParen,

    #[error("unexpected token at position {position}")]
    UnexpectedToken { position: usize },

    #[error("empty group in definition")]
    EmptyGroup,

    #[error("invalid KO atom: {0}")]
    InvalidKo(#[from] InvalidKo),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph invariant violated in module {module_id}: {detail}")]
    GraphInvariantViolated { module_id: String, detail: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown module: {0}")]
    UnknownModule(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("query KOs are not a subset of the background universe: {missing:?}")]
    BackgroundMismatch { missing: Vec<String> },
}
