//! # Query Module
//!
//! Turns structured selection criteria into select query strings.
//!
//! * `types` - selection criteria, projections and extra parameters
//! * `compiler` - the pure compilation step, no I/O

pub mod compiler;
pub mod types;

pub use compiler::{compile, CompiledQuery, MATCH_ALL};
pub use types::{
    projection, CriterionKey, CriterionValue, ParamValue, Projection, QueryParams, QueryValue,
    SelectionCriteria, KEYWORD_FIELD,
};
