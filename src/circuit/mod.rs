//! Circuit representation and validation.
//!
//! This module provides the internal representation of a circuit after parsing.
//! The [`Circuit`] struct owns all nodes, devices and models in a form
//! suitable for analysis. Node spellings are canonicalized by [`NodeNamer`].

mod graph;
mod naming;
mod types;
mod validate;

pub use graph::{AnalysisRequest, Circuit};
pub use naming::{NodeMapping, NodeNamer};
pub use types::*;
pub use validate::validate_circuit;
