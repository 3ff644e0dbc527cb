//! NLU core - deterministic, rule-based understanding for the fleet assistant
//!
//! Classifies an utterance into domain intents, extracts typed fragments,
//! relates it to the recent conversation and compiles the result into a
//! declarative query descriptor for the retrieval layer.

pub mod classifier;
pub mod composer;
pub mod config;
pub mod context;
pub mod entities;
pub mod error;
pub mod pipeline;
pub mod rules;
pub mod types;

pub use classifier::classify;
pub use composer::compose;
pub use config::PipelineConfig;
pub use context::resolve_context;
pub use entities::EntityExtractor;
pub use error::{NluError, Result};
pub use pipeline::{process, Pipeline};
pub use rules::RuleTable;
pub use types::*;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn nlu_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyPipeline>()?;
    m.add_function(wrap_pyfunction!(py_classify_intent, m)?)?;
    Ok(())
}
