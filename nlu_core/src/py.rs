//! Python bindings for the NLU pipeline using PyO3

use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyString};

use crate::config::PipelineConfig;
use crate::error::NluError;
use crate::pipeline::Pipeline;
use crate::rules::RuleTable;
use crate::types::{HistoryEntry, Speaker};

fn to_py_err(err: NluError) -> PyErr {
    match err {
        NluError::MalformedInput(msg) => PyTypeError::new_err(format!("malformed input: {}", msg)),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyValueError::new_err(format!("Failed to serialize result: {}", e)))
}

/// Reject anything that is not a `str` instead of coercing it
fn text_arg(text: &Bound<'_, PyAny>) -> PyResult<String> {
    if !text.is_instance_of::<PyString>() {
        let kind = text.get_type().name()?.to_string();
        return Err(to_py_err(NluError::MalformedInput(format!(
            "text must be str, got {}",
            kind
        ))));
    }
    text.extract()
}

fn history_arg(history: Option<&Bound<'_, PyList>>) -> PyResult<Vec<HistoryEntry>> {
    let Some(history) = history else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::with_capacity(history.len());
    for item in history.iter() {
        let turn = item.downcast::<PyDict>()?;

        let speaker: String = turn
            .get_item("speaker")?
            .and_then(|v| v.extract().ok())
            .unwrap_or_default();
        let text: String = match turn.get_item("text")? {
            Some(value) if value.is_instance_of::<PyString>() => value.extract()?,
            _ => {
                return Err(to_py_err(NluError::MalformedInput(
                    "history turn text must be str".to_string(),
                )))
            }
        };

        let speaker = match speaker.as_str() {
            "user" => Speaker::User,
            "assistant" => Speaker::Assistant,
            other => {
                return Err(to_py_err(NluError::MalformedInput(format!(
                    "unknown speaker '{}'",
                    other
                ))))
            }
        };
        entries.push(HistoryEntry { speaker, text });
    }

    Ok(entries)
}

/// Classify text with the built-in rules, returning the analysis as JSON
#[pyfunction]
pub fn py_classify_intent(text: &Bound<'_, PyAny>) -> PyResult<String> {
    let text = text_arg(text)?;
    to_json(&Pipeline::default().classify(&text))
}

/// Python wrapper for the pipeline over the built-in rules
#[pyclass]
pub struct PyPipeline {
    pipeline: Pipeline<'static>,
}

#[pymethods]
impl PyPipeline {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => PipelineConfig::from_json(json).map_err(to_py_err)?,
            None => PipelineConfig::default(),
        };
        Ok(Self {
            pipeline: Pipeline::new(RuleTable::builtin(), config),
        })
    }

    /// Process an utterance; returns the result bundle as JSON
    #[pyo3(signature = (text, history=None))]
    fn process(&self, text: &Bound<'_, PyAny>, history: Option<&Bound<'_, PyList>>) -> PyResult<String> {
        let text = text_arg(text)?;
        let history = history_arg(history)?;
        to_json(&self.pipeline.process(&text, &history))
    }

    /// Classify only; returns the semantic analysis as JSON
    fn classify(&self, text: &Bound<'_, PyAny>) -> PyResult<String> {
        let text = text_arg(text)?;
        to_json(&self.pipeline.classify(&text))
    }

    /// Names of the intents in declaration order
    fn intents(&self) -> Vec<String> {
        self.pipeline
            .rules()
            .intents()
            .iter()
            .map(|rule| rule.name.clone())
            .collect()
    }
}
