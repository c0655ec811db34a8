//! JSON views printed by the CLI.

use crate::api::{JobRun, JobRunStatus};
use crate::field::{ErrorList, FieldError};
use crate::range::IndexSet;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorView {
    pub field: String,
    pub kind: &'static str,
    pub message: String,
}

impl From<&FieldError> for FieldErrorView {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field().to_string(),
            kind: err.kind().as_str(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodeView {
    pub expression: String,
    pub canonical: String,
    pub count: usize,
}

impl DecodeView {
    pub fn new(expression: &str, indices: &IndexSet) -> Self {
        Self {
            expression: expression.to_string(),
            canonical: indices.to_range_string(),
            count: indices.len(),
        }
    }
}

/// Outcome of admitting a run or template. `object` is the effective
/// record when admitted.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionView<T: Serialize> {
    pub admitted: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorView>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<T>,
}

impl<T: Serialize> AdmissionView<T> {
    pub fn from_result(result: Result<T, ErrorList>) -> Self {
        match result {
            Ok(object) => Self {
                admitted: true,
                errors: Vec::new(),
                object: Some(object),
            },
            Err(errs) => Self {
                admitted: false,
                errors: errs.iter().map(FieldErrorView::from).collect(),
                object: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub name: String,
    pub daemon_mode: bool,
    pub finished: bool,
    pub status: JobRunStatus,
}

impl From<&JobRun> for StatusView {
    fn from(run: &JobRun) -> Self {
        Self {
            name: run.metadata.name.clone(),
            daemon_mode: run.is_daemon_mode(),
            finished: run.is_finished(),
            status: run.status.clone(),
        }
    }
}
