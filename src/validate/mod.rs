//! Structural validation of job templates and resolved run specs.
//!
//! Checks accumulate into one [`ErrorList`] so callers see every violation
//! in a single pass.

pub mod container;
pub mod resources;

pub use container::{dns1123_label_errors, validate_containers};
pub use resources::validate_resources;

use crate::api::{JobRun, JobSpec, JobTemplate, PodTemplate, ResourceList};
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::range;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ceiling on the JSON-encoded pod template.
pub const TEMPLATE_SIZE_LIMIT: usize = 10 * 1024;

/// Object names max out at 63 characters; 10 are reserved for the controller.
pub const MAX_RUN_NAME_LEN: usize = 53;

/// Quota description supplied by the platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationConfig {
    pub limit_range: Option<LimitRangeItem>,
    pub resource_ratios: ResourceRatios,
}

/// Per-container bounds and defaults from the namespace's limit range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitRangeItem {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub min: ResourceList,

    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub max: ResourceList,

    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub default: ResourceList,

    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub default_request: ResourceList,
}

/// Allowed cpu/memory request pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRatios(pub Vec<ResourceList>);

impl ResourceRatios {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceList> {
        self.0.iter()
    }
}

impl fmt::Display for ResourceRatios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .iter()
            .map(|r| format!("{} / {}", r.cpu(), r.memory()))
            .collect();
        f.write_str(&pairs.join(", "))
    }
}

pub fn validate_job_spec(spec: &JobSpec, config: &ValidationConfig, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    match &spec.array_spec {
        None => errs.push(FieldError::missing(path.child("arraySpec"))),
        Some(expr) => {
            if let Err(e) = range::decode(expr) {
                errs.push(FieldError::invalid(path.child("arraySpec"), expr.as_str(), e.to_string()));
            }
        }
    }

    if spec.retry_limit.is_none() {
        errs.push(FieldError::missing(path.child("retryLimit")));
    }

    if spec.template.is_empty() {
        errs.push(FieldError::missing(path.child("template")));
    }

    errs.append(validate_pod_template(&spec.template, config, &path.child("template")));
    errs
}

pub fn validate_pod_template(template: &PodTemplate, config: &ValidationConfig, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    let size = serialized_size(template);
    if size > TEMPLATE_SIZE_LIMIT {
        errs.push(FieldError::size_limit(
            path.clone(),
            format!("size limit is {TEMPLATE_SIZE_LIMIT} bytes, but actual size is {size} bytes"),
        ));
    }

    let containers = path.child("containers");
    if template.containers.len() != 1 {
        errs.push(FieldError::container_count(containers.clone(), template.containers.len()));
    }

    errs.append(validate_containers(&template.containers, config, &containers));
    errs
}

/// Length of the JSON encoding used for storage.
pub fn serialized_size(template: &PodTemplate) -> usize {
    serde_json::to_vec(template).map_or(0, |bytes| bytes.len())
}

impl JobTemplate {
    pub fn validate(&self, config: &ValidationConfig) -> ErrorList {
        validate_job_spec(&self.spec, config, &FieldPath::new("spec"))
    }
}

impl JobRun {
    pub fn validate(&self, config: &ValidationConfig) -> ErrorList {
        let mut errs = ErrorList::new();

        if self.metadata.name.chars().count() > MAX_RUN_NAME_LEN {
            errs.push(FieldError::invalid(
                FieldPath::new("metadata").child("name"),
                self.metadata.name.as_str(),
                format!("name exceeded max length of {MAX_RUN_NAME_LEN}"),
            ));
        }

        errs.append(validate_job_spec(
            &self.spec.job_spec,
            config,
            &FieldPath::new("spec").child("jobDefinitionSpec"),
        ));
        errs
    }
}
