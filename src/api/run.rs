use crate::api::job::{JobSpec, JobTemplate};
use crate::api::meta::{ObjectMeta, OwnerReference};
use crate::api::{API_VERSION, JOB_DEFINITION_KIND};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One execution request, standalone or referencing a [`JobTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: JobRunSpec,

    #[serde(default)]
    pub status: JobRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRunSpec {
    /// Name of the referenced template; empty for a standalone run.
    #[serde(rename = "jobDefinitionRef", default)]
    pub template_ref: String,

    #[serde(
        rename = "jobDefinitionSpec",
        default,
        skip_serializing_if = "JobSpec::is_empty"
    )]
    pub job_spec: JobSpec,
}

impl JobRun {
    pub fn is_templated(&self) -> bool {
        !self.spec.template_ref.is_empty()
    }

    pub fn add_label(&mut self, key: &str, value: &str, overwrite: bool) -> bool {
        self.metadata.add_label(key, value, overwrite)
    }

    /// Make `template` the controlling owner of this run.
    pub fn set_owner(&mut self, template: &JobTemplate) {
        self.metadata.set_owner_reference(OwnerReference::controller(
            API_VERSION,
            JOB_DEFINITION_KIND,
            &template.metadata.name,
            &template.metadata.uid,
        ));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_indices: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded_indices: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub unknown: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub pending: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub running: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub succeeded: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub failed: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub requested: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    Pending,
    Running,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// Timestamped state marker on a run's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionType,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Condition {
    pub fn new(kind: ConditionType, status: ConditionStatus) -> Self {
        Self {
            kind,
            status,
            last_probe_time: None,
            last_transition_time: None,
            reason: String::new(),
            message: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: &str, message: &str) -> Self {
        self.reason = reason.to_string();
        self.message = message.to_string();
        self
    }

    /// Equal in every field except the two timestamps.
    pub fn same_state(&self, other: &Condition) -> bool {
        self.kind == other.kind
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Observed phase of the pod executing one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn run_spec_uses_job_definition_wire_names() {
        let run: JobRun = serde_json::from_value(json!({
            "metadata": {"name": "run-1"},
            "spec": {
                "jobDefinitionRef": "tmpl",
                "jobDefinitionSpec": {"arraySpec": "1-3"}
            }
        }))
        .unwrap();

        assert!(run.is_templated());
        assert_eq!(run.spec.job_spec.array_spec.as_deref(), Some("1-3"));
    }

    #[test]
    fn set_owner_marks_template_as_controller() {
        let mut template = JobTemplate::default();
        template.metadata.name = "tmpl".to_string();
        template.metadata.uid = "u-1".to_string();

        let mut run = JobRun::default();
        run.set_owner(&template);

        assert_eq!(
            run.metadata.owner_references,
            vec![OwnerReference {
                api_version: "codeengine.cloud.ibm.com/v1beta1".to_string(),
                kind: "JobDefinition".to_string(),
                name: "tmpl".to_string(),
                uid: "u-1".to_string(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            }]
        );
    }

    #[test]
    fn condition_round_trips_with_type_key() {
        let cond = Condition::new(ConditionType::Complete, ConditionStatus::True)
            .with_reason("Done", "all indices succeeded");
        let value = serde_json::to_value(&cond).unwrap();
        assert_eq!(
            value,
            json!({"type": "Complete", "status": "True", "reason": "Done", "message": "all indices succeeded"})
        );
    }

    #[test]
    fn status_counts_default_to_zero_and_are_omitted() {
        let status = JobRunStatus::default();
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({}));
    }
}
