use crate::api::container::{Container, LocalObjectReference};
use crate::api::meta::ObjectMeta;

use serde::{Deserialize, Serialize};

/// Reusable job definition that runs reference by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: JobSpec,
}

/// Array shape, retry policy, timeout and pod template of a job.
///
/// Scalars are optional so that "unset" stays distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_spec: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_execution_time: Option<i64>,

    #[serde(default)]
    pub template: PodTemplate,
}

impl JobSpec {
    pub fn is_empty(&self) -> bool {
        self.array_spec.is_none()
            && self.retry_limit.is_none()
            && self.max_execution_time.is_none()
            && self.template.is_empty()
    }

    /// The sole container, if there is exactly one.
    pub fn container(&self) -> Option<&Container> {
        match self.template.containers.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account_name: String,
}

impl PodTemplate {
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
            && self.image_pull_secrets.is_empty()
            && self.service_account_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unset_scalars_differ_from_zero() {
        let spec: JobSpec = serde_json::from_value(json!({"retryLimit": 0})).unwrap();
        assert_eq!(spec.retry_limit, Some(0));
        assert_eq!(spec.array_spec, None);
        assert!(!spec.is_empty());
        assert!(JobSpec::default().is_empty());
    }

    #[test]
    fn template_reads_wire_names() {
        let template: JobTemplate = serde_json::from_value(json!({
            "metadata": {"name": "tmpl", "uid": "u-1"},
            "spec": {
                "arraySpec": "0-9",
                "maxExecutionTime": 60,
                "template": {
                    "containers": [{"name": "main", "image": "busybox"}],
                    "imagePullSecrets": [{"name": "registry"}],
                    "serviceAccountName": "runner"
                }
            }
        }))
        .unwrap();

        assert_eq!(template.metadata.uid, "u-1");
        assert_eq!(template.spec.array_spec.as_deref(), Some("0-9"));
        assert_eq!(template.spec.max_execution_time, Some(60));
        assert_eq!(template.spec.template.image_pull_secrets[0].name, "registry");
        assert_eq!(template.spec.container().map(|c| c.image.as_str()), Some("busybox"));
    }
}
