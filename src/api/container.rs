use crate::api::quantity::ResourceList;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One container of a job pod template.
///
/// Fields the job API never accepts (probes, ports, mounts, ...) are kept as
/// raw JSON so that their presence can be reported without modelling them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_from: Vec<EnvFromSource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub termination_message_path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub termination_message_policy: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_devices: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_probe: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<Value>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub stdin: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub stdin_once: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub tty: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Container {
    /// Literal value of the first env entry named `name`.
    pub fn env_value(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

impl EnvVar {
    pub fn literal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            value_from: None,
        }
    }

    /// Neither a literal value nor a source reference.
    pub fn is_unset(&self) -> bool {
        self.value.is_empty() && self.value_from.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_field_ref: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeySelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySelector {
    pub name: String,
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvFromSource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_ref: Option<SourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SourceReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub limits: ResourceList,

    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub requests: ResourceList,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && self.requests.is_empty()
    }
}
