//! File-backed admission configuration.
//!
//! ```json
//! {
//!   "limitRange": {"min": {"cpu": "10m"}, "max": {"cpu": "8"}, "defaultRequest": {"cpu": "1"}},
//!   "resourceRatios": [{"cpu": "1", "memory": "4G"}],
//!   "staticRequests": {"cpu": "1", "memory": "4G", "ephemeral-storage": "4G"},
//!   "applyStaticFloor": true
//! }
//! ```

use crate::Result;
use crate::api::ResourceList;
use crate::merge::static_requests;
use crate::validate::{LimitRangeItem, ResourceRatios, ValidationConfig};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_range: Option<LimitRangeItem>,

    pub resource_ratios: ResourceRatios,

    /// Last-resort request values; see [`static_requests`].
    pub static_requests: ResourceList,

    pub apply_static_floor: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            limit_range: None,
            resource_ratios: ResourceRatios::default(),
            static_requests: static_requests(),
            apply_static_floor: true,
        }
    }
}

impl AdmissionConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// The quota description the validator checks against.
    pub fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            limit_range: self.limit_range.clone(),
            resource_ratios: self.resource_ratios.clone(),
        }
    }
}
