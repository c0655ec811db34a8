//! Wire records for job templates and job runs.
//!
//! Field names follow the stored JSON representation (`jobDefinitionRef`,
//! `arraySpec`, `succeededIndices`, ...) and must not change.

pub mod container;
pub mod job;
pub mod meta;
pub mod quantity;
pub mod run;

pub use container::{
    Container, EnvFromSource, EnvVar, EnvVarSource, KeySelector, LocalObjectReference,
    ResourceRequirements, SourceReference,
};
pub use job::{JobSpec, JobTemplate, PodTemplate};
pub use meta::{ObjectMeta, OwnerReference};
pub use quantity::{Quantity, QuantityError, ResourceList};
pub use run::{Condition, ConditionStatus, ConditionType, JobRun, JobRunSpec, JobRunStatus, PodPhase};

pub const API_VERSION: &str = "codeengine.cloud.ibm.com/v1beta1";
pub const JOB_DEFINITION_KIND: &str = "JobDefinition";

pub const LABEL_JOB_DEFINITION_NAME: &str = "codeengine.cloud.ibm.com/job-definition-name";
pub const LABEL_JOB_DEFINITION_UUID: &str = "codeengine.cloud.ibm.com/job-definition-uuid";

/// Env var carrying the per-pod index; reserved for the batch controller.
pub const JOB_INDEX_ENV: &str = "JOB_INDEX";

/// `CE_EXECUTION_MODE=DAEMON` on the container flags a non-indexed run.
pub const EXECUTION_MODE_ENV: &str = "CE_EXECUTION_MODE";
pub const DAEMON_EXECUTION_MODE: &str = "DAEMON";
