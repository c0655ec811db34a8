//! Resolution of a run's effective job spec.
//!
//! Standalone runs get defaults; templated runs are merged field by field
//! with the referenced template. Both produce new values and never mutate
//! the template.

pub mod container;
pub mod env;
pub mod resources;

pub use container::{check_disallowed, merge_container, merge_pod_template};
pub use env::merge_env;
pub use resources::{apply_limit_range_floor, apply_static_floor, static_requests};

use crate::api::{JobRun, JobSpec, JobTemplate, LABEL_JOB_DEFINITION_NAME, LABEL_JOB_DEFINITION_UUID};
use crate::field::{ErrorList, FieldPath};

pub const DEFAULT_ARRAY_SPEC: &str = "0";
pub const DEFAULT_RETRY_LIMIT: i64 = 3;
pub const DEFAULT_MAX_EXECUTION_TIME: i64 = 7200;

/// Leaves room for the random suffix and controller-added qualifiers
/// within the 63-character object name limit.
pub const MAX_GENERATE_NAME_LEN: usize = 48;

/// Fill unset scalars of a standalone run. The pod template is untouched.
pub fn resolve_standalone(spec: &JobSpec) -> JobSpec {
    let mut out = spec.clone();
    out.array_spec.get_or_insert_with(|| DEFAULT_ARRAY_SPEC.to_string());
    out.retry_limit.get_or_insert(DEFAULT_RETRY_LIMIT);
    out.max_execution_time.get_or_insert(DEFAULT_MAX_EXECUTION_TIME);
    out
}

/// Effective spec of a run that references `template`.
///
/// An entirely empty run spec yields a copy of the template's. Otherwise
/// fields the run may not set are checked first (under `path`) and any
/// violation aborts the merge.
pub fn resolve_from_template(
    run: &JobSpec,
    template: &JobSpec,
    path: &FieldPath,
) -> Result<JobSpec, ErrorList> {
    if run.is_empty() {
        return Ok(template.clone());
    }

    check_disallowed(&run.template, &template.template, &path.child("template")).into_result()?;

    Ok(JobSpec {
        array_spec: run.array_spec.clone().or_else(|| template.array_spec.clone()),
        retry_limit: run.retry_limit.or(template.retry_limit),
        max_execution_time: run.max_execution_time.or(template.max_execution_time),
        template: merge_pod_template(&run.template, &template.template),
    })
}

/// Truncate a name-generation prefix to [`MAX_GENERATE_NAME_LEN`] characters.
pub fn trim_generate_name(name: &str) -> &str {
    match name.char_indices().nth(MAX_GENERATE_NAME_LEN) {
        Some((cut, _)) => &name[..cut],
        None => name,
    }
}

impl JobRun {
    pub fn trim_generate_name(&mut self) {
        let trimmed = trim_generate_name(&self.metadata.generate_name);
        if trimmed.len() != self.metadata.generate_name.len() {
            self.metadata.generate_name = trimmed.to_string();
        }
    }

    pub fn apply_defaults(&mut self) {
        self.spec.job_spec = resolve_standalone(&self.spec.job_spec);
    }

    /// Resolve against `template`, then stamp the inherited labels and the
    /// controller owner reference. Pre-existing labels are not overwritten.
    pub fn merge_template(&mut self, template: &JobTemplate) -> Result<(), ErrorList> {
        let path = FieldPath::new("spec").child("jobDefinitionSpec");
        self.spec.job_spec = resolve_from_template(&self.spec.job_spec, &template.spec, &path)?;

        self.add_label(LABEL_JOB_DEFINITION_NAME, &template.metadata.name, false);
        self.add_label(LABEL_JOB_DEFINITION_UUID, &template.metadata.uid, false);
        self.set_owner(template);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Container, LocalObjectReference, PodTemplate};
    use pretty_assertions::assert_eq;

    fn template() -> JobTemplate {
        let mut t = JobTemplate::default();
        t.metadata.name = "tmpl".to_string();
        t.metadata.uid = "u-1".to_string();
        t.spec = JobSpec {
            array_spec: Some("0-9".to_string()),
            retry_limit: Some(3),
            max_execution_time: Some(7200),
            template: PodTemplate {
                containers: vec![Container {
                    name: "main".to_string(),
                    image: "busybox".to_string(),
                    ..Default::default()
                }],
                image_pull_secrets: vec![LocalObjectReference {
                    name: "reg".to_string(),
                }],
                service_account_name: "runner".to_string(),
            },
        };
        t
    }

    fn path() -> FieldPath {
        FieldPath::new("spec.jobDefinitionSpec")
    }

    #[test]
    fn standalone_defaults_fill_only_unset_scalars() {
        let spec = JobSpec {
            retry_limit: Some(0),
            ..Default::default()
        };
        let out = resolve_standalone(&spec);
        assert_eq!(out.array_spec.as_deref(), Some("0"));
        assert_eq!(out.retry_limit, Some(0));
        assert_eq!(out.max_execution_time, Some(7200));
        assert!(out.template.is_empty());
    }

    #[test]
    fn empty_run_spec_copies_template() {
        let t = template();
        assert_eq!(resolve_from_template(&JobSpec::default(), &t.spec, &path()).unwrap(), t.spec);
    }

    #[test]
    fn run_scalars_override_template() {
        let run = JobSpec {
            array_spec: Some("5".to_string()),
            max_execution_time: Some(60),
            ..Default::default()
        };
        let out = resolve_from_template(&run, &template().spec, &path()).unwrap();
        assert_eq!(out.array_spec.as_deref(), Some("5"));
        assert_eq!(out.retry_limit, Some(3));
        assert_eq!(out.max_execution_time, Some(60));
        assert_eq!(out.template, template().spec.template);
    }

    #[test]
    fn disallowed_fields_abort_the_merge() {
        let mut run = JobSpec::default();
        run.template.service_account_name = "other".to_string();
        let errs = resolve_from_template(&run, &template().spec, &path()).unwrap_err();
        assert_eq!(
            errs.to_string(),
            "spec.jobDefinitionSpec.template.serviceAccountName: Unsupported field: disallow to set with referenced jobDefinition"
        );
    }

    #[test]
    fn generate_name_is_cut_at_48_characters() {
        let long = "a".repeat(60);
        assert_eq!(trim_generate_name(&long).len(), 48);
        assert_eq!(trim_generate_name("short-"), "short-");
        assert_eq!(trim_generate_name(&"b".repeat(48)).len(), 48);
    }

    #[test]
    fn merge_template_stamps_labels_without_overwriting() {
        let mut run = JobRun::default();
        run.spec.template_ref = "tmpl".to_string();
        run.add_label(LABEL_JOB_DEFINITION_NAME, "pinned", false);

        run.merge_template(&template()).unwrap();

        assert_eq!(run.metadata.labels[LABEL_JOB_DEFINITION_NAME], "pinned");
        assert_eq!(run.metadata.labels[LABEL_JOB_DEFINITION_UUID], "u-1");
        assert_eq!(run.metadata.owner_references.len(), 1);
        assert_eq!(run.spec.job_spec, template().spec);
    }
}
