//! End-to-end admission of runs and templates: name trimming, defaults or
//! template merge, request floors, then validation.

use crate::api::{JobRun, JobTemplate};
use crate::config::AdmissionConfig;
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::merge::{self, DEFAULT_MAX_EXECUTION_TIME, DEFAULT_RETRY_LIMIT};

use tracing::debug;

/// Resolve and validate `run`. `template` must be the one the run references
/// by name, if any. The input is left untouched.
pub fn admit_run(
    run: &JobRun,
    template: Option<&JobTemplate>,
    config: &AdmissionConfig,
) -> Result<JobRun, ErrorList> {
    let mut run = run.clone();
    run.trim_generate_name();

    if run.is_templated() {
        let template = template
            .filter(|t| t.metadata.name == run.spec.template_ref)
            .ok_or_else(|| {
                FieldError::invalid(
                    FieldPath::new("spec").child("jobDefinitionRef"),
                    run.spec.template_ref.as_str(),
                    "referenced job definition not found",
                )
            })?;
        run.merge_template(template)?;
        debug!(template = %template.metadata.name, "merged run with template");
    } else {
        run.apply_defaults();
    }

    apply_floors(&mut run, config)?;

    let errs = run.validate(&config.validation());
    debug!(run = %run.metadata.name, errors = errs.len(), "validated run");
    errs.into_result()?;
    Ok(run)
}

fn apply_floors(run: &mut JobRun, config: &AdmissionConfig) -> Result<(), ErrorList> {
    // Wrong container counts are left for validation to report with the rest.
    if run.spec.job_spec.container().is_none() {
        return Ok(());
    }

    let path = FieldPath::new("spec.jobDefinitionSpec.template.containers");
    merge::apply_limit_range_floor(&mut run.spec.job_spec, config.limit_range.as_ref(), &path)?;
    if config.apply_static_floor {
        merge::apply_static_floor(&mut run.spec.job_spec, &config.static_requests, &path)?;
    }
    Ok(())
}

/// Default and validate a template.
pub fn admit_template(template: &JobTemplate, config: &AdmissionConfig) -> Result<JobTemplate, ErrorList> {
    let mut template = template.clone();
    template.spec.retry_limit.get_or_insert(DEFAULT_RETRY_LIMIT);
    template
        .spec
        .max_execution_time
        .get_or_insert(DEFAULT_MAX_EXECUTION_TIME);

    let errs = template.validate(&config.validation());
    debug!(template = %template.metadata.name, errors = errs.len(), "validated template");
    errs.into_result()?;
    Ok(template)
}
