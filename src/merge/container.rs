use crate::api::{Container, PodTemplate, ResourceList};
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::merge::env::merge_env;

const DISALLOWED_WITH_TEMPLATE: &str = "disallow to set with referenced jobDefinition";

/// Fields a templated run may not set on its pod template.
///
/// `path` points at the run's pod template, e.g.
/// `spec.jobDefinitionSpec.template`.
pub fn check_disallowed(run: &PodTemplate, template: &PodTemplate, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    if !run.service_account_name.is_empty() {
        errs.push(FieldError::unsupported(
            path.child("serviceAccountName"),
            DISALLOWED_WITH_TEMPLATE,
        ));
    }
    if !run.image_pull_secrets.is_empty() {
        errs.push(FieldError::unsupported(
            path.child("imagePullSecrets"),
            DISALLOWED_WITH_TEMPLATE,
        ));
    }

    if let (Some(run_c), Some(tmpl_c)) = (run.containers.first(), template.containers.first()) {
        errs.append(check_container(run_c, tmpl_c, &path.child("containers").index(0)));
    }

    errs
}

fn check_container(run: &Container, template: &Container, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    if !run.name.is_empty() && run.name != template.name {
        errs.push(FieldError::invalid(
            path.child("name"),
            template.name.as_str(),
            "must be the same as referenced jobDefinition.spec.template.containers[0].name",
        ));
    }
    if !run.image.is_empty() && run.image != template.image {
        errs.push(FieldError::invalid(
            path.child("image"),
            template.image.as_str(),
            "must be the same as referenced jobDefinition.spec.template.containers[0].image",
        ));
    }

    let template_only = [
        ("terminationMessagePath", &run.termination_message_path),
        ("terminationMessagePolicy", &run.termination_message_policy),
        ("workingDir", &run.working_dir),
    ];
    for (name, value) in template_only {
        if !value.is_empty() {
            errs.push(FieldError::unsupported(path.child(name), DISALLOWED_WITH_TEMPLATE));
        }
    }

    errs
}

/// Pod template of a templated run: pull secrets and service account come
/// from the template, the container is merged field by field.
pub fn merge_pod_template(run: &PodTemplate, template: &PodTemplate) -> PodTemplate {
    let containers = match (run.containers.first(), template.containers.first()) {
        (Some(run_c), Some(tmpl_c)) => vec![merge_container(run_c, tmpl_c)],
        (None, _) => template.containers.clone(),
        // Nothing to merge into; validation rejects the result if it is wrong.
        (Some(_), None) => run.containers.clone(),
    };

    PodTemplate {
        containers,
        image_pull_secrets: template.image_pull_secrets.clone(),
        service_account_name: template.service_account_name.clone(),
    }
}

/// Start from the template container and apply the run's overrides.
pub fn merge_container(run: &Container, template: &Container) -> Container {
    let mut merged = template.clone();

    if !run.command.is_empty() {
        merged.command = run.command.clone();
    }
    if !run.args.is_empty() {
        merged.args = run.args.clone();
    }
    if !run.env_from.is_empty() {
        merged.env_from = run.env_from.clone();
    }

    merged.resources.requests = union_requests(&template.resources.requests, &run.resources.requests);
    merged.env = merge_env(&template.env, &run.env);

    merged
}

/// Key-wise union; `overrides` wins for names present in both.
fn union_requests(base: &ResourceList, overrides: &ResourceList) -> ResourceList {
    let mut out = base.clone();
    for (name, quantity) in overrides {
        out.insert(name.as_str(), quantity.clone());
    }
    out
}
