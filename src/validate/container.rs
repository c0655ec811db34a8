use crate::api::{Container, EnvVar, JOB_INDEX_ENV};
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::validate::ValidationConfig;
use crate::validate::resources::validate_resources;

use regex::Regex;
use std::sync::LazyLock;

const DNS1123_LABEL_MAX_LEN: usize = 63;
const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const DNS1123_LABEL_ERR: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character";

static DNS1123_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DNS1123_LABEL_FMT}$")).expect("DNS-1123 label regex is valid")
});

/// Problems with `value` as an RFC 1123 label; empty when valid.
pub fn dns1123_label_errors(value: &str) -> Vec<String> {
    let mut errs = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LEN {
        errs.push(format!("must be no more than {DNS1123_LABEL_MAX_LEN} characters"));
    }
    if !DNS1123_LABEL.is_match(value) {
        errs.push(format!(
            "{DNS1123_LABEL_ERR} (e.g. 'my-name', or '123-abc', regex used for validation is '{DNS1123_LABEL_FMT}')"
        ));
    }
    errs
}

/// Every container; `path` points at the `containers` list.
pub fn validate_containers(
    containers: &[Container],
    config: &ValidationConfig,
    path: &FieldPath,
) -> ErrorList {
    let mut errs = ErrorList::new();

    for (i, container) in containers.iter().enumerate() {
        let path = path.index(i);

        errs.append(check_disallowed_fields(container, &path));
        errs.append(validate_env(&container.env, &path.child("env")));
        errs.append(validate_resources(&container.resources, config, &path.child("resources")));

        if container.name.is_empty() {
            errs.push(FieldError::missing(path.child("name")));
        } else {
            let problems = dns1123_label_errors(&container.name);
            if !problems.is_empty() {
                errs.push(FieldError::invalid(
                    path.child("name"),
                    container.name.as_str(),
                    format!("invalid value: {}", problems.join(",")),
                ));
            }
        }

        if container.image.is_empty() {
            errs.push(FieldError::missing(path.child("image")));
        }
    }

    errs
}

/// Container fields the job API never accepts, whatever their value.
fn check_disallowed_fields(container: &Container, path: &FieldPath) -> ErrorList {
    let present = [
        ("lifecycle", container.lifecycle.is_some()),
        ("livenessProbe", container.liveness_probe.is_some()),
        ("readinessProbe", container.readiness_probe.is_some()),
        ("startupProbe", container.startup_probe.is_some()),
        ("ports", container.ports.is_some()),
        ("securityContext", container.security_context.is_some()),
        ("stdin", container.stdin),
        ("stdinOnce", container.stdin_once),
        ("tty", container.tty),
        ("volumeDevices", container.volume_devices.is_some()),
        ("volumeMounts", container.volume_mounts.is_some()),
    ];

    present
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| FieldError::unsupported(path.child(name), ""))
        .collect()
}

fn validate_env(env: &[EnvVar], path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    for (i, entry) in env.iter().enumerate() {
        let path = path.index(i);

        if entry.name == JOB_INDEX_ENV {
            errs.push(FieldError::unsupported(
                path.child("name"),
                format!("'{}' is reserved for batch API", entry.name),
            ));
        }

        if let Some(source) = &entry.value_from {
            if source.field_ref.is_some() {
                errs.push(FieldError::unsupported(path.child("valueFrom.fieldRef"), ""));
            }
            if source.resource_field_ref.is_some() {
                errs.push(FieldError::unsupported(path.child("valueFrom.resourceFieldRef"), ""));
            }
        }
    }

    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EnvVarSource;
    use crate::field::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path() -> FieldPath {
        FieldPath::new("spec.template.containers")
    }

    fn valid() -> Container {
        Container {
            name: "main".to_string(),
            image: "busybox".to_string(),
            ..Default::default()
        }
    }

    fn fields(errs: &ErrorList) -> Vec<String> {
        errs.iter().map(|e| e.field().to_string()).collect()
    }

    #[test]
    fn valid_container_passes() {
        assert!(validate_containers(&[valid()], &ValidationConfig::default(), &path()).is_empty());
    }

    #[test]
    fn name_and_image_are_required() {
        let errs = validate_containers(&[Container::default()], &ValidationConfig::default(), &path());
        assert_eq!(
            errs.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec![
                "spec.template.containers[0].name: Missing field: must be specified",
                "spec.template.containers[0].image: Missing field: must be specified",
            ]
        );
    }

    #[test]
    fn name_must_be_a_dns_label() {
        for bad in ["Main", "-main", "main-", "ma_in"] {
            let c = Container {
                name: bad.to_string(),
                ..valid()
            };
            let errs = validate_containers(&[c], &ValidationConfig::default(), &path());
            assert_eq!(errs.len(), 1, "{bad}");
            let err = errs.iter().next().unwrap();
            assert_eq!(err.kind(), ErrorKind::Invalid);
            assert!(err.to_string().contains("invalid value: a lowercase RFC 1123 label"));
        }
        assert!(dns1123_label_errors("a-1").is_empty());
        assert_eq!(dns1123_label_errors(&"a".repeat(64)).len(), 1);
    }

    #[test]
    fn every_disallowed_field_is_reported_in_order() {
        let c: Container = serde_json::from_value(json!({
            "name": "main",
            "image": "busybox",
            "lifecycle": {},
            "livenessProbe": {},
            "readinessProbe": {},
            "startupProbe": {},
            "ports": [],
            "securityContext": {},
            "stdin": true,
            "stdinOnce": true,
            "tty": true,
            "volumeDevices": [],
            "volumeMounts": []
        }))
        .unwrap();

        let errs = validate_containers(&[c], &ValidationConfig::default(), &path());
        let names: Vec<String> = fields(&errs)
            .into_iter()
            .map(|f| f.trim_start_matches("spec.template.containers[0].").to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "lifecycle", "livenessProbe", "readinessProbe", "startupProbe", "ports",
                "securityContext", "stdin", "stdinOnce", "tty", "volumeDevices", "volumeMounts",
            ]
        );
        assert!(errs.iter().all(|e| e.kind() == ErrorKind::Unsupported));
    }

    #[test]
    fn false_booleans_are_not_disallowed() {
        let c: Container =
            serde_json::from_value(json!({"name": "main", "image": "busybox", "stdin": false})).unwrap();
        assert!(validate_containers(&[c], &ValidationConfig::default(), &path()).is_empty());
    }

    #[test]
    fn reserved_and_self_referencing_env_is_rejected() {
        let mut c = valid();
        c.env = vec![
            EnvVar::literal("JOB_INDEX", "7"),
            EnvVar::literal("OK", "1"),
            EnvVar {
                name: "POD".to_string(),
                value: String::new(),
                value_from: Some(EnvVarSource {
                    field_ref: Some(json!({"fieldPath": "metadata.name"})),
                    resource_field_ref: Some(json!({"resource": "limits.cpu"})),
                    ..Default::default()
                }),
            },
        ];

        let errs = validate_containers(&[c], &ValidationConfig::default(), &path());
        assert_eq!(
            errs.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec![
                "spec.template.containers[0].env[0].name: Unsupported field: 'JOB_INDEX' is reserved for batch API",
                "spec.template.containers[0].env[2].valueFrom.fieldRef: Unsupported field",
                "spec.template.containers[0].env[2].valueFrom.resourceFieldRef: Unsupported field",
            ]
        );
    }

    #[test]
    fn errors_accumulate_across_containers() {
        let errs = validate_containers(
            &[Container::default(), Container::default()],
            &ValidationConfig::default(),
            &path(),
        );
        assert_eq!(
            fields(&errs),
            vec![
                "spec.template.containers[0].name",
                "spec.template.containers[0].image",
                "spec.template.containers[1].name",
                "spec.template.containers[1].image",
            ]
        );
    }
}
