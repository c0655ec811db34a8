use crate::api::quantity::{COMPUTE_RESOURCES, CPU, EPHEMERAL_STORAGE, MEMORY};
use crate::api::{JobSpec, Quantity, ResourceList};
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::validate::LimitRangeItem;

use tracing::warn;

/// Static request values used when no other default applies.
pub fn static_requests() -> ResourceList {
    [(CPU, "1"), (MEMORY, "4G"), (EPHEMERAL_STORAGE, "4G")]
        .into_iter()
        .filter_map(|(name, text)| Some((name.to_string(), Quantity::parse(text).ok()?)))
        .collect()
}

fn sole_container_requests<'a>(
    spec: &'a mut JobSpec,
    path: &FieldPath,
) -> Result<&'a mut ResourceList, ErrorList> {
    let count = spec.template.containers.len();
    match spec.template.containers.as_mut_slice() {
        [only] => Ok(&mut only.resources.requests),
        _ => Err(FieldError::container_count(path.clone(), count).into()),
    }
}

/// Fill missing cpu/memory/ephemeral-storage requests from the limit
/// range's `defaultRequest` table. Existing requests are kept.
///
/// `path` names the containers list for the container-count error.
pub fn apply_limit_range_floor(
    spec: &mut JobSpec,
    limit_range: Option<&LimitRangeItem>,
    path: &FieldPath,
) -> Result<(), ErrorList> {
    let requests = sole_container_requests(spec, path)?;
    let Some(limit_range) = limit_range else {
        return Ok(());
    };

    for name in COMPUTE_RESOURCES {
        if requests.contains(name) {
            continue;
        }
        if let Some(default) = limit_range.default_request.get(name) {
            requests.insert(name, default.clone());
        }
    }
    Ok(())
}

/// Fill whatever cpu/memory/ephemeral-storage requests are still missing
/// from `statics`.
pub fn apply_static_floor(
    spec: &mut JobSpec,
    statics: &ResourceList,
    path: &FieldPath,
) -> Result<(), ErrorList> {
    let requests = sole_container_requests(spec, path)?;

    for name in COMPUTE_RESOURCES {
        if requests.contains(name) {
            continue;
        }
        if let Some(quantity) = statics.get(name) {
            warn!("falling back to static value {} for {}", quantity, name);
            requests.insert(name, quantity.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Container, PodTemplate};
    use pretty_assertions::assert_eq;

    fn requests(pairs: &[(&str, &str)]) -> ResourceList {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity::parse(v).unwrap()))
            .collect()
    }

    fn spec_with(containers: Vec<Container>) -> JobSpec {
        JobSpec {
            template: PodTemplate {
                containers,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn spec_with_requests(pairs: &[(&str, &str)]) -> JobSpec {
        let mut c = Container::default();
        c.resources.requests = requests(pairs);
        spec_with(vec![c])
    }

    fn path() -> FieldPath {
        FieldPath::new("spec.jobDefinitionSpec.template.containers")
    }

    fn requests_of(spec: &JobSpec) -> &ResourceList {
        &spec.template.containers[0].resources.requests
    }

    #[test]
    fn static_floor_fills_an_empty_request_map() {
        let mut spec = spec_with_requests(&[]);
        apply_static_floor(&mut spec, &static_requests(), &path()).unwrap();
        assert_eq!(
            requests_of(&spec),
            &requests(&[("cpu", "1"), ("memory", "4G"), ("ephemeral-storage", "4G")])
        );
    }

    #[test]
    fn static_floor_keeps_existing_entries() {
        let mut spec = spec_with_requests(&[("memory", "64Mi")]);
        apply_static_floor(&mut spec, &static_requests(), &path()).unwrap();
        assert_eq!(
            requests_of(&spec),
            &requests(&[("cpu", "1"), ("memory", "64Mi"), ("ephemeral-storage", "4G")])
        );
    }

    #[test]
    fn static_floor_is_idempotent() {
        let mut spec = spec_with_requests(&[("cpu", "250m")]);
        apply_static_floor(&mut spec, &static_requests(), &path()).unwrap();
        let once = spec.clone();
        apply_static_floor(&mut spec, &static_requests(), &path()).unwrap();
        assert_eq!(spec, once);
    }

    #[test]
    fn limit_range_floor_uses_default_requests_only_where_present() {
        let limit_range = LimitRangeItem {
            default_request: requests(&[("cpu", "500m"), ("memory", "1G")]),
            ..Default::default()
        };
        let mut spec = spec_with_requests(&[("memory", "2G")]);
        apply_limit_range_floor(&mut spec, Some(&limit_range), &path()).unwrap();
        assert_eq!(requests_of(&spec), &requests(&[("cpu", "500m"), ("memory", "2G")]));
    }

    #[test]
    fn limit_range_floor_is_idempotent() {
        let limit_range = LimitRangeItem {
            default_request: requests(&[("cpu", "500m"), ("ephemeral-storage", "2G")]),
            ..Default::default()
        };
        let mut spec = spec_with_requests(&[("cpu", "2")]);
        apply_limit_range_floor(&mut spec, Some(&limit_range), &path()).unwrap();
        let once = spec.clone();
        apply_limit_range_floor(&mut spec, Some(&limit_range), &path()).unwrap();
        assert_eq!(spec, once);
        assert_eq!(requests_of(&spec), &requests(&[("cpu", "2"), ("ephemeral-storage", "2G")]));
    }

    #[test]
    fn limit_range_floor_without_limit_range_is_a_no_op() {
        let mut spec = spec_with_requests(&[]);
        apply_limit_range_floor(&mut spec, None, &path()).unwrap();
        assert!(requests_of(&spec).is_empty());
    }

    #[test]
    fn floors_require_exactly_one_container() {
        for containers in [vec![], vec![Container::default(), Container::default()]] {
            let count = containers.len();
            let mut spec = spec_with(containers);

            let err = apply_static_floor(&mut spec, &static_requests(), &path()).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "spec.jobDefinitionSpec.template.containers: Unsupported container count: {count}: there must be exactly one container"
                )
            );
            assert!(apply_limit_range_floor(&mut spec, None, &path()).is_err());
        }
    }
}
