use crate::api::quantity::COMPUTE_RESOURCES;
use crate::api::{Quantity, ResourceRequirements};
use crate::field::{ErrorList, FieldError, FieldPath};
use crate::validate::{LimitRangeItem, ResourceRatios, ValidationConfig};

use std::cmp::Ordering;

/// Request quantities and cpu/memory ratios of one container.
/// `path` points at the container's `resources`.
pub fn validate_resources(
    resources: &ResourceRequirements,
    config: &ValidationConfig,
    path: &FieldPath,
) -> ErrorList {
    let mut errs = ErrorList::new();
    let requests_path = path.child("requests");

    for name in COMPUTE_RESOURCES {
        let Some(quantity) = resources.requests.get(name) else {
            continue;
        };
        if let Some(err) = check_quantity(quantity, name, config.limit_range.as_ref(), &requests_path.child(name)) {
            errs.push(err);
        }
    }

    if let Some(err) = check_ratios(resources, &config.resource_ratios, &requests_path) {
        errs.push(err);
    }

    errs
}

fn check_quantity(
    quantity: &Quantity,
    name: &str,
    limit_range: Option<&LimitRangeItem>,
    path: &FieldPath,
) -> Option<FieldError> {
    if !quantity.is_positive() {
        return Some(FieldError::beyond_range(
            path.clone(),
            quantity.as_str(),
            "must be greater than 0",
        ));
    }

    let limit_range = limit_range?;
    let min = limit_range.min.get(name);
    let max = limit_range.max.get(name);

    let below = min.is_some_and(|m| quantity.numeric_cmp(m) == Ordering::Less);
    let above = max.is_some_and(|m| quantity.numeric_cmp(m) == Ordering::Greater);
    if !(below || above) {
        return None;
    }

    let bound = |q: Option<&Quantity>| q.map_or("n/a", Quantity::as_str).to_string();
    Some(FieldError::beyond_range(
        path.clone(),
        quantity.as_str(),
        format!("expected {} <= {} <= {}", bound(min), quantity, bound(max)),
    ))
}

/// With both a ratio table and requests, cpu and memory must match one
/// allowed pair numerically.
fn check_ratios(
    resources: &ResourceRequirements,
    ratios: &ResourceRatios,
    path: &FieldPath,
) -> Option<FieldError> {
    let requests = &resources.requests;
    if ratios.is_empty() || requests.is_empty() {
        return None;
    }

    let (cpu, memory) = (requests.cpu(), requests.memory());
    let allowed = ratios
        .iter()
        .any(|r| r.cpu().numeric_eq(&cpu) && r.memory().numeric_eq(&memory));
    if allowed {
        return None;
    }

    Some(FieldError::unsupported_resources(
        path.clone(),
        requests.to_string(),
        ratios.to_string(),
    ))
}
