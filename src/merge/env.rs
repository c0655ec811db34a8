use crate::api::EnvVar;

/// Merge a run's env entries over a template's.
///
/// - same name, run entry set: replaced in place
/// - same name, run entry unset: template entry removed
/// - new name, run entry set: appended, in run order
/// - new name, run entry unset: dropped
///
/// Names compare exactly.
pub fn merge_env(template: &[EnvVar], run: &[EnvVar]) -> Vec<EnvVar> {
    let mut merged: Vec<EnvVar> = template.to_vec();
    let mut appended: Vec<EnvVar> = Vec::new();

    for entry in run {
        match merged.iter().position(|e| e.name == entry.name) {
            Some(idx) if entry.is_unset() => {
                merged.remove(idx);
            }
            Some(idx) => merged[idx] = entry.clone(),
            None if entry.is_unset() => {}
            None => appended.push(entry.clone()),
        }
    }

    merged.extend(appended);
    merged
}
