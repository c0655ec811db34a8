//! Status aggregation: per-index pod phases into counts and range strings,
//! plus condition bookkeeping on a run's status.

use crate::api::{
    Condition, ConditionType, DAEMON_EXECUTION_MODE, EXECUTION_MODE_ENV, JobRun, JobRunStatus,
    PodPhase,
};
use crate::range::{self, IndexSet};

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Observed phase per work-item index.
pub type Observations = BTreeMap<u32, PodPhase>;

fn join_ranges(ranges: range::Ranges) -> String {
    ranges.map(|r| r.to_string()).collect::<Vec<_>>().join(",")
}

/// Store `value` unless it is empty or already stored. Returns whether it changed.
fn set_if_changed(slot: &mut Option<String>, value: String) -> bool {
    if value.is_empty() || slot.as_deref() == Some(value.as_str()) {
        return false;
    }
    *slot = Some(value);
    true
}

impl JobRun {
    /// Whether the sole container runs in non-indexed daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.spec
            .job_spec
            .container()
            .and_then(|c| c.env_value(EXECUTION_MODE_ENV))
            == Some(DAEMON_EXECUTION_MODE)
    }

    /// Tally phases; indices requested but not yet observed count as `requested`.
    pub fn update_status_counts(&mut self, total: i64, observations: &Observations) {
        let status = &mut self.status;
        status.unknown = 0;
        status.pending = 0;
        status.running = 0;
        status.succeeded = 0;
        status.failed = 0;

        for phase in observations.values() {
            match phase {
                PodPhase::Unknown => status.unknown += 1,
                PodPhase::Pending => status.pending += 1,
                PodPhase::Running => status.running += 1,
                PodPhase::Succeeded => status.succeeded += 1,
                PodPhase::Failed => status.failed += 1,
            }
        }

        let observed = i64::try_from(observations.len()).unwrap_or(i64::MAX);
        status.requested = total.saturating_sub(observed);
    }

    pub fn update_succeeded_indices(&mut self, observations: &Observations) -> bool {
        let succeeded = join_ranges(range::encode_matching(observations, |p| {
            *p == PodPhase::Succeeded
        }));
        set_if_changed(&mut self.status.succeeded_indices, succeeded)
    }

    /// Every observed index not in `Succeeded` counts as failed. Skipped
    /// before anything is observed and for daemon-mode runs.
    pub fn update_failed_indices(&mut self, observations: &Observations) -> bool {
        if observations.is_empty() || self.is_daemon_mode() {
            return false;
        }
        let failed = join_ranges(range::encode_matching(observations, |p| {
            *p != PodPhase::Succeeded
        }));
        set_if_changed(&mut self.status.failed_indices, failed)
    }

    /// Counts plus both range strings in one pass.
    pub fn aggregate_status(&mut self, total: i64, observations: &Observations) {
        self.update_status_counts(total, observations);
        self.update_succeeded_indices(observations);
        self.update_failed_indices(observations);
    }

    pub fn succeeded_indices(&self) -> IndexSet {
        read_indices(self.status.succeeded_indices.as_deref())
    }

    pub fn failed_indices(&self) -> IndexSet {
        read_indices(self.status.failed_indices.as_deref())
    }

    pub fn has_condition(&self, kind: ConditionType) -> bool {
        self.status.condition(kind).is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.has_condition(ConditionType::Complete) || self.has_condition(ConditionType::Failed)
    }
}

fn read_indices(stored: Option<&str>) -> IndexSet {
    match stored {
        Some(expr) if !expr.is_empty() => range::decode(expr).unwrap_or_default(),
        _ => IndexSet::new(),
    }
}

impl JobRunStatus {
    pub fn condition(&self, kind: ConditionType) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    pub fn latest_condition(&self) -> Option<&Condition> {
        self.conditions.last()
    }

    /// Replace any condition of the same type with `condition`, stamped `now`.
    ///
    /// A condition matching the stored one apart from timestamps is a no-op
    /// and keeps the stored timestamps. Returns whether anything changed.
    pub fn add_condition(&mut self, mut condition: Condition, now: DateTime<Utc>) -> bool {
        if self
            .condition(condition.kind)
            .is_some_and(|existing| existing.same_state(&condition))
        {
            return false;
        }

        self.conditions.retain(|c| c.kind != condition.kind);
        condition.last_probe_time = Some(now);
        condition.last_transition_time = Some(now);
        self.conditions.push(condition);
        true
    }
}
