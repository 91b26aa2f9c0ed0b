use std::collections::{HashMap, HashSet};

use crate::foundation::core::ElementId;
use crate::foundation::error::MotionError;

type Key = (ElementId, String);

/// Rate-limited warnings for problems that recur every frame.
///
/// Unknown behavior ids are reported once per (element, id). Compute failures are reported
/// on the first occurrence and then once every `report_every` further failures.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    report_every: u64,
    unknown: HashSet<Key>,
    failures: HashMap<Key, u64>,
}

impl DiagnosticLog {
    /// `report_every == 0` reports only the first failure of each assignment.
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every,
            unknown: HashSet::new(),
            failures: HashMap::new(),
        }
    }

    /// Record an assignment naming an id no registry knows. Returns `true` when logged.
    pub fn unknown_behavior(&mut self, element: &ElementId, behavior_id: &str) -> bool {
        let fresh = self
            .unknown
            .insert((element.clone(), behavior_id.to_owned()));
        if fresh {
            tracing::warn!(%element, behavior = behavior_id, "unknown behavior id, skipping");
        }
        fresh
    }

    /// Record a failed compute call. Returns `true` when logged.
    pub fn compute_failure(
        &mut self,
        element: &ElementId,
        behavior_id: &str,
        err: &MotionError,
    ) -> bool {
        let count = self
            .failures
            .entry((element.clone(), behavior_id.to_owned()))
            .or_insert(0);
        *count += 1;
        let n = *count;

        let report = n == 1 || (self.report_every > 0 && (n - 1) % self.report_every == 0);
        if report {
            tracing::warn!(
                %element,
                behavior = behavior_id,
                failures = n,
                error = %err,
                "behavior compute failed, output dropped"
            );
        }
        report
    }

    /// Number of compute failures recorded for one assignment.
    pub fn failure_count(&self, element: &ElementId, behavior_id: &str) -> u64 {
        self.failures
            .get(&(element.clone(), behavior_id.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Drop all state about a detached element.
    pub fn forget_element(&mut self, element: &ElementId) {
        self.unknown.retain(|(e, _)| e != element);
        self.failures.retain(|(e, _), _| e != element);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostics.rs"]
mod tests;
