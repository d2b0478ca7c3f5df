use servora_domain::{BaselineSet, KindRef, OverrideMap, OverrideRow};

/// Row-level delta between two override maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideDiff {
    /// Rows to write.
    pub inserts: Vec<OverrideRow>,
    /// Rows to remove; applied before inserts.
    pub deletes: Vec<OverrideRow>,
}

impl OverrideDiff {
    /// Returns whether the diff carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }

    /// Replays the diff on top of `snapshot`.
    #[must_use]
    pub fn apply_to(&self, snapshot: &OverrideMap) -> OverrideMap {
        let mut result = snapshot.clone();
        for row in &self.deletes {
            result.remove(row.node);
        }
        for row in &self.inserts {
            result.set(row.node, row.is_allowed);
        }

        result
    }
}

/// Builds the full-replace payload for a job baseline, ordered by node id.
#[must_use]
pub fn baseline_rows(baseline: &BaselineSet) -> Vec<KindRef> {
    baseline.sorted().into_iter().map(KindRef::from).collect()
}

/// Computes the rows needed to turn `snapshot` into `current`.
///
/// Snapshot entries that only repeat the job value are not deleted when they
/// disappear from `current`: nothing was stored for them as an exception.
#[must_use]
pub fn diff_overrides(
    snapshot: &OverrideMap,
    current: &OverrideMap,
    job_baseline: &BaselineSet,
) -> OverrideDiff {
    let mut diff = OverrideDiff::default();

    for row in current.to_rows() {
        match snapshot.get(row.node) {
            None => {
                if row.is_allowed != job_baseline.contains(row.node) {
                    diff.inserts.push(row);
                }
            }
            Some(previous) if previous != row.is_allowed => {
                diff.deletes.push(OverrideRow {
                    node: row.node,
                    is_allowed: previous,
                });
                diff.inserts.push(row);
            }
            Some(_) => {}
        }
    }

    for row in snapshot.to_rows() {
        if current.get(row.node).is_none() && row.is_allowed != job_baseline.contains(row.node) {
            diff.deletes.push(row);
        }
    }

    diff.deletes.sort_by_key(|row| row.node);
    diff
}

/// Computes the rows that make the stored exceptions equal `desired`.
///
/// Unlike [`diff_overrides`], stored rows that only repeat the job value are
/// deleted too: they are inert today but would turn into live exceptions once
/// the job baseline changes. `desired` must not hold such entries itself.
#[must_use]
pub fn reconcile_overrides(
    stored: &OverrideMap,
    desired: &OverrideMap,
    job_baseline: &BaselineSet,
) -> OverrideDiff {
    let mut minimal = stored.clone();
    let mut stale = Vec::new();
    for row in stored.to_rows() {
        if row.is_allowed == job_baseline.contains(row.node) {
            minimal.remove(row.node);
            stale.push(row);
        }
    }

    let mut diff = diff_overrides(&minimal, desired, job_baseline);
    diff.deletes.extend(stale);
    diff.deletes.sort_by_key(|row| row.node);
    diff
}
