use servora_core::AppResult;
use servora_domain::{BaselineSet, NodeId, OverrideMap};

use super::PermissionState;
use crate::ServiceTree;

/// User exceptions under edit, layered over the user's job baseline.
///
/// Overrides are stored as deltas only: an entry that would equal the
/// inherited job value is removed instead of written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionState {
    job_baseline: BaselineSet,
    overrides: OverrideMap,
}

impl ExceptionState {
    /// Creates the state from the job baseline and the loaded overrides.
    #[must_use]
    pub fn new(job_baseline: BaselineSet, overrides: OverrideMap) -> Self {
        Self {
            job_baseline,
            overrides,
        }
    }

    /// Returns the inherited job baseline.
    #[must_use]
    pub fn job_baseline(&self) -> &BaselineSet {
        &self.job_baseline
    }

    /// Returns the explicit overrides.
    #[must_use]
    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Drops every override equal to its inherited value.
    ///
    /// Loaded data may predate a baseline change; mutations never produce
    /// such entries.
    pub fn collapse_redundant(&mut self) {
        let redundant = self
            .overrides
            .iter()
            .filter(|(node, is_allowed)| *is_allowed == self.job_baseline.contains(*node))
            .map(|(node, _)| node)
            .collect::<Vec<_>>();

        for node in redundant {
            self.overrides.remove(node);
        }
    }

    fn force(&mut self, node: NodeId, value: bool) {
        if value == self.job_baseline.contains(node) {
            self.overrides.remove(node);
        } else {
            self.overrides.set(node, value);
        }
    }
}

impl PermissionState for ExceptionState {
    fn effective(&self, node: NodeId) -> bool {
        crate::permission_resolver::effective(node, &self.job_baseline, Some(&self.overrides))
    }

    fn toggle(&mut self, tree: &ServiceTree, node: NodeId, value: bool) -> AppResult<()> {
        tree.require(node)?;

        self.force(node, value);
        for descendant in tree.descendants(node) {
            self.force(descendant.id(), value);
        }

        Ok(())
    }

    fn restore_from(&mut self, snapshot: &Self, node: NodeId) {
        match snapshot.overrides.get(node) {
            Some(is_allowed) => self.overrides.set(node, is_allowed),
            None => {
                self.overrides.remove(node);
            }
        }
    }

    fn differs_from(&self, snapshot: &Self, node: NodeId) -> bool {
        self.overrides.get(node) != snapshot.overrides.get(node)
    }
}
