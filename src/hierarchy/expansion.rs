use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::tree::TaskTree;

/// The set of currently expanded summary rows.
///
/// Every id starts collapsed; the only transition is [`toggle`], so each
/// id is always in exactly one of {collapsed, expanded}.
///
/// [`toggle`]: ExpansionState::toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Flip the state of `id`. Collapsing removes the whole subtree from
    /// the set, so a later re-expand starts fully collapsed again;
    /// expanding adds only `id` itself.
    ///
    /// Returns true when `id` is expanded afterwards.
    pub fn toggle(&mut self, id: &str, tree: &TaskTree) -> bool {
        if self.expanded.remove(id) {
            for descendant in tree.descendant_ids(id) {
                self.expanded.remove(&descendant);
            }
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Drop ids that no longer exist in the working set. Called after a
    /// snapshot replacement; visibility is unaffected (flatten checks
    /// membership anyway) but the set stays bounded by live data.
    pub(crate) fn retain_known(&mut self, tree: &TaskTree) {
        self.expanded.retain(|id| tree.contains(id));
    }

    /// Fingerprint of the expansion set contents; `BTreeSet` iteration is
    /// already sorted, so equal sets hash equal regardless of history.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for id in &self.expanded {
            id.hash(&mut hasher);
        }
        hasher.finish()
    }
}
