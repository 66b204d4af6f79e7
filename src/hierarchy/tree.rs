use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::model::Task;

use super::expansion::ExpansionState;

/// One row of a flattened tree: an index into the arena plus its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRow {
    pub index: usize,
    pub depth: usize,
}

/// Arena-style tree over a working set.
///
/// Tasks stay in one flat vector; structure is expressed through per-node
/// child index lists built in a single pass, so construction and flatten
/// are linear in the number of tasks.
///
/// Expects builder output: unresolvable or cyclic parent references are
/// treated as "root" rather than re-repaired here.
#[derive(Debug, Clone)]
pub struct TaskTree {
    tasks: Vec<Task>,
    index_of: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskTree {
    pub fn build(tasks: Vec<Task>) -> Self {
        let index_of: HashMap<String, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut roots: Vec<usize> = Vec::new();
        for (i, task) in tasks.iter().enumerate() {
            match task.parent_id.as_deref().and_then(|p| index_of.get(p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }

        let by_sibling_order = |a: &usize, b: &usize| sibling_order(&tasks[*a], &tasks[*b]);
        roots.sort_by(by_sibling_order);
        for list in &mut children {
            list.sort_by(by_sibling_order);
        }

        Self {
            tasks,
            index_of,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index_of.get(id).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of.contains_key(id)
    }

    pub fn has_children(&self, index: usize) -> bool {
        !self.children[index].is_empty()
    }

    /// Ids of every task strictly below `id`, depth-first.
    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        let Some(&start) = self.index_of.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[start].iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(self.tasks[index].id.clone());
            stack.extend(self.children[index].iter().rev());
        }
        out
    }

    /// Flatten depth-first, parents before children. Roots are always
    /// emitted; a node's children are emitted iff its id is in the
    /// expansion set, so a grandchild is visible only when parent and
    /// grandparent are both expanded.
    pub fn flatten(&self, expanded: &ExpansionState) -> Vec<FlatRow> {
        let mut out = Vec::new();
        let mut stack: Vec<FlatRow> = self
            .roots
            .iter()
            .rev()
            .map(|&index| FlatRow { index, depth: 0 })
            .collect();
        while let Some(row) = stack.pop() {
            out.push(row);
            if expanded.is_expanded(&self.tasks[row.index].id) {
                stack.extend(self.children[row.index].iter().rev().map(|&index| FlatRow {
                    index,
                    depth: row.depth + 1,
                }));
            }
        }
        out
    }

    /// Content fingerprint over ids, parent edges, and sibling inputs.
    /// Changes whenever the working set changes in a way that affects tree
    /// shape or order; combined with the expansion fingerprint it keys the
    /// flatten cache.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        let mut ids: Vec<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        for id in ids {
            id.hash(&mut hasher);
            if let Some(task) = self.get(id) {
                task.parent_id.hash(&mut hasher);
                task.sort_key.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

/// Sibling ordering: ascending `sort_key`, with an absent key comparing
/// as zero, then ascending id. Total and stable, so flatten output is
/// deterministic even for partially keyed sibling sets.
fn sibling_order(a: &Task, b: &Task) -> Ordering {
    a.sort_key
        .unwrap_or(0)
        .cmp(&b.sort_key.unwrap_or(0))
        .then_with(|| a.id.cmp(&b.id))
}
