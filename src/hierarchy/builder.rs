use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Duration;
use tracing::{debug, warn};

use crate::model::task::placeholder_epoch;
use crate::model::{Task, TaskOrigin, TaskRecord};

use super::grouping::{GroupAssignment, GroupingStrategy, NamePatternGrouping};

/// How dangling `parent_id` references are repaired.
///
/// The two modes are mutually exclusive strategies for the same ambiguity.
/// `DemoteToRoot` is the default: it never fabricates data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepairMode {
    /// Clear the dangling reference and keep the task as a root.
    #[default]
    DemoteToRoot,
    /// Create a placeholder summary task for each missing parent id.
    SynthesizeParents,
}

/// Spacing between placeholder windows handed to dateless records.
const PLACEHOLDER_STRIDE_DAYS: i64 = 7;

/// Turns a raw, possibly inconsistent batch of records into a working set
/// where ids are unique, every `parent_id` resolves, no task parents
/// itself, the tree is acyclic, and `is_summary` is consistent.
///
/// `build` never fails; every data-shape problem is repaired locally and
/// logged.
pub struct HierarchyBuilder {
    mode: RepairMode,
    grouping: Box<dyn GroupingStrategy>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self {
            mode: RepairMode::default(),
            grouping: Box::new(NamePatternGrouping::default_rules()),
        }
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: RepairMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Swap in a different grouping policy for flat snapshots.
    pub fn grouping(mut self, strategy: Box<dyn GroupingStrategy>) -> Self {
        self.grouping = strategy;
        self
    }

    pub fn mode(&self) -> RepairMode {
        self.mode
    }

    /// Build the working set. See the type docs for the guarantees.
    pub fn build(&self, records: &[TaskRecord]) -> Vec<Task> {
        let mut tasks = self.dedupe_and_normalize(records);
        self.repair_dangling_parents(&mut tasks);
        if tasks.iter().all(|t| t.parent_id.is_none()) {
            self.apply_name_grouping(&mut tasks);
        }
        break_cycles(&mut tasks);
        recompute_summary_flags(&mut tasks);
        debug!(task_count = tasks.len(), "working set built");
        tasks
    }

    /// Steps 1–3: drop duplicates and empty ids, strip self-references,
    /// normalize dates/duration/progress.
    fn dedupe_and_normalize(&self, records: &[TaskRecord]) -> Vec<Task> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        let mut tasks: Vec<Task> = Vec::with_capacity(records.len());
        let mut dateless: i64 = 0;

        for record in records {
            if record.id.is_empty() {
                warn!(name = %record.name, "task record without id dropped");
                continue;
            }
            if !seen.insert(record.id.as_str()) {
                warn!(task_id = %record.id, "duplicate task record dropped");
                continue;
            }
            let anchor =
                placeholder_epoch() + Duration::days(dateless * PLACEHOLDER_STRIDE_DAYS);
            if record.start.is_none() && record.finish.is_none() {
                dateless += 1;
            }
            let mut task = record.normalize(anchor);
            if task.parent_id.as_deref() == Some(task.id.as_str()) {
                warn!(task_id = %task.id, "self-referential parent cleared");
                task.parent_id = None;
            }
            tasks.push(task);
        }
        tasks
    }

    /// Step 4: resolve parent references to ids missing from the set.
    fn repair_dangling_parents(&self, tasks: &mut Vec<Task>) {
        let existing: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();
        // BTreeSet keeps synthesis order deterministic.
        let missing: BTreeSet<String> = tasks
            .iter()
            .filter_map(|t| t.parent_id.clone())
            .filter(|p| !existing.contains(p))
            .collect();
        if missing.is_empty() {
            return;
        }

        match self.mode {
            RepairMode::DemoteToRoot => {
                for task in tasks.iter_mut() {
                    if let Some(parent) = &task.parent_id {
                        if missing.contains(parent) {
                            warn!(task_id = %task.id, parent_id = %parent, "dangling parent cleared, task demoted to root");
                            task.parent_id = None;
                        }
                    }
                }
            }
            RepairMode::SynthesizeParents => {
                for parent_id in missing {
                    let parent = synthesize_parent(&parent_id, tasks);
                    warn!(parent_id = %parent.id, "missing parent synthesized");
                    tasks.push(parent);
                }
            }
        }
    }

    /// Step 5: snapshots with no hierarchy at all get heuristic category
    /// rows from the configured grouping strategy.
    fn apply_name_grouping(&self, tasks: &mut Vec<Task>) {
        // Assignment order decides group order; first match claims the label.
        let mut labels: Vec<(String, GroupAssignment)> = Vec::new();
        let mut members: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, task) in tasks.iter().enumerate() {
            if let Some(assignment) = self.grouping.assign(task) {
                if !members.contains_key(&assignment.label) {
                    labels.push((assignment.label.clone(), assignment.clone()));
                }
                members.entry(assignment.label).or_default().push(i);
            }
        }
        if labels.is_empty() {
            return;
        }

        for (label, assignment) in labels {
            let indices = match members.get(&label) {
                Some(indices) => indices.clone(),
                None => continue,
            };
            let group_id = format!("group:{}", slug(&label));
            let group = {
                let children: Vec<&Task> = indices.iter().map(|&i| &tasks[i]).collect();
                let mut group = aggregate_group(&group_id, &label, &children);
                group.phase = assignment.phase;
                group.origin = TaskOrigin::HeuristicGroup;
                group
            };
            for i in indices {
                tasks[i].parent_id = Some(group_id.clone());
            }
            tasks.push(group);
        }
        warn!("no hierarchy in snapshot, applied heuristic name grouping");
    }
}

/// Placeholder summary for a referenced-but-missing parent id. Always a
/// root; dates span the children, progress is their unweighted mean.
fn synthesize_parent(parent_id: &str, tasks: &[Task]) -> Task {
    let children: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.parent_id.as_deref() == Some(parent_id))
        .collect();
    let name = children
        .first()
        .and_then(|child| infer_group_name(&child.name))
        .unwrap_or_else(|| format!("Group {}", parent_id));
    let mut parent = aggregate_group(parent_id, &name, &children);
    parent.phase = children.first().and_then(|c| c.phase);
    parent.origin = TaskOrigin::SynthesizedParent;
    parent
}

/// Best-effort name for a synthesized parent: the shared prefix before a
/// " - " or ": " separator in the first child's name.
fn infer_group_name(child_name: &str) -> Option<String> {
    for separator in [" - ", ": "] {
        if let Some((prefix, _)) = child_name.split_once(separator) {
            let prefix = prefix.trim();
            if !prefix.is_empty() {
                return Some(prefix.to_string());
            }
        }
    }
    None
}

/// Summary row spanning the given children. Falls back to the placeholder
/// window when there are none.
fn aggregate_group(id: &str, name: &str, children: &[&Task]) -> Task {
    let start = children.iter().map(|c| c.start).min();
    let finish = children.iter().map(|c| c.finish.max(c.start)).max();
    let (start, finish) = match (start, finish) {
        (Some(s), Some(f)) => (s, f),
        _ => (
            placeholder_epoch(),
            placeholder_epoch() + Duration::days(PLACEHOLDER_STRIDE_DAYS),
        ),
    };
    let mut group = Task::new(id, name, start, finish);
    if !children.is_empty() {
        group.progress = children.iter().map(|c| c.progress).sum::<f32>() / children.len() as f32;
    }
    group.is_summary = true;
    group
}

/// Step 6: ancestor-chain guard. Any parent edge that closes a cycle is
/// dropped and the task demoted to root.
fn break_cycles(tasks: &mut [Task]) {
    let index: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();

    for i in 0..tasks.len() {
        let mut visited: HashSet<usize> = HashSet::from([i]);
        let mut current = i;
        loop {
            let parent = match tasks[current].parent_id.as_deref().and_then(|p| index.get(p)) {
                Some(&parent) => parent,
                None => break,
            };
            if !visited.insert(parent) {
                warn!(task_id = %tasks[current].id, "parent edge closes a cycle, dropped");
                tasks[current].parent_id = None;
                break;
            }
            current = parent;
        }
    }
}

/// Step 7: `is_summary` means "has at least one child", nothing else.
fn recompute_summary_flags(tasks: &mut [Task]) {
    let parents: HashSet<String> = tasks.iter().filter_map(|t| t.parent_id.clone()).collect();
    for task in tasks.iter_mut() {
        task.is_summary = parents.contains(&task.id);
    }
}

fn slug(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
