pub mod builder;
pub mod expansion;
pub mod grouping;
pub mod tree;

pub use builder::{HierarchyBuilder, RepairMode};
pub use expansion::ExpansionState;
pub use grouping::{GroupAssignment, GroupingRule, GroupingStrategy, NamePatternGrouping, NoGrouping};
pub use tree::{FlatRow, TaskTree};
