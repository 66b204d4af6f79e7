use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Phase, Task};

/// Category assignment produced by a grouping strategy for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    /// Display label of the synthesized category row.
    pub label: String,
    pub phase: Option<Phase>,
}

/// Pluggable policy for categorizing tasks in snapshots that carry no
/// hierarchy information at all.
///
/// This is a display convenience, not a correctness mechanism; rows it
/// produces are marked `TaskOrigin::HeuristicGroup`.
pub trait GroupingStrategy {
    /// Return the category this task should be filed under, if any.
    fn assign(&self, task: &Task) -> Option<GroupAssignment>;
}

/// Never groups anything; flat snapshots stay flat.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGrouping;

impl GroupingStrategy for NoGrouping {
    fn assign(&self, _task: &Task) -> Option<GroupAssignment> {
        None
    }
}

/// One name-matching rule: tasks whose name matches `pattern` are filed
/// under a synthesized row labeled `label`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingRule {
    #[serde(with = "regex_serde")]
    pub pattern: Regex,
    pub label: String,
    pub phase: Option<Phase>,
}

/// Groups tasks by matching their names against an ordered rule table.
/// First matching rule wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamePatternGrouping {
    rules: Vec<GroupingRule>,
}

impl NamePatternGrouping {
    pub fn new(rules: Vec<GroupingRule>) -> Self {
        Self { rules }
    }

    /// Load a rule table from a JSON array of `{pattern, label, phase}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rules: Vec<GroupingRule> = serde_json::from_str(json)?;
        Ok(Self { rules })
    }

    /// Built-in rule table matching the common phase vocabulary of
    /// procurement-style project plans.
    pub fn default_rules() -> Self {
        let table = [
            (r"(?i)kick.?off|charter|initiat", "Initiation", Phase::Initiation),
            (r"(?i)plan|design|spec|requirement", "Planning", Phase::Planning),
            (r"(?i)vendor|bid|tender|rfp|select|procure", "Selection", Phase::Selection),
            (r"(?i)install|build|implement|execut|deploy|config", "Execution", Phase::Execution),
            (r"(?i)close.?out|handover|accept|train", "Closure", Phase::Closure),
        ];
        let rules = table
            .iter()
            .filter_map(|(pattern, label, phase)| {
                Regex::new(pattern).ok().map(|pattern| GroupingRule {
                    pattern,
                    label: (*label).to_string(),
                    phase: Some(*phase),
                })
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl GroupingStrategy for NamePatternGrouping {
    fn assign(&self, task: &Task) -> Option<GroupAssignment> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&task.name))
            .map(|rule| GroupAssignment {
                label: rule.label.clone(),
                phase: rule.phase,
            })
    }
}

/// Serde helper for `Regex` (stored as its pattern string).
mod regex_serde {
    use regex::Regex;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(pattern: &Regex, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(pattern.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Regex, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        Regex::new(&pattern).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(name: &str) -> Task {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Task::new(name.to_lowercase(), name, day, day)
    }

    #[test]
    fn first_matching_rule_wins() {
        let grouping = NamePatternGrouping::default_rules();
        let assigned = grouping.assign(&task("Vendor selection workshop")).unwrap();
        assert_eq!(assigned.label, "Selection");
        assert_eq!(assigned.phase, Some(Phase::Selection));
    }

    #[test]
    fn unmatched_name_is_unassigned() {
        let grouping = NamePatternGrouping::default_rules();
        assert!(grouping.assign(&task("Weekly standup")).is_none());
    }

    #[test]
    fn no_grouping_never_assigns() {
        assert!(NoGrouping.assign(&task("Install racks")).is_none());
    }

    #[test]
    fn rule_table_round_trips_through_json() {
        let json = r#"[{"pattern": "(?i)survey", "label": "Site Work", "phase": "Execution"}]"#;
        let grouping = NamePatternGrouping::from_json(json).unwrap();
        let assigned = grouping.assign(&task("Site survey")).unwrap();
        assert_eq!(assigned.label, "Site Work");
        assert_eq!(assigned.phase, Some(Phase::Execution));
    }

    #[test]
    fn invalid_pattern_is_a_parse_error() {
        let json = r#"[{"pattern": "(", "label": "Broken", "phase": null}]"#;
        assert!(NamePatternGrouping::from_json(json).is_err());
    }
}
