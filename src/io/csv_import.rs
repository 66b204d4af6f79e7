use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;

use crate::error::SourceError;
use crate::model::{DependencyKind, Phase, TaskRecord};

use super::{TaskFilter, TaskSource};

/// Snapshot source backed by a CSV export.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches column
/// headers flexibly (e.g. "Task Name", "Start Date", "Parent ID"). Rows
/// missing an id or a name are skipped with a warning; everything else is
/// left for the hierarchy builder to repair.
#[derive(Debug, Clone)]
pub struct CsvTaskSource {
    path: PathBuf,
}

/// Canonical columns a header can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    WbsCode,
    Number,
    Name,
    Phase,
    Start,
    Finish,
    Duration,
    Progress,
    Parent,
    SortKey,
    Successor,
    DependencyKind,
    Milestone,
    Project,
}

/// Map a status string to a progress value (0.0 – 1.0).
fn status_to_progress(status: &str) -> Option<f32> {
    match status.trim().to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => Some(1.0),
        "in progress" | "in-progress" | "active" | "started" => Some(0.5),
        "released" | "planned" => Some(0.25),
        "firm planned" | "firm-planned" | "not started" | "not-started" | "new" => Some(0.0),
        _ => None,
    }
}

/// Accept a bare float, a percentage, or a status word.
fn parse_progress(s: &str) -> Option<f32> {
    let s = s.trim();
    if let Some(percent) = s.strip_suffix('%') {
        return percent.trim().parse::<f32>().ok().map(|p| p / 100.0);
    }
    s.parse::<f32>().ok().or_else(|| status_to_progress(s))
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &[
        "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m-%d-%Y",
    ] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn parse_phase(s: &str) -> Option<Phase> {
    match s.trim().to_lowercase().as_str() {
        "initiation" => Some(Phase::Initiation),
        "planning" => Some(Phase::Planning),
        "selection" => Some(Phase::Selection),
        "execution" => Some(Phase::Execution),
        "closure" => Some(Phase::Closure),
        _ => None,
    }
}

fn parse_dependency_kind(s: &str) -> Option<DependencyKind> {
    match s.trim().to_lowercase().as_str() {
        "fs" | "finishtostart" | "finish-to-start" => Some(DependencyKind::FinishToStart),
        "ss" | "starttostart" | "start-to-start" => Some(DependencyKind::StartToStart),
        "ff" | "finishtofinish" | "finish-to-finish" => Some(DependencyKind::FinishToFinish),
        "sf" | "starttofinish" | "start-to-finish" => Some(DependencyKind::StartToFinish),
        _ => None,
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "milestone"
    )
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "taskid" | "uid" | "guid" => Some(Column::Id),

        "wbs" | "wbscode" | "outline" | "outlinenumber" => Some(Column::WbsCode),

        "number" | "no" | "ordinal" => Some(Column::Number),

        "name" | "task" | "taskname" | "label" | "title" | "activity" => Some(Column::Name),

        "phase" | "stagegroup" => Some(Column::Phase),

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Column::Finish)
        }

        "duration" | "durationdays" | "days" => Some(Column::Duration),

        "status" | "state" | "progress" | "percentcomplete" | "stage" => Some(Column::Progress),

        "parent" | "parentid" | "parenttask" | "subtaskof" => Some(Column::Parent),

        "sortkey" | "sort" | "order" | "sequence" => Some(Column::SortKey),

        "successor" | "successorid" | "next" => Some(Column::Successor),

        "dependency" | "dependencykind" | "dependencytype" | "linktype" => {
            Some(Column::DependencyKind)
        }

        "milestone" | "ismilestone" | "type" => Some(Column::Milestone),

        "project" | "projectid" => Some(Column::Project),

        _ => None,
    }
}

impl CsvTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<TaskRecord>, SourceError> {
        // Read the whole file to detect the delimiter from the first line.
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let first_line = content.lines().next().unwrap_or("");
        let delimiter = detect_delimiter(first_line);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let col_map: Vec<Option<Column>> = headers
            .iter()
            .map(|h| header_to_column(&normalize_header(h)))
            .collect();

        let has = |column: Column| col_map.iter().any(|c| *c == Some(column));
        if !has(Column::Id) || !has(Column::Name) {
            let found: Vec<&str> = headers.iter().collect();
            return Err(SourceError::Parse(format!(
                "CSV is missing required columns. Found headers: {:?}. \
                 Need columns for: task id, task name.",
                found
            )));
        }

        let mut records: Vec<TaskRecord> = Vec::new();
        let mut skipped = 0usize;

        for (i, result) in reader.records().enumerate() {
            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(row = i + 2, error = %e, "skipping malformed CSV row");
                    skipped += 1;
                    continue;
                }
            };

            let mut record = TaskRecord::default();
            for (col_idx, field) in row.iter().enumerate() {
                let column = match col_map.get(col_idx).copied().flatten() {
                    Some(column) => column,
                    None => continue,
                };
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }
                match column {
                    Column::Id => record.id = field.to_string(),
                    Column::WbsCode => record.wbs_code = Some(field.to_string()),
                    Column::Number => record.number = Some(field.to_string()),
                    Column::Name => record.name = field.to_string(),
                    Column::Phase => record.phase = parse_phase(field),
                    Column::Start => record.start = parse_date(field),
                    Column::Finish => record.finish = parse_date(field),
                    Column::Duration => record.duration = field.parse().ok(),
                    Column::Progress => record.progress = parse_progress(field),
                    Column::Parent => record.parent_id = Some(field.to_string()),
                    Column::SortKey => record.sort_key = field.parse().ok(),
                    Column::Successor => record.successor_id = Some(field.to_string()),
                    Column::DependencyKind => {
                        record.dependency_kind = parse_dependency_kind(field)
                    }
                    Column::Milestone => record.is_milestone = parse_flag(field),
                    Column::Project => record.project_id = Some(field.to_string()),
                }
            }

            if record.id.is_empty() || record.name.is_empty() {
                warn!(row = i + 2, "skipping CSV row without id or name");
                skipped += 1;
                continue;
            }
            // A row whose start equals its finish is a milestone even
            // without an explicit flag.
            if !record.is_milestone {
                if let (Some(start), Some(finish)) = (record.start, record.finish) {
                    record.is_milestone = start == finish;
                }
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(SourceError::EmptySnapshot { skipped });
        }
        if skipped > 0 {
            warn!(skipped, imported = records.len(), "CSV import skipped rows");
        }
        Ok(records)
    }
}

impl TaskSource for CsvTaskSource {
    fn fetch_tasks(&self, filter: Option<&TaskFilter>) -> Result<Vec<TaskRecord>, SourceError> {
        Ok(super::apply_filter(self.read_records()?, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn imports_semicolon_delimited_rows() {
        let (_dir, path) = write_csv(
            "Task ID;Task Name;Start Date;Finish Date;Status;Parent ID\n\
             a;Fit-out;2025-01-02;2025-01-20;In Progress;\n\
             b;Cabling;05/01/2025;2025-01-12;Finished;a\n",
        );
        let records = CsvTaskSource::new(&path).fetch_tasks(None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].progress, Some(0.5));
        assert_eq!(records[1].parent_id.as_deref(), Some("a"));
        assert_eq!(
            records[1].start,
            Some(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
        );
    }

    #[test]
    fn rows_without_id_or_name_are_skipped() {
        let (_dir, path) = write_csv(
            "ID,Name,Start\n\
             a,Fit-out,2025-01-02\n\
             ,No id,2025-01-03\n\
             c,,2025-01-04\n",
        );
        let records = CsvTaskSource::new(&path).fetch_tasks(None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn equal_dates_infer_a_milestone() {
        let (_dir, path) = write_csv(
            "ID,Name,Start,Finish\n\
             m,Go-live,2025-02-01,2025-02-01\n",
        );
        let records = CsvTaskSource::new(&path).fetch_tasks(None).unwrap();
        assert!(records[0].is_milestone);
    }

    #[test]
    fn percent_and_phase_columns_parse() {
        let (_dir, path) = write_csv(
            "ID,Name,Progress,Phase,Dependency Type,Sort Key\n\
             a,Install,40%,Execution,FS,3\n",
        );
        let records = CsvTaskSource::new(&path).fetch_tasks(None).unwrap();
        assert_eq!(records[0].progress, Some(0.4));
        assert_eq!(records[0].phase, Some(Phase::Execution));
        assert_eq!(
            records[0].dependency_kind,
            Some(DependencyKind::FinishToStart)
        );
        assert_eq!(records[0].sort_key, Some(3));
    }

    #[test]
    fn missing_required_columns_is_an_error() {
        let (_dir, path) = write_csv("Start,Finish\n2025-01-01,2025-01-02\n");
        assert!(matches!(
            CsvTaskSource::new(&path).fetch_tasks(None),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn all_rows_skipped_is_an_empty_snapshot() {
        let (_dir, path) = write_csv("ID,Name\n,\n");
        assert!(matches!(
            CsvTaskSource::new(&path).fetch_tasks(None),
            Err(SourceError::EmptySnapshot { skipped: 1 })
        ));
    }
}
