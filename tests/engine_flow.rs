//! End-to-end flow: file-backed snapshot -> hierarchy repair -> rows ->
//! geometry -> interaction, the way an embedding application drives the
//! engine.

use gantt_engine::{
    BarShape, EngineEvent, GanttEngine, JsonTaskSource, TaskFilter, TaskRecord, TaskSource,
    Viewport, ZoomLevel,
};

fn snapshot_json() -> &'static str {
    // Deliberately messy: a duplicate row, a dangling parent, a
    // self-reference, and an out-of-range progress value.
    r#"[
        {"id": "phase-1", "name": "Execution", "start": "2025-03-03", "finish": "2025-03-28", "sortKey": 1},
        {"id": "t-cable", "name": "Cabling", "parentId": "phase-1", "start": "2025-03-03", "finish": "2025-03-14", "progress": 0.5, "sortKey": 1},
        {"id": "t-rack", "name": "Rack install", "parentId": "phase-1", "start": "2025-03-10", "finish": "2025-03-21", "progress": 1.7, "sortKey": 2},
        {"id": "t-rack", "name": "Rack install duplicate", "start": "2025-01-01", "finish": "2025-01-02"},
        {"id": "t-test", "name": "Burn-in test", "parentId": "t-rack", "start": "2025-03-19", "finish": "2025-03-21"},
        {"id": "t-orphan", "name": "Orphaned work", "parentId": "never-loaded", "start": "2025-03-05", "finish": "2025-03-07"},
        {"id": "t-self", "name": "Self-referencing", "parentId": "t-self", "start": "2025-03-24", "finish": "2025-03-26"},
        {"id": "m-done", "name": "Handover", "isMilestone": true, "start": "2025-03-28", "finish": "2025-03-28"}
    ]"#
}

fn engine_with_snapshot() -> GanttEngine {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, snapshot_json()).unwrap();

    let mut engine = GanttEngine::new();
    let loaded = engine
        .load_from(&JsonTaskSource::new(&path), None)
        .unwrap();
    assert_eq!(loaded, 8);
    engine
}

#[test]
fn messy_snapshot_becomes_consistent_rows() {
    let mut engine = engine_with_snapshot();
    // 8 raw rows minus the duplicate.
    assert_eq!(engine.task_count(), 7);

    let rows = engine.get_visible_rows();
    let ids: Vec<&str> = rows.iter().map(|r| r.task.id.as_str()).collect();
    // Only roots are visible initially; the dangling and self-referencing
    // parents were demoted, the duplicate dropped. Keyless roots compare
    // as sort key zero, so they precede the explicitly keyed phase.
    assert_eq!(
        ids,
        ["m-done", "t-orphan", "t-self", "phase-1"],
        "roots in sibling order"
    );
    assert!(rows.iter().all(|r| r.depth == 0));

    let phase = rows.iter().find(|r| r.task.id == "phase-1").unwrap();
    assert!(phase.task.is_summary);
    assert!(phase.has_children);

    // Progress came in as 1.7 and must be clamped.
    engine.toggle_expand("phase-1");
    let rows = engine.get_visible_rows();
    let rack = rows.iter().find(|r| r.task.id == "t-rack").unwrap();
    assert_eq!(rack.task.progress, 1.0);
    assert_eq!(rack.task.name, "Rack install");
}

#[test]
fn expansion_selection_and_focus_work_together() {
    let mut engine = engine_with_snapshot();
    engine.take_events();

    engine.toggle_expand("phase-1");
    engine.toggle_expand("t-rack");
    let ids: Vec<String> = engine
        .get_visible_rows()
        .iter()
        .map(|r| r.task.id.clone())
        .collect();
    assert_eq!(
        ids,
        ["m-done", "t-orphan", "t-self", "phase-1", "t-cable", "t-rack", "t-test"]
    );

    // Collapsing the phase forgets the nested expansion of t-rack.
    engine.toggle_expand("phase-1");
    engine.toggle_expand("phase-1");
    let ids: Vec<String> = engine
        .get_visible_rows()
        .iter()
        .map(|r| r.task.id.clone())
        .collect();
    assert_eq!(
        ids,
        ["m-done", "t-orphan", "t-self", "phase-1", "t-cable", "t-rack"],
        "re-expansion must not remember the grandchild"
    );

    engine.select_task("t-cable");
    assert_eq!(engine.selected_task().unwrap().name, "Cabling");

    let viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };
    let target = engine.focus_task("t-cable", &viewport).unwrap();
    assert!(target.scroll_left >= 0.0 && target.scroll_top >= 0.0);

    let events = engine.take_events();
    assert!(events.contains(&EngineEvent::TaskClicked("t-cable".into())));
}

#[test]
fn geometry_tracks_zoom_changes() {
    let mut engine = engine_with_snapshot();
    engine.set_zoom(ZoomLevel::Day);
    let day = engine.get_timeline_layout();
    // Bounds: Feb 24 .. Apr 4 = 39 days at 30px/day.
    assert_eq!(day.total_width_px, 1170.0);
    assert_eq!(day.header_cells.len(), 39);
    assert!(matches!(
        day.bars.get("m-done"),
        Some(BarShape::Marker { .. })
    ));

    engine.set_zoom(ZoomLevel::Week);
    let week = engine.get_timeline_layout();
    assert_eq!(week.total_width_px, 600.0);
    // Same dates, new scale: bar geometry rescales proportionally.
    let day_bar = match day.bars.get("phase-1").unwrap() {
        BarShape::Bar { left, width } => (*left, *width),
        other => panic!("expected bar, got {:?}", other),
    };
    let week_bar = match week.bars.get("phase-1").unwrap() {
        BarShape::Bar { left, width } => (*left, *width),
        other => panic!("expected bar, got {:?}", other),
    };
    let ratio = week.total_width_px / day.total_width_px;
    assert!((week_bar.0 - day_bar.0 * ratio).abs() < 0.5);
    assert!((week_bar.1 - day_bar.1 * ratio).abs() < 0.5);
}

#[test]
fn project_filter_reaches_the_source() {
    struct RecordingSource;

    impl TaskSource for RecordingSource {
        fn fetch_tasks(
            &self,
            filter: Option<&TaskFilter>,
        ) -> Result<Vec<TaskRecord>, gantt_engine::SourceError> {
            assert_eq!(
                filter.and_then(|f| f.project_id.as_deref()),
                Some("proj-7")
            );
            Ok(vec![TaskRecord {
                id: "only".into(),
                name: "Only task".into(),
                ..Default::default()
            }])
        }
    }

    let mut engine = GanttEngine::new();
    let filter = TaskFilter {
        project_id: Some("proj-7".into()),
    };
    engine.load_from(&RecordingSource, Some(&filter)).unwrap();
    assert_eq!(engine.task_count(), 1);
}
