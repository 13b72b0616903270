use std::collections::BTreeMap;

use dbdiff_engine::{
    run, CompareOptions, DiffError, KeyMap, KeySpec, Labels, ReportSink, Section, SheetOutcome,
    SkipReason, Table, Value, WorkbookSource,
};

// -------------------------------------------------------------------------
// In-memory workbooks
// -------------------------------------------------------------------------

#[derive(Default)]
struct MemoryWorkbook {
    sheets: BTreeMap<String, Result<Table, String>>,
    reads: Vec<(String, usize)>,
}

impl MemoryWorkbook {
    fn with(mut self, name: &str, table: Table) -> Self {
        self.sheets.insert(name.to_string(), Ok(table));
        self
    }

    fn broken(mut self, name: &str, message: &str) -> Self {
        self.sheets.insert(name.to_string(), Err(message.to_string()));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn read_sheet(&mut self, sheet: &str, skip_rows: usize) -> Result<Table, DiffError> {
        self.reads.push((sheet.to_string(), skip_rows));
        match self.sheets.get(sheet) {
            Some(Ok(t)) => Ok(t.clone()),
            Some(Err(message)) => Err(DiffError::SheetRead {
                sheet: sheet.to_string(),
                message: message.clone(),
            }),
            None => Err(DiffError::SheetRead {
                sheet: sheet.to_string(),
                message: "no such sheet".into(),
            }),
        }
    }
}

struct FailingSink;

impl ReportSink for FailingSink {
    fn write_section(&mut self, _section: &Section) -> Result<(), DiffError> {
        Err(DiffError::Write("disk full".into()))
    }
}

fn items(rows: &[[f64; 2]]) -> Table {
    Table::from_rows(["id", "qty"], rows.iter().copied()).unwrap()
}

fn options(keys: &[(&str, KeySpec)]) -> CompareOptions {
    let mut opts = CompareOptions::new(Labels::new("v1", "v2"));
    opts.keys = KeyMap::new(keys.iter().map(|(k, v)| (k.to_string(), Some(v.clone()))));
    opts
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn items_scenario_reports_single_cell_change() {
    let mut a = MemoryWorkbook::default().with("Items", items(&[[1.0, 5.0], [2.0, 3.0]]));
    let mut b = MemoryWorkbook::default().with("Items", items(&[[1.0, 5.0], [2.0, 4.0]]));
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[("Items", KeySpec::Single("id".into()))]), &mut sections)
        .unwrap();

    assert_eq!(sections.len(), 1);
    let section = &sections[0];
    assert_eq!(section.name, "Items_same");
    assert_eq!(section.table.columns(), ["id", "qty_v1", "qty_v2"]);
    assert_eq!(section.table.get(0, "id"), Some(&Value::number(2.0)));
    assert_eq!(section.table.get(0, "qty_v1"), Some(&Value::number(3.0)));
    assert_eq!(section.table.get(0, "qty_v2"), Some(&Value::number(4.0)));
    assert_eq!(log.sections(), ["Items_same"]);
}

#[test]
fn sheet_only_in_one_workbook_is_listed_not_compared() {
    let t = items(&[[1.0, 5.0]]);
    let mut a = MemoryWorkbook::default().with("Items", t.clone()).with("Extra", t.clone());
    let mut b = MemoryWorkbook::default().with("Items", t);
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[]), &mut sections).unwrap();

    assert_eq!(log.only_left, ["Extra"]);
    assert!(log.only_right.is_empty());
    assert!(sections.is_empty());
    assert!(log.outcome("Extra").is_none());
    assert!(a.reads.iter().all(|(s, _)| s != "Extra"));
}

#[test]
fn doc_sheets_are_excluded() {
    let t = items(&[[1.0, 5.0]]);
    let changed = items(&[[1.0, 6.0]]);
    let mut a = MemoryWorkbook::default().with("(DOC)Notes", t.clone()).with("Items", t.clone());
    let mut b = MemoryWorkbook::default().with("(DOC)Notes", changed).with("Items", t);
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[]), &mut sections).unwrap();

    assert_eq!(log.sheets.len(), 1);
    assert_eq!(log.sheets[0].sheet, "Items");
    assert!(sections.is_empty());
}

#[test]
fn case_insensitive_key_lookup_applies_to_sheet() {
    let mut a = MemoryWorkbook::default().with("orders", items(&[[1.0, 5.0], [2.0, 3.0]]));
    let mut b = MemoryWorkbook::default().with("orders", items(&[[2.0, 3.0], [1.0, 6.0]]));
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[("Orders", KeySpec::Single("id".into()))]), &mut sections)
        .unwrap();

    // Keyed: row order does not matter, only the qty change is reported.
    assert_eq!(log.sheets[0].key, Some(KeySpec::Single("id".into())));
    assert_eq!(sections[0].name, "orders_same");
    assert_eq!(sections[0].table.len(), 1);
    assert_eq!(sections[0].table.get(0, "id"), Some(&Value::number(1.0)));
}

#[test]
fn failing_sheets_do_not_abort_the_run() {
    let mut a = MemoryWorkbook::default()
        .with("Alpha", items(&[[1.0, 5.0]]))
        .broken("Beta", "corrupt region")
        .with("Gamma", items(&[[1.0, 5.0]]));
    let mut b = MemoryWorkbook::default()
        .with("Alpha", Table::from_rows(["qty"], [[5.0]]).unwrap())
        .with("Beta", items(&[[1.0, 5.0]]))
        .with("Gamma", items(&[[1.0, 7.0]]));
    let mut sections: Vec<Section> = Vec::new();
    let opts = options(&[("Alpha", KeySpec::Single("id".into()))]);

    let log = run(&mut a, &mut b, &opts, &mut sections).unwrap();

    assert!(matches!(
        log.outcome("Alpha"),
        Some(SheetOutcome::Skipped { reason: SkipReason::MissingKeyColumns, detail }) if detail == "[id]"
    ));
    assert!(matches!(
        log.outcome("Beta"),
        Some(SheetOutcome::Skipped { reason: SkipReason::ReadError, .. })
    ));
    assert!(matches!(log.outcome("Gamma"), Some(SheetOutcome::Written { .. })));
    assert_eq!(log.skipped(), 2);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].name, "Gamma_same");
}

#[test]
fn alignment_failure_skips_sheet_and_run_continues() {
    let mut a = MemoryWorkbook::default()
        .with("Alpha", items(&[[1.0, 5.0]]))
        .with("Beta", items(&[[1.0, 5.0]]));
    let mut b = MemoryWorkbook::default()
        .with("Alpha", items(&[[1.0, 5.0], [2.0, 3.0]]))
        .with("Beta", items(&[[1.0, 6.0]]));
    let mut sections: Vec<Section> = Vec::new();
    let opts = options(&[("Alpha", KeySpec::Composite(vec!["id".into(), "id".into()]))]);

    let log = run(&mut a, &mut b, &opts, &mut sections).unwrap();

    let alpha = log.outcome("Alpha").unwrap();
    assert!(matches!(
        alpha,
        SheetOutcome::Skipped { reason: SkipReason::AlignmentError, .. }
    ));
    assert!(alpha.to_string().starts_with("! skip (merge error): "));
    assert_eq!(log.skipped(), 1);
    assert!(matches!(log.outcome("Beta"), Some(SheetOutcome::Written { .. })));
    assert_eq!(log.sections(), ["Beta_same"]);
    assert_eq!(sections.len(), 1);
}

#[test]
fn no_shared_columns_without_key_aligns_by_position() {
    let mut a = MemoryWorkbook::default().with("Items", Table::from_rows(["old_a"], [[1.0], [2.0]]).unwrap());
    let mut b = MemoryWorkbook::default()
        .with("Items", Table::from_rows(["new_b"], [[1.0], [2.0], [3.0]]).unwrap());
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[]), &mut sections).unwrap();

    assert_eq!(log.skipped(), 0);
    assert_eq!(sections[0].name, "Items_diff");
    assert_eq!(sections[0].table.len(), 1);
    assert_eq!(sections[0].table.get(0, "Different"), Some(&Value::text("v2 only")));
}

#[test]
fn sheets_are_processed_in_sorted_order_with_skip_rows() {
    let t = items(&[[1.0, 5.0]]);
    let mut a = MemoryWorkbook::default().with("b", t.clone()).with("a", t.clone());
    let mut b = MemoryWorkbook::default().with("a", t.clone()).with("b", t);
    let mut opts = options(&[]);
    opts.skip_rows = 5;
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &opts, &mut sections).unwrap();

    let names: Vec<&str> = log.sheets.iter().map(|s| s.sheet.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(a.reads, [("a".to_string(), 5), ("b".to_string(), 5)]);
    assert!(log
        .sheets
        .iter()
        .all(|s| matches!(s.outcome, SheetOutcome::NoDifferences { .. })));
}

#[test]
fn write_failure_is_fatal() {
    let mut a = MemoryWorkbook::default().with("Items", items(&[[1.0, 5.0]]));
    let mut b = MemoryWorkbook::default().with("Items", items(&[[1.0, 6.0]]));

    let result = run(&mut a, &mut b, &options(&[]), &mut FailingSink);

    assert_eq!(result, Err(DiffError::Write("disk full".into())));
}

#[test]
fn empty_intersection_yields_empty_report() {
    let mut a = MemoryWorkbook::default().with("A", items(&[[1.0, 5.0]]));
    let mut b = MemoryWorkbook::default().with("B", items(&[[1.0, 5.0]]));
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[]), &mut sections).unwrap();

    assert!(log.sheets.is_empty());
    assert!(sections.is_empty());
    assert_eq!(log.only_left, ["A"]);
    assert_eq!(log.only_right, ["B"]);
}

#[test]
fn run_log_serializes_to_json() {
    let mut a = MemoryWorkbook::default().with("Items", items(&[[1.0, 5.0]]));
    let mut b = MemoryWorkbook::default().with("Items", items(&[[1.0, 5.0], [2.0, 1.0]]));
    let mut sections: Vec<Section> = Vec::new();

    let log = run(&mut a, &mut b, &options(&[]), &mut sections).unwrap();
    let json = serde_json::to_value(&log).unwrap();

    assert_eq!(json["labels"]["left"], "v1");
    assert_eq!(json["sheets"][0]["sheet"], "Items");
    assert_eq!(json["sheets"][0]["status"], "written");
    assert_eq!(json["sheets"][0]["shape"], "mismatched");
    assert_eq!(json["sheets"][0]["section"], "Items_diff");
}
