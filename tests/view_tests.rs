use pretty_assertions::assert_eq;

use nltable::state::aggregate::footer_value;
use nltable::state::command::{ColumnChange, Command, ExecContext, FilterRuleChange};
use nltable::state::data_model::{
    CellType, Color, CurrencyType, FilterType, FunctionType, SortDir, TableDocument,
};
use nltable::state::factory::create_table_state;
use nltable::state::view::{derive_view, ViewOptions};

const CTX: ExecContext = ExecContext { now: 2_000 };

fn run(doc: TableDocument, command: Command) -> TableDocument {
    command.execute(&doc, &CTX).unwrap().0
}

/// One column of `cell_type` with one row per value, in order.
fn table_with(cell_type: CellType, values: &[&str]) -> (TableDocument, String, Vec<String>) {
    let mut doc = create_table_state(1, values.len(), cell_type, 1_000);
    let column = doc.model.columns[0].id.clone();
    let rows = doc.model.row_ids_by_index();
    for (row, value) in rows.iter().zip(values) {
        let cell = doc.model.body_cell_at(&column, row).unwrap().id.clone();
        doc = run(doc, Command::set_body_markdown(&cell, row, value));
    }
    (doc, column, rows)
}

fn with_rule(doc: TableDocument, column: &str, filter_type: FilterType, text: &str) -> TableDocument {
    run(doc, Command::add_filter_rule(column, Some(filter_type), text))
}

fn sorted(doc: TableDocument, column: &str, sort_dir: SortDir) -> TableDocument {
    run(
        doc,
        Command::SortUpdate {
            column_id: column.to_string(),
            sort_dir,
        },
    )
}

fn view(doc: &TableDocument) -> Vec<String> {
    derive_view(&doc.model, &ViewOptions::default())
}

fn pick(rows: &[String], positions: &[usize]) -> Vec<String> {
    positions.iter().map(|&i| rows[i].clone()).collect()
}

#[test]
fn test_no_rules_shows_all_rows_in_index_order() {
    let (doc, _, rows) = table_with(CellType::Text, &["b", "a", "c"]);
    assert_eq!(view(&doc), rows);
}

#[test]
fn test_text_filter_types() {
    let (doc, col, rows) = table_with(CellType::Text, &["Apple", "banana", "", "pineapple"]);
    let cases = [
        (FilterType::Is, "apple", vec![0]),
        (FilterType::IsNot, "apple", vec![1, 2, 3]),
        (FilterType::Contains, "APP", vec![0, 3]),
        (FilterType::DoesNotContain, "app", vec![1, 2]),
        (FilterType::StartsWith, "ban", vec![1]),
        (FilterType::EndsWith, "apple", vec![0, 3]),
        (FilterType::IsEmpty, "", vec![2]),
        (FilterType::IsNotEmpty, "", vec![0, 1, 3]),
    ];
    for (filter_type, text, expected) in cases {
        let filtered = with_rule(doc.clone(), &col, filter_type, text);
        assert_eq!(view(&filtered), pick(&rows, &expected), "{filter_type:?} {text:?}");
    }
}

#[test]
fn test_empty_criterion_hides_nothing() {
    let (doc, col, rows) = table_with(CellType::Text, &["x", "y"]);
    let doc = with_rule(doc, &col, FilterType::Is, "");
    assert_eq!(view(&doc), rows);
}

#[test]
fn test_rules_combine_with_and() {
    let (doc, col, rows) = table_with(CellType::Text, &["alpha", "alpine", "beta"]);
    let doc = with_rule(doc, &col, FilterType::StartsWith, "al");
    assert_eq!(view(&doc), pick(&rows, &[0, 1]));
    let doc = with_rule(doc, &col, FilterType::EndsWith, "ne");
    assert_eq!(view(&doc), pick(&rows, &[1]));
}

#[test]
fn test_disabled_rule_is_ignored() {
    let (doc, col, rows) = table_with(CellType::Text, &["a", "b"]);
    let command = Command::add_filter_rule(&col, Some(FilterType::Is), "a");
    let Command::FilterRuleAdd { rule_id, .. } = &command else {
        unreachable!()
    };
    let rule_id = rule_id.clone();
    let doc = run(doc, command);
    assert_eq!(view(&doc), pick(&rows, &[0]));

    let doc = run(doc, Command::update_filter_rule(&rule_id, FilterRuleChange::Toggle));
    assert_eq!(view(&doc), rows);
}

#[test]
fn test_checkbox_filter() {
    let (doc, col, rows) = table_with(CellType::Checkbox, &["[x]", "[ ]", "[x]"]);
    let checked = with_rule(doc.clone(), &col, FilterType::Is, "[x]");
    assert_eq!(view(&checked), pick(&rows, &[0, 2]));
    let unchecked = with_rule(doc, &col, FilterType::IsNot, "[x]");
    assert_eq!(view(&unchecked), pick(&rows, &[1]));
}

#[test]
fn test_tag_filters() {
    let mut doc = create_table_state(1, 3, CellType::MultiTag, 1_000);
    let col = doc.model.columns[0].id.clone();
    let rows = doc.model.row_ids_by_index();
    let cell = |doc: &TableDocument, row: &str| doc.model.body_cell_at(&col, row).unwrap().id.clone();

    let red = Command::add_tag(&cell(&doc, &rows[0]), &col, &rows[0], "red", Color::Red);
    let Command::TagAdd { tag_id: red_id, .. } = &red else {
        unreachable!()
    };
    let red_id = red_id.clone();
    doc = run(doc, red);
    let blue = Command::add_tag(&cell(&doc, &rows[1]), &col, &rows[1], "blue", Color::Blue);
    doc = run(doc, blue);

    let command = Command::add_filter_rule(&col, Some(FilterType::Contains), "");
    let Command::FilterRuleAdd { rule_id, .. } = &command else {
        unreachable!()
    };
    let rule_id = rule_id.clone();
    doc = run(doc, command);
    doc = run(doc, Command::update_filter_rule(&rule_id, FilterRuleChange::TagIds(vec![red_id])));
    assert_eq!(view(&doc), pick(&rows, &[0]));

    doc = run(
        doc,
        Command::update_filter_rule(&rule_id, FilterRuleChange::FilterType(FilterType::DoesNotContain)),
    );
    assert_eq!(view(&doc), pick(&rows, &[1, 2]));

    doc = run(
        doc,
        Command::update_filter_rule(&rule_id, FilterRuleChange::FilterType(FilterType::IsEmpty)),
    );
    assert_eq!(view(&doc), pick(&rows, &[2]));
}

#[test]
fn test_rule_on_number_column_is_ignored() {
    let (doc, col, rows) = table_with(CellType::Number, &["1", "2"]);
    let doc = with_rule(doc, &col, FilterType::Is, "1");
    assert_eq!(view(&doc), rows);
}

#[test]
fn test_search_matches_visible_columns_only() {
    let mut doc = create_table_state(2, 2, CellType::Text, 1_000);
    let (c0, c1) = (doc.model.columns[0].id.clone(), doc.model.columns[1].id.clone());
    let rows = doc.model.row_ids_by_index();
    let cell0 = doc.model.body_cell_at(&c0, &rows[0]).unwrap().id.clone();
    let cell1 = doc.model.body_cell_at(&c1, &rows[1]).unwrap().id.clone();
    doc = run(doc, Command::set_body_markdown(&cell0, &rows[0], "Hello World"));
    doc = run(doc, Command::set_body_markdown(&cell1, &rows[1], "hidden world"));

    let search = ViewOptions::with_search("WORLD");
    assert_eq!(derive_view(&doc.model, &search), rows);

    doc = run(doc, Command::ColumnVisibilityToggle { column_id: c1 });
    assert_eq!(derive_view(&doc.model, &search), pick(&rows, &[0]));
    assert_eq!(derive_view(&doc.model, &ViewOptions::with_search("  ")), rows);
}

#[test]
fn test_sort_text_is_stable() {
    let (doc, col, rows) = table_with(CellType::Text, &["b", "a", "b", "a"]);
    let asc = sorted(doc.clone(), &col, SortDir::Asc);
    assert_eq!(view(&asc), pick(&rows, &[1, 3, 0, 2]));
    let desc = sorted(doc, &col, SortDir::Desc);
    assert_eq!(view(&desc), pick(&rows, &[0, 2, 1, 3]));
}

#[test]
fn test_sort_numbers_numerically_with_empties_last() {
    let (doc, col, rows) = table_with(CellType::Number, &["10", "", "9", "-1"]);
    let asc = sorted(doc.clone(), &col, SortDir::Asc);
    assert_eq!(view(&asc), pick(&rows, &[3, 2, 0, 1]));
    let desc = sorted(doc, &col, SortDir::Desc);
    assert_eq!(view(&desc), pick(&rows, &[0, 2, 3, 1]));
}

#[test]
fn test_sort_does_not_touch_stored_order() {
    let (doc, col, rows) = table_with(CellType::Text, &["z", "y"]);
    let doc = sorted(doc, &col, SortDir::Asc);
    assert_eq!(view(&doc), pick(&rows, &[1, 0]));
    assert_eq!(doc.model.row_ids_by_index(), rows);
}

#[test]
fn test_text_is_compares_whole_value() {
    let (doc, col, rows) = table_with(CellType::Text, &["a", " a", "A"]);
    let is = with_rule(doc.clone(), &col, FilterType::Is, "a");
    assert_eq!(view(&is), pick(&rows, &[0, 2]));
    let is_not = with_rule(doc, &col, FilterType::IsNot, "a");
    assert_eq!(view(&is_not), pick(&rows, &[1]));
}

const DAY: i64 = 86_400_000;

#[test]
fn test_sort_dates_by_time() {
    let mut doc = create_table_state(1, 4, CellType::Date, 1_000);
    let col = doc.model.columns[0].id.clone();
    let rows = doc.model.row_ids_by_index();
    let dates = [Some(3 * DAY), None, Some(DAY), Some(3 * DAY)];
    for (row, date) in rows.iter().zip(dates) {
        let cell = doc.model.body_cell_at(&col, row).unwrap().id.clone();
        doc = run(doc, Command::set_body_date_time(&cell, row, date));
    }

    let asc = sorted(doc.clone(), &col, SortDir::Asc);
    assert_eq!(view(&asc), pick(&rows, &[2, 0, 3, 1]));
    let desc = sorted(doc, &col, SortDir::Desc);
    assert_eq!(view(&desc), pick(&rows, &[0, 3, 2, 1]));
}

#[test]
fn test_sort_last_edited_time() {
    let mut doc = create_table_state(2, 4, CellType::Text, 1_000);
    let (c0, c1) = (doc.model.columns[0].id.clone(), doc.model.columns[1].id.clone());
    let rows = doc.model.row_ids_by_index();
    for (row, now) in [(&rows[0], 5_000), (&rows[1], 3_000), (&rows[3], 5_000)] {
        let cell = doc.model.body_cell_at(&c0, row).unwrap().id.clone();
        let command = Command::set_body_markdown(&cell, row, "edited");
        doc = command.execute(&doc, &ExecContext { now }).unwrap().0;
    }
    doc = run(
        doc,
        Command::ColumnTypeUpdate {
            column_id: c1.clone(),
            cell_type: CellType::LastEditedTime,
        },
    );

    let asc = sorted(doc.clone(), &c1, SortDir::Asc);
    assert_eq!(view(&asc), pick(&rows, &[2, 1, 0, 3]));
    let desc = sorted(doc, &c1, SortDir::Desc);
    assert_eq!(view(&desc), pick(&rows, &[0, 3, 1, 2]));
}

/// A single-tag column where rows 0 and 3 share "beta", row 1 is empty and
/// row 2 holds "alpha". Returns the document, column, rows and the two tag ids.
fn tagged_table() -> (TableDocument, String, Vec<String>, String, String) {
    let mut doc = create_table_state(1, 4, CellType::Tag, 1_000);
    let col = doc.model.columns[0].id.clone();
    let rows = doc.model.row_ids_by_index();
    let cell = |doc: &TableDocument, row: &str| doc.model.body_cell_at(&col, row).unwrap().id.clone();

    let beta = Command::add_tag(&cell(&doc, &rows[0]), &col, &rows[0], "beta", Color::Blue);
    let Command::TagAdd { tag_id: beta_id, .. } = &beta else {
        unreachable!()
    };
    let beta_id = beta_id.clone();
    doc = run(doc, beta);
    let alpha = Command::add_tag(&cell(&doc, &rows[2]), &col, &rows[2], "alpha", Color::Red);
    let Command::TagAdd { tag_id: alpha_id, .. } = &alpha else {
        unreachable!()
    };
    let alpha_id = alpha_id.clone();
    doc = run(doc, alpha);
    let cell_id = cell(&doc, &rows[3]);
    doc = run(
        doc,
        Command::TagCellAdd {
            cell_id,
            row_id: rows[3].clone(),
            tag_id: beta_id.clone(),
        },
    );
    (doc, col, rows, alpha_id, beta_id)
}

#[test]
fn test_sort_tags_by_label() {
    let (doc, col, rows, _, _) = tagged_table();
    let asc = sorted(doc.clone(), &col, SortDir::Asc);
    assert_eq!(view(&asc), pick(&rows, &[2, 0, 3, 1]));
    let desc = sorted(doc, &col, SortDir::Desc);
    assert_eq!(view(&desc), pick(&rows, &[0, 3, 2, 1]));
}

#[test]
fn test_single_tag_is_and_is_not() {
    let (doc, col, rows, alpha, beta) = tagged_table();
    let command = Command::add_filter_rule(&col, Some(FilterType::Is), "");
    let Command::FilterRuleAdd { rule_id, .. } = &command else {
        unreachable!()
    };
    let rule_id = rule_id.clone();
    let doc = run(doc, command);
    let doc = run(doc, Command::update_filter_rule(&rule_id, FilterRuleChange::TagIds(vec![beta.clone()])));
    assert_eq!(view(&doc), pick(&rows, &[0, 3]));

    let doc = run(
        doc,
        Command::update_filter_rule(&rule_id, FilterRuleChange::FilterType(FilterType::IsNot)),
    );
    assert_eq!(view(&doc), pick(&rows, &[1, 2]));

    let doc = run(
        doc,
        Command::update_filter_rule(&rule_id, FilterRuleChange::FilterType(FilterType::Is)),
    );
    let doc = run(doc, Command::update_filter_rule(&rule_id, FilterRuleChange::TagIds(vec![alpha, beta])));
    assert_eq!(view(&doc), pick(&rows, &[0, 2, 3]));
}

fn with_function(doc: TableDocument, col: &str, function: FunctionType) -> TableDocument {
    run(
        doc,
        Command::ColumnUpdate {
            column_id: col.to_string(),
            change: ColumnChange::FunctionType(function),
        },
    )
}

#[test]
fn test_numeric_footer_functions() {
    let (doc, col, rows) = table_with(CellType::Number, &["4", "1", "", "7", "2"]);
    let cases = [
        (FunctionType::Sum, "14"),
        (FunctionType::Avg, "3.5"),
        (FunctionType::Min, "1"),
        (FunctionType::Max, "7"),
        (FunctionType::Median, "3"),
        (FunctionType::Range, "6"),
        (FunctionType::CountAll, "5"),
        (FunctionType::CountEmpty, "1"),
        (FunctionType::CountNotEmpty, "4"),
        (FunctionType::PercentEmpty, "20%"),
        (FunctionType::PercentNotEmpty, "80%"),
    ];
    for (function, expected) in cases {
        let doc = with_function(doc.clone(), &col, function);
        let value = footer_value(&doc.model, &col, &rows).unwrap();
        assert_eq!(value.as_deref(), Some(expected), "{function:?}");
    }
}

#[test]
fn test_footer_none_and_no_numbers() {
    let (doc, col, rows) = table_with(CellType::Number, &["", ""]);
    assert_eq!(footer_value(&doc.model, &col, &rows).unwrap(), None);
    let doc = with_function(doc, &col, FunctionType::Sum);
    assert_eq!(footer_value(&doc.model, &col, &rows).unwrap(), None);
}

#[test]
fn test_footer_count_unique_text() {
    let (doc, col, rows) = table_with(CellType::Text, &["a", "b", "a", ""]);
    let doc = with_function(doc, &col, FunctionType::CountUnique);
    assert_eq!(footer_value(&doc.model, &col, &rows).unwrap().as_deref(), Some("2"));
    let doc = with_function(doc, &col, FunctionType::CountValues);
    assert_eq!(footer_value(&doc.model, &col, &rows).unwrap().as_deref(), Some("3"));
}

#[test]
fn test_footer_currency_sum_is_formatted() {
    let (doc, col, rows) = table_with(CellType::Currency, &["1000", "234.5"]);
    let doc = run(
        doc,
        Command::ColumnUpdate {
            column_id: col.clone(),
            change: ColumnChange::CurrencyType(CurrencyType::Europe),
        },
    );
    let doc = with_function(doc, &col, FunctionType::Sum);
    assert_eq!(
        footer_value(&doc.model, &col, &rows).unwrap().as_deref(),
        Some("€1,234.50")
    );
}

#[test]
fn test_numeric_function_rejected_on_text_column() {
    let (doc, col, _) = table_with(CellType::Text, &["1"]);
    let doc = with_function(doc, &col, FunctionType::Sum);
    assert_eq!(doc.model.columns[0].function_type, FunctionType::None);
}
