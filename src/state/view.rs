//! Filtered, searched and sorted projection of the body rows.
//!
//! Recomputed from the model on every call; stored row order is never touched.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::state::cell_content::CellValue;
use crate::state::coerce::is_filterable;
use crate::state::data_model::{
    is_checked, BodyCell, BodyRow, CellType, Column, FilterRule, FilterType, SortDir, TableModel,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Case-insensitive substring matched against visible columns.
    pub search: String,
}

impl ViewOptions {
    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
        }
    }
}

/// Row ids to display, in display order.
pub fn derive_view(model: &TableModel, options: &ViewOptions) -> Vec<String> {
    let mut rows: Vec<&BodyRow> = model
        .body_rows
        .iter()
        .filter(|row| row_matches_rules(model, row))
        .filter(|row| row_matches_search(model, row, &options.search))
        .collect();

    match model.columns.iter().find(|c| c.sort_dir != SortDir::None) {
        Some(column) => {
            let desc = column.sort_dir == SortDir::Desc;
            rows.sort_by(|a, b| compare_rows(model, column, a, b, desc).then(a.index.cmp(&b.index)));
        }
        None => rows.sort_by_key(|row| row.index),
    }

    rows.into_iter().map(|row| row.id.clone()).collect()
}

fn cell_for<'a>(model: &'a TableModel, column_id: &str, row_id: &str) -> Option<&'a BodyCell> {
    model
        .body_cells
        .iter()
        .find(|c| c.column_id == column_id && c.row_id == row_id)
}

/// A row is visible iff it satisfies every enabled rule on a filterable column.
pub fn row_matches_rules(model: &TableModel, row: &BodyRow) -> bool {
    model
        .filter_rules
        .iter()
        .filter(|rule| rule.is_enabled)
        .all(|rule| {
            let Ok(column) = model.column(&rule.column_id) else {
                return true;
            };
            if !is_filterable(column.cell_type) {
                return true;
            }
            match cell_for(model, &column.id, &row.id) {
                Some(cell) => rule_matches_cell(rule, column, cell),
                None => true,
            }
        })
}

/// Evaluates one rule against one cell.
pub fn rule_matches_cell(rule: &FilterRule, column: &Column, cell: &BodyCell) -> bool {
    match column.cell_type {
        CellType::Text | CellType::File => text_matches(rule, &cell.markdown),
        CellType::Tag => tag_matches(rule, &cell.tag_ids, false),
        CellType::MultiTag => tag_matches(rule, &cell.tag_ids, true),
        CellType::Checkbox => checkbox_matches(rule, &cell.markdown),
        _ => true,
    }
}

fn text_matches(rule: &FilterRule, markdown: &str) -> bool {
    let value = markdown.trim().to_lowercase();
    let needle = rule.text.trim().to_lowercase();
    // Is and IsNot compare the whole untrimmed text.
    let exact = || markdown.to_lowercase() == rule.text.to_lowercase();
    match rule.filter_type {
        FilterType::IsEmpty => value.is_empty(),
        FilterType::IsNotEmpty => !value.is_empty(),
        // An unfinished rule does not hide anything.
        _ if needle.is_empty() => true,
        FilterType::Is => exact(),
        FilterType::IsNot => !exact(),
        FilterType::Contains => value.contains(&needle),
        FilterType::DoesNotContain => !value.contains(&needle),
        FilterType::StartsWith => value.starts_with(&needle),
        FilterType::EndsWith => value.ends_with(&needle),
    }
}

fn tag_matches(rule: &FilterRule, tag_ids: &[String], is_multi_tag: bool) -> bool {
    let cell: BTreeSet<&str> = tag_ids.iter().map(String::as_str).collect();
    let wanted: BTreeSet<&str> = rule.tag_ids.iter().map(String::as_str).collect();
    let intersects = !cell.is_disjoint(&wanted);
    // A single-tag cell "is" any of the selected tags.
    let is = if is_multi_tag { cell == wanted } else { intersects };

    match rule.filter_type {
        FilterType::IsEmpty => cell.is_empty(),
        FilterType::IsNotEmpty => !cell.is_empty(),
        _ if wanted.is_empty() => true,
        FilterType::Is => is,
        FilterType::IsNot => !is,
        FilterType::Contains => intersects,
        FilterType::DoesNotContain => !intersects,
        FilterType::StartsWith | FilterType::EndsWith => true,
    }
}

fn checkbox_matches(rule: &FilterRule, markdown: &str) -> bool {
    if rule.text.trim().is_empty() {
        return true;
    }
    let wanted = is_checked(&rule.text);
    match rule.filter_type {
        FilterType::Is => is_checked(markdown) == wanted,
        FilterType::IsNot => is_checked(markdown) != wanted,
        _ => true,
    }
}

fn row_matches_search(model: &TableModel, row: &BodyRow, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    model.columns.iter().filter(|c| c.is_visible).any(|column| {
        cell_for(model, &column.id, &row.id)
            .map(|cell| {
                CellValue::from_cell(column, row, cell)
                    .display_content()
                    .to_lowercase()
                    .contains(&needle)
            })
            .unwrap_or(false)
    })
}

/// Compares two rows on `column`. Filled values are ordered by `desc`;
/// empty values always sort after filled ones.
fn compare_rows(model: &TableModel, column: &Column, a: &BodyRow, b: &BodyRow, desc: bool) -> Ordering {
    let value = |row: &BodyRow| {
        cell_for(model, &column.id, &row.id).map(|cell| CellValue::from_cell(column, row, cell))
    };
    match (value(a), value(b)) {
        (Some(left), Some(right)) => compare_values(&left, &right, desc),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_options<T>(left: Option<T>, right: Option<T>, desc: bool, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) if desc => cmp(a, b).reverse(),
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn compare_values(left: &CellValue, right: &CellValue, desc: bool) -> Ordering {
    match (left, right) {
        (CellValue::Text(a), CellValue::Text(b)) | (CellValue::File(a), CellValue::File(b)) => {
            compare_options(non_empty(a), non_empty(b), desc, |a, b| a.cmp(&b))
        }
        (CellValue::Date { time: a, .. }, CellValue::Date { time: b, .. }) => {
            compare_options(*a, *b, desc, |a, b| a.cmp(&b))
        }
        (CellValue::Time { time: a, .. }, CellValue::Time { time: b, .. }) => {
            compare_options(Some(a), Some(b), desc, |a, b| a.cmp(b))
        }
        (CellValue::Checkbox(a), CellValue::Checkbox(b)) => {
            compare_options(Some(a), Some(b), desc, |a, b| a.cmp(b))
        }
        (CellValue::Tags(_), CellValue::Tags(_)) => compare_options(
            non_empty(&left.display_content()),
            non_empty(&right.display_content()),
            desc,
            |a, b| a.cmp(&b),
        ),
        _ => compare_options(left.as_number(), right.as_number(), desc, |a, b| {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }),
    }
}
