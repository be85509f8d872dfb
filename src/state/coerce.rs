//! Rules tying column types to legal filter types and legal cell values.
//!
//! [`clamp_filter_rule`] is the single place a rule is brought back into its
//! column type's domain; every path that changes a column type or a rule's
//! column goes through it.

use crate::state::cell_input::{format_date, is_number, parse_date_input};
use crate::state::data_model::{
    checkbox_markdown, is_checked, BodyCell, CellType, Column, FilterRule, FilterType,
    FunctionType, Tag,
};
use crate::state::factory;

const TEXT_FILTERS: &[FilterType] = &[
    FilterType::Is,
    FilterType::IsNot,
    FilterType::Contains,
    FilterType::DoesNotContain,
    FilterType::StartsWith,
    FilterType::EndsWith,
    FilterType::IsEmpty,
    FilterType::IsNotEmpty,
];
const TAG_FILTERS: &[FilterType] = &[
    FilterType::Is,
    FilterType::IsNot,
    FilterType::IsEmpty,
    FilterType::IsNotEmpty,
];
const MULTI_TAG_FILTERS: &[FilterType] = &[
    FilterType::Contains,
    FilterType::DoesNotContain,
    FilterType::IsEmpty,
    FilterType::IsNotEmpty,
];
const CHECKBOX_FILTERS: &[FilterType] = &[FilterType::Is, FilterType::IsNot];

/// Filter types a rule on a column of `cell_type` may use. Empty for types
/// that cannot be filtered.
pub fn allowed_filter_types(cell_type: CellType) -> &'static [FilterType] {
    match cell_type {
        CellType::Text | CellType::File => TEXT_FILTERS,
        CellType::Tag => TAG_FILTERS,
        CellType::MultiTag => MULTI_TAG_FILTERS,
        CellType::Checkbox => CHECKBOX_FILTERS,
        CellType::Number
        | CellType::Currency
        | CellType::Date
        | CellType::CreationTime
        | CellType::LastEditedTime => &[],
    }
}

pub fn is_filterable(cell_type: CellType) -> bool {
    !allowed_filter_types(cell_type).is_empty()
}

pub fn default_filter_type(cell_type: CellType) -> FilterType {
    allowed_filter_types(cell_type)
        .first()
        .copied()
        .unwrap_or_default()
}

/// Returns `rule` adjusted so it is legal for a column of `cell_type`.
pub fn clamp_filter_rule(rule: &FilterRule, cell_type: CellType) -> FilterRule {
    let mut out = rule.clone();
    if !allowed_filter_types(cell_type).contains(&rule.filter_type) {
        out.filter_type = default_filter_type(cell_type);
        out.text.clear();
        out.tag_ids.clear();
    }

    if cell_type.is_tag() {
        out.text.clear();
    } else {
        out.tag_ids.clear();
    }

    if cell_type == CellType::Checkbox && !out.text.is_empty() {
        out.text = checkbox_markdown(is_checked(&out.text)).to_string();
    }
    if !is_filterable(cell_type) {
        out.text.clear();
    }
    out
}

/// Footer function allowed on the new type; numeric aggregates fall back to none.
pub fn clamp_function_type(function_type: FunctionType, cell_type: CellType) -> FunctionType {
    if function_type.is_numeric() && !cell_type.is_numeric() {
        FunctionType::None
    } else {
        function_type
    }
}

fn is_truthy(text: &str) -> bool {
    let trimmed = text.trim();
    is_checked(trimmed)
        || ["true", "yes", "1", "x"]
            .iter()
            .any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// The cell rendered as plain text under its old type, the common currency
/// for converting between types.
fn cell_as_text(cell: &BodyCell, column: &Column) -> String {
    match column.cell_type {
        CellType::Text | CellType::File | CellType::Number | CellType::Currency => {
            cell.markdown.clone()
        }
        CellType::Checkbox => {
            if is_checked(&cell.markdown) {
                "true".to_string()
            } else {
                String::new()
            }
        }
        CellType::Date => cell
            .date_time
            .map(|t| format_date(t, column.date_format))
            .unwrap_or_default(),
        CellType::Tag | CellType::MultiTag => cell
            .tag_ids
            .iter()
            .filter_map(|id| column.tag(id))
            .map(|t| t.markdown.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        CellType::CreationTime | CellType::LastEditedTime => String::new(),
    }
}

fn tag_id_for_label(tags: &mut Vec<Tag>, label: &str) -> String {
    if let Some(tag) = tags.iter().find(|t| t.markdown == label) {
        return tag.id.clone();
    }
    let tag = factory::create_tag(label, None);
    let id = tag.id.clone();
    tags.push(tag);
    id
}

/// Converts a column and its body cells to `new_type`.
///
/// Every cell ends up in the new type's legal domain: unused fields are reset,
/// text becomes tags (creating palette entries as needed), tags become their
/// labels, numbers that do not parse are dropped. Never fails.
pub fn convert_column(column: &Column, cells: &[BodyCell], new_type: CellType) -> (Column, Vec<BodyCell>) {
    let mut next_column = column.clone();
    next_column.cell_type = new_type;
    next_column.function_type = clamp_function_type(column.function_type, new_type);

    let next_cells = cells
        .iter()
        .map(|cell| {
            let mut next = cell.clone();
            next.markdown.clear();
            next.date_time = None;
            next.tag_ids.clear();

            match new_type {
                CellType::Text | CellType::File => next.markdown = cell_as_text(cell, column),
                CellType::Number | CellType::Currency => {
                    let text = cell_as_text(cell, column);
                    if is_number(&text) {
                        next.markdown = text.trim().to_string();
                    }
                }
                CellType::Checkbox => {
                    next.markdown = checkbox_markdown(is_truthy(&cell_as_text(cell, column))).to_string();
                }
                CellType::Date => {
                    next.date_time = if column.cell_type == CellType::Date {
                        cell.date_time
                    } else {
                        parse_date_input(&cell_as_text(cell, column), column.date_format).ok()
                    };
                }
                CellType::Tag | CellType::MultiTag => {
                    if column.cell_type.is_tag() {
                        next.tag_ids = cell.tag_ids.clone();
                    } else {
                        let text = cell_as_text(cell, column);
                        let labels: Vec<&str> = if new_type == CellType::MultiTag {
                            text.split(',').map(str::trim).filter(|l| !l.is_empty()).collect()
                        } else {
                            Some(text.trim()).filter(|l| !l.is_empty()).into_iter().collect()
                        };
                        for label in labels {
                            let id = tag_id_for_label(&mut next_column.tags, label);
                            if !next.tag_ids.contains(&id) {
                                next.tag_ids.push(id);
                            }
                        }
                    }
                    if new_type == CellType::Tag {
                        next.tag_ids.truncate(1);
                    }
                }
                CellType::CreationTime | CellType::LastEditedTime => {}
            }
            next
        })
        .collect();

    (next_column, next_cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(filter_type: FilterType, text: &str) -> FilterRule {
        FilterRule {
            id: "r".to_string(),
            column_id: "c".to_string(),
            filter_type,
            text: text.to_string(),
            tag_ids: vec!["t".to_string()],
            is_enabled: true,
        }
    }

    #[test]
    fn test_clamp_keeps_legal_rule() {
        let clamped = clamp_filter_rule(&rule(FilterType::Contains, "abc"), CellType::Text);
        assert_eq!(clamped.filter_type, FilterType::Contains);
        assert_eq!(clamped.text, "abc");
        assert!(clamped.tag_ids.is_empty());
    }

    #[test]
    fn test_clamp_resets_illegal_checkbox_rule() {
        let clamped = clamp_filter_rule(&rule(FilterType::StartsWith, "abc"), CellType::Checkbox);
        assert_eq!(clamped.filter_type, FilterType::Is);
        assert_eq!(clamped.text, "");
    }

    #[test]
    fn test_clamp_multi_tag_uses_contains() {
        let clamped = clamp_filter_rule(&rule(FilterType::Is, ""), CellType::MultiTag);
        assert_eq!(clamped.filter_type, FilterType::Contains);
        assert!(clamped.tag_ids.is_empty());
    }

    #[test]
    fn test_clamp_function_type() {
        assert_eq!(clamp_function_type(FunctionType::Sum, CellType::Text), FunctionType::None);
        assert_eq!(clamp_function_type(FunctionType::Sum, CellType::Currency), FunctionType::Sum);
        assert_eq!(
            clamp_function_type(FunctionType::CountAll, CellType::Tag),
            FunctionType::CountAll
        );
    }
}
