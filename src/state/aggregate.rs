use std::collections::BTreeSet;

use crate::error::TableError;
use crate::state::cell_content::{format_currency, CellValue};
use crate::state::cell_input::format_number;
use crate::state::data_model::{CellType, FunctionType, TableModel};

/// Footer value for `column_id` over `rows` (normally the derived view).
/// `None` when the column has no footer function or nothing to aggregate.
pub fn footer_value(model: &TableModel, column_id: &str, rows: &[String]) -> Result<Option<String>, TableError> {
    let column = model.column(column_id)?;
    if column.function_type == FunctionType::None {
        return Ok(None);
    }

    let mut values = Vec::with_capacity(rows.len());
    for row_id in rows {
        let row = model.body_row(row_id)?;
        let cell = model.body_cell_at(column_id, row_id)?;
        values.push(CellValue::from_cell(column, row, cell));
    }

    let total = values.len();
    let empty = values.iter().filter(|v| v.is_empty()).count();
    let percent = |count: usize| {
        if total == 0 {
            "0%".to_string()
        } else {
            format!("{}%", format_number(count as f64 / total as f64 * 100.0))
        }
    };

    let display = match column.function_type {
        FunctionType::None => return Ok(None),
        FunctionType::CountAll => total.to_string(),
        FunctionType::CountValues => values
            .iter()
            .map(|v| match v {
                CellValue::Tags(tags) => tags.len(),
                other => usize::from(!other.is_empty()),
            })
            .sum::<usize>()
            .to_string(),
        FunctionType::CountUnique => values
            .iter()
            .filter(|v| !v.is_empty())
            .map(CellValue::display_content)
            .collect::<BTreeSet<_>>()
            .len()
            .to_string(),
        FunctionType::CountEmpty => empty.to_string(),
        FunctionType::CountNotEmpty => (total - empty).to_string(),
        FunctionType::PercentEmpty => percent(empty),
        FunctionType::PercentNotEmpty => percent(total - empty),
        numeric => {
            let mut nums: Vec<f64> = values.iter().filter_map(CellValue::as_number).collect();
            if nums.is_empty() {
                return Ok(None);
            }
            nums.sort_by(f64::total_cmp);
            let result = summarize_numbers(numeric, &nums);
            if column.cell_type == CellType::Currency {
                format_currency(result, column.currency_type)
            } else {
                format_number(result)
            }
        }
    };
    Ok(Some(display))
}

/// `nums` must be sorted ascending and non-empty.
fn summarize_numbers(function: FunctionType, nums: &[f64]) -> f64 {
    let sum: f64 = nums.iter().sum();
    let min = nums[0];
    let max = nums[nums.len() - 1];
    match function {
        FunctionType::Sum => sum,
        FunctionType::Avg => sum / nums.len() as f64,
        FunctionType::Min => min,
        FunctionType::Max => max,
        FunctionType::Range => max - min,
        FunctionType::Median => {
            let mid = nums.len() / 2;
            if nums.len() % 2 == 0 {
                (nums[mid - 1] + nums[mid]) / 2.0
            } else {
                nums[mid]
            }
        }
        _ => f64::NAN,
    }
}
