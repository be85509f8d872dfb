use crate::error::TableError;
use crate::state::cell_input::{self, format_date, format_date_time, format_number};
use crate::state::data_model::{
    is_checked, BodyCell, BodyRow, CellType, Column, CurrencyType, DateFormat, Tag, TableModel,
};

/// Semantic value of a body cell, handed to renderers and exporters.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    File(String),
    Number(Option<f64>),
    Currency {
        amount: Option<f64>,
        currency: CurrencyType,
    },
    Date {
        time: Option<i64>,
        format: DateFormat,
    },
    Time {
        time: i64,
        format: DateFormat,
    },
    Tags(Vec<Tag>),
    Checkbox(bool),
}

impl CellValue {
    pub fn from_cell(column: &Column, row: &BodyRow, cell: &BodyCell) -> Self {
        let number = || cell_input::parse_number_input(&cell.markdown).ok();
        match column.cell_type {
            CellType::Text => Self::Text(cell.markdown.clone()),
            CellType::File => Self::File(cell.markdown.clone()),
            CellType::Number => Self::Number(number()),
            CellType::Currency => Self::Currency {
                amount: number(),
                currency: column.currency_type,
            },
            CellType::Date => Self::Date {
                time: cell.date_time,
                format: column.date_format,
            },
            CellType::CreationTime => Self::Time {
                time: row.creation_time,
                format: column.date_format,
            },
            CellType::LastEditedTime => Self::Time {
                time: row.last_edited_time,
                format: column.date_format,
            },
            CellType::Tag | CellType::MultiTag => Self::Tags(
                cell.tag_ids
                    .iter()
                    .filter_map(|id| column.tag(id).cloned())
                    .collect(),
            ),
            CellType::Checkbox => Self::Checkbox(is_checked(&cell.markdown)),
        }
    }

    /// True when the cell holds nothing a user would see.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::File(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_none(),
            Self::Currency { amount, .. } => amount.is_none(),
            Self::Date { time, .. } => time.is_none(),
            Self::Time { .. } => false,
            Self::Tags(tags) => tags.is_empty(),
            Self::Checkbox(checked) => !checked,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => *n,
            Self::Currency { amount, .. } => *amount,
            _ => None,
        }
    }

    /// Plain-text rendering used for search and export.
    pub fn display_content(&self) -> String {
        match self {
            Self::Text(s) | Self::File(s) => s.clone(),
            Self::Number(n) => n.map(format_number).unwrap_or_default(),
            Self::Currency { amount, currency } => amount
                .map(|a| format_currency(a, *currency))
                .unwrap_or_default(),
            Self::Date { time, format } => time.map(|t| format_date(t, *format)).unwrap_or_default(),
            Self::Time { time, format } => format_date_time(*time, *format),
            Self::Tags(tags) => tags
                .iter()
                .map(|t| t.markdown.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Checkbox(checked) => {
                if *checked {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
        }
    }
}

/// Looks up the value at (`column_id`, `row_id`).
pub fn cell_value(model: &TableModel, column_id: &str, row_id: &str) -> Result<CellValue, TableError> {
    let column = model.column(column_id)?;
    let row = model.body_row(row_id)?;
    let cell = model.body_cell_at(column_id, row_id)?;
    Ok(CellValue::from_cell(column, row, cell))
}

pub fn format_currency(amount: f64, currency: CurrencyType) -> String {
    let digits = currency.fraction_digits();
    let fixed = format!("{:.*}", digits, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (pos, ch) in int_part.chars().enumerate() {
        if pos > 0 && (int_part.len() - pos) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}
