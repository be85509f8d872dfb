//! Constructors for fresh entities and whole documents.

use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::state::data_model::{
    checkbox_markdown, BodyCell, BodyRow, CellType, Color, Column, CurrencyType, DateFormat,
    FilterRule, FilterType, FooterCell, FooterRow, FunctionType, HeaderCell, HeaderRow, SortDir,
    TableDocument, TableModel, Tag, FOOTER_ROW_COUNT,
};

pub const DEFAULT_COLUMN_WIDTH: &str = "140px";
pub const DEFAULT_COLUMN_NAME: &str = "New Column";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn random_color() -> Color {
    *Color::ALL
        .choose(&mut rand::rng())
        .unwrap_or(&Color::LightGray)
}

pub fn create_column(cell_type: CellType) -> Column {
    Column {
        id: new_id(),
        cell_type,
        sort_dir: SortDir::None,
        is_visible: true,
        width: DEFAULT_COLUMN_WIDTH.to_string(),
        should_wrap_overflow: false,
        currency_type: CurrencyType::UnitedStates,
        date_format: DateFormat::MmDdYyyy,
        function_type: FunctionType::None,
        tags: Vec::new(),
    }
}

pub fn create_header_row() -> HeaderRow {
    HeaderRow { id: new_id() }
}

pub fn create_footer_row() -> FooterRow {
    FooterRow { id: new_id() }
}

pub fn create_body_row(index: usize, now: i64) -> BodyRow {
    BodyRow {
        id: new_id(),
        index,
        creation_time: now,
        last_edited_time: now,
    }
}

pub fn create_header_cell(column_id: &str, row_id: &str) -> HeaderCell {
    HeaderCell {
        id: new_id(),
        column_id: column_id.to_string(),
        row_id: row_id.to_string(),
        markdown: DEFAULT_COLUMN_NAME.to_string(),
    }
}

pub fn create_body_cell(column_id: &str, row_id: &str, cell_type: CellType) -> BodyCell {
    let markdown = if cell_type == CellType::Checkbox {
        checkbox_markdown(false).to_string()
    } else {
        String::new()
    };
    BodyCell {
        id: new_id(),
        column_id: column_id.to_string(),
        row_id: row_id.to_string(),
        markdown,
        date_time: None,
        tag_ids: Vec::new(),
    }
}

pub fn create_footer_cell(column_id: &str, row_id: &str) -> FooterCell {
    FooterCell {
        id: new_id(),
        column_id: column_id.to_string(),
        row_id: row_id.to_string(),
    }
}

pub fn create_filter_rule(column_id: &str, filter_type: FilterType) -> FilterRule {
    FilterRule {
        id: new_id(),
        column_id: column_id.to_string(),
        filter_type,
        text: String::new(),
        tag_ids: Vec::new(),
        is_enabled: true,
    }
}

pub fn create_tag(markdown: &str, color: Option<Color>) -> Tag {
    Tag {
        id: new_id(),
        markdown: markdown.to_string(),
        color: color.unwrap_or_else(random_color),
    }
}

/// Builds a complete table with `num_columns` x `num_rows` body cells, one
/// header row and the two footer rows. Dimensions are clamped to at least 1x1.
pub fn create_table_state(
    num_columns: usize,
    num_rows: usize,
    cell_type: CellType,
    now: i64,
) -> TableDocument {
    let num_columns = num_columns.max(1);
    let num_rows = num_rows.max(1);

    let columns: Vec<Column> = (0..num_columns).map(|_| create_column(cell_type)).collect();
    let header_rows = vec![create_header_row()];
    let header_cells = columns
        .iter()
        .map(|c| create_header_cell(&c.id, &header_rows[0].id))
        .collect();

    let body_rows: Vec<BodyRow> = (0..num_rows).map(|i| create_body_row(i, now)).collect();
    let mut body_cells = Vec::with_capacity(num_rows * num_columns);
    for row in &body_rows {
        for column in &columns {
            body_cells.push(create_body_cell(&column.id, &row.id, cell_type));
        }
    }

    let footer_rows: Vec<FooterRow> = (0..FOOTER_ROW_COUNT).map(|_| create_footer_row()).collect();
    let mut footer_cells = Vec::with_capacity(FOOTER_ROW_COUNT * num_columns);
    for row in &footer_rows {
        for column in &columns {
            footer_cells.push(create_footer_cell(&column.id, &row.id));
        }
    }

    TableDocument::new(TableModel {
        columns,
        header_rows,
        body_rows,
        footer_rows,
        header_cells,
        body_cells,
        footer_cells,
        filter_rules: Vec::new(),
    })
}
