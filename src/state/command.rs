//! Discrete, reversible document mutations.

use crate::error::{EntityKind, TableError};
use crate::state::coerce::{clamp_filter_rule, clamp_function_type, convert_column, default_filter_type};
use crate::state::data_model::{
    position, BodyCell, BodyRow, CellType, Color, Column, CurrencyType, DateFormat, FilterRule, FilterType,
    FooterCell, FunctionType, HeaderCell, SortDir, TableDocument, Tag,
};
use crate::state::factory;
use crate::state::journal::{Journal, Tx};

/// Inputs a command may read besides the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecContext {
    pub now: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyCellChange {
    Markdown(String),
    DateTime(Option<i64>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagChange {
    Color(Color),
    Markdown(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowPlacement {
    Above,
    Below,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnPlacement {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnChange {
    Width(String),
    ShouldWrapOverflow(bool),
    CurrencyType(CurrencyType),
    DateFormat(DateFormat),
    FunctionType(FunctionType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterRuleChange {
    Column(String),
    FilterType(FilterType),
    Text(String),
    TagIds(Vec<String>),
    Toggle,
}

/// One user-level operation on the table.
///
/// Variants that create entities carry the new entity's id so callers can
/// refer to it afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    HeaderCellUpdate {
        cell_id: String,
        markdown: String,
    },
    BodyCellUpdate {
        cell_id: String,
        row_id: String,
        change: BodyCellChange,
    },
    TagAdd {
        tag_id: String,
        cell_id: String,
        column_id: String,
        row_id: String,
        markdown: String,
        color: Color,
    },
    TagCellAdd {
        cell_id: String,
        row_id: String,
        tag_id: String,
    },
    TagCellRemove {
        cell_id: String,
        row_id: String,
        tag_id: String,
    },
    TagCellMultipleRemove {
        cell_id: String,
        row_id: String,
        tag_ids: Vec<String>,
    },
    TagDelete {
        tag_id: String,
    },
    TagUpdate {
        tag_id: String,
        change: TagChange,
    },
    RowAdd {
        row_id: String,
    },
    RowInsert {
        row_id: String,
        relative_to: String,
        placement: RowPlacement,
    },
    RowDelete {
        row_id: String,
    },
    RowMove {
        row_id: String,
        position: usize,
    },
    ColumnAdd {
        column_id: String,
    },
    ColumnInsert {
        column_id: String,
        relative_to: String,
        placement: ColumnPlacement,
    },
    ColumnDelete {
        column_id: String,
    },
    ColumnMove {
        column_id: String,
        position: usize,
    },
    ColumnTypeUpdate {
        column_id: String,
        cell_type: CellType,
    },
    ColumnUpdate {
        column_id: String,
        change: ColumnChange,
    },
    ColumnVisibilityToggle {
        column_id: String,
    },
    SortUpdate {
        column_id: String,
        sort_dir: SortDir,
    },
    FilterRuleAdd {
        rule_id: String,
        column_id: String,
        filter_type: Option<FilterType>,
        text: String,
    },
    FilterRuleDelete {
        rule_id: String,
    },
    FilterRuleUpdate {
        rule_id: String,
        change: FilterRuleChange,
    },
}

/// An executed command together with the edits it made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedCommand {
    pub command: Command,
    pub journal: Journal,
}

impl AppliedCommand {
    /// Restores the document the command was executed against.
    pub fn undo(&self, document: &TableDocument) -> TableDocument {
        let mut next = document.clone();
        self.journal.revert(&mut next.model);
        next
    }

    /// Re-applies the command to the document produced by [`Self::undo`].
    pub fn redo(&self, document: &TableDocument) -> TableDocument {
        let mut next = document.clone();
        self.journal.apply(&mut next.model);
        next
    }
}

impl Command {
    pub fn set_header_markdown(cell_id: &str, markdown: &str) -> Self {
        Self::HeaderCellUpdate {
            cell_id: cell_id.to_string(),
            markdown: markdown.to_string(),
        }
    }

    pub fn set_body_markdown(cell_id: &str, row_id: &str, markdown: &str) -> Self {
        Self::BodyCellUpdate {
            cell_id: cell_id.to_string(),
            row_id: row_id.to_string(),
            change: BodyCellChange::Markdown(markdown.to_string()),
        }
    }

    pub fn set_body_date_time(cell_id: &str, row_id: &str, date_time: Option<i64>) -> Self {
        Self::BodyCellUpdate {
            cell_id: cell_id.to_string(),
            row_id: row_id.to_string(),
            change: BodyCellChange::DateTime(date_time),
        }
    }

    /// Creates a tag in `column_id`'s palette and assigns it to `cell_id`.
    /// Multi-tag columns append the tag; single-tag columns replace the
    /// assignment.
    pub fn add_tag(cell_id: &str, column_id: &str, row_id: &str, markdown: &str, color: Color) -> Self {
        Self::TagAdd {
            tag_id: factory::new_id(),
            cell_id: cell_id.to_string(),
            column_id: column_id.to_string(),
            row_id: row_id.to_string(),
            markdown: markdown.to_string(),
            color,
        }
    }

    pub fn add_row() -> Self {
        Self::RowAdd {
            row_id: factory::new_id(),
        }
    }

    pub fn insert_row(relative_to: &str, placement: RowPlacement) -> Self {
        Self::RowInsert {
            row_id: factory::new_id(),
            relative_to: relative_to.to_string(),
            placement,
        }
    }

    pub fn add_column() -> Self {
        Self::ColumnAdd {
            column_id: factory::new_id(),
        }
    }

    pub fn insert_column(relative_to: &str, placement: ColumnPlacement) -> Self {
        Self::ColumnInsert {
            column_id: factory::new_id(),
            relative_to: relative_to.to_string(),
            placement,
        }
    }

    pub fn add_filter_rule(column_id: &str, filter_type: Option<FilterType>, text: &str) -> Self {
        Self::FilterRuleAdd {
            rule_id: factory::new_id(),
            column_id: column_id.to_string(),
            filter_type,
            text: text.to_string(),
        }
    }

    pub fn update_filter_rule(rule_id: &str, change: FilterRuleChange) -> Self {
        Self::FilterRuleUpdate {
            rule_id: rule_id.to_string(),
            change,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HeaderCellUpdate { .. } => "header_cell_update",
            Self::BodyCellUpdate { .. } => "body_cell_update",
            Self::TagAdd { .. } => "tag_add",
            Self::TagCellAdd { .. } => "tag_cell_add",
            Self::TagCellRemove { .. } => "tag_cell_remove",
            Self::TagCellMultipleRemove { .. } => "tag_cell_multiple_remove",
            Self::TagDelete { .. } => "tag_delete",
            Self::TagUpdate { .. } => "tag_update",
            Self::RowAdd { .. } => "row_add",
            Self::RowInsert { .. } => "row_insert",
            Self::RowDelete { .. } => "row_delete",
            Self::RowMove { .. } => "row_move",
            Self::ColumnAdd { .. } => "column_add",
            Self::ColumnInsert { .. } => "column_insert",
            Self::ColumnDelete { .. } => "column_delete",
            Self::ColumnMove { .. } => "column_move",
            Self::ColumnTypeUpdate { .. } => "column_type_update",
            Self::ColumnUpdate { .. } => "column_update",
            Self::ColumnVisibilityToggle { .. } => "column_visibility_toggle",
            Self::SortUpdate { .. } => "sort_update",
            Self::FilterRuleAdd { .. } => "filter_rule_add",
            Self::FilterRuleDelete { .. } => "filter_rule_delete",
            Self::FilterRuleUpdate { .. } => "filter_rule_update",
        }
    }

    /// Runs the command against `document`, returning the new document and
    /// the record needed to undo or redo it. `document` is left untouched.
    pub fn execute(
        &self,
        document: &TableDocument,
        ctx: &ExecContext,
    ) -> Result<(TableDocument, AppliedCommand), TableError> {
        let mut next = document.clone();
        let mut tx = Tx::new(&mut next.model);
        self.apply(&mut tx, ctx)?;
        let journal = tx.finish();
        Ok((
            next,
            AppliedCommand {
                command: self.clone(),
                journal,
            },
        ))
    }

    fn apply(&self, tx: &mut Tx<'_>, ctx: &ExecContext) -> Result<(), TableError> {
        match self {
            Self::HeaderCellUpdate { cell_id, markdown } => {
                let pos = position(&tx.model().header_cells, |c| &c.id == cell_id, EntityKind::HeaderCell, cell_id)?;
                tx.update(pos, |c: &mut HeaderCell| c.markdown = markdown.clone());
                Ok(())
            }
            Self::BodyCellUpdate {
                cell_id,
                row_id,
                change,
            } => update_body_cell(tx, ctx, cell_id, row_id, |cell| match change {
                BodyCellChange::Markdown(markdown) => cell.markdown = markdown.clone(),
                BodyCellChange::DateTime(date_time) => cell.date_time = *date_time,
            }),
            Self::TagAdd {
                tag_id,
                cell_id,
                column_id,
                row_id,
                markdown,
                color,
            } => {
                let column_pos = tx.model().column_position(column_id)?;
                let cell = tx.model().body_cell(cell_id)?;
                if &cell.column_id != column_id {
                    return Err(TableError::mismatch(EntityKind::BodyCell, cell_id, column_id));
                }
                let is_multi_tag = tx.model().columns[column_pos].cell_type == CellType::MultiTag;
                let tag = Tag {
                    id: tag_id.clone(),
                    markdown: markdown.clone(),
                    color: *color,
                };
                tx.update(column_pos, |c: &mut Column| c.tags.push(tag));
                update_body_cell(tx, ctx, cell_id, row_id, |cell| {
                    assign_tag(cell, tag_id, is_multi_tag)
                })
            }
            Self::TagCellAdd {
                cell_id,
                row_id,
                tag_id,
            } => {
                let cell = tx.model().body_cell(cell_id)?;
                let column = tx.model().column(&cell.column_id)?;
                if column.tag(tag_id).is_none() {
                    return Err(TableError::not_found(EntityKind::Tag, tag_id));
                }
                let is_multi_tag = column.cell_type == CellType::MultiTag;
                update_body_cell(tx, ctx, cell_id, row_id, |cell| {
                    assign_tag(cell, tag_id, is_multi_tag)
                })
            }
            Self::TagCellRemove {
                cell_id,
                row_id,
                tag_id,
            } => update_body_cell(tx, ctx, cell_id, row_id, |cell| {
                cell.tag_ids.retain(|id| id != tag_id)
            }),
            Self::TagCellMultipleRemove {
                cell_id,
                row_id,
                tag_ids,
            } => update_body_cell(tx, ctx, cell_id, row_id, |cell| {
                cell.tag_ids.retain(|id| !tag_ids.contains(id))
            }),
            Self::TagDelete { tag_id } => {
                let column_id = tx.model().column_for_tag(tag_id)?.id.clone();
                let column_pos = tx.model().column_position(&column_id)?;
                tx.update(column_pos, |c: &mut Column| c.tags.retain(|t| &t.id != tag_id));
                tx.update_where(
                    |c: &BodyCell| c.column_id == column_id && c.tag_ids.contains(tag_id),
                    |c| c.tag_ids.retain(|id| id != tag_id),
                );
                tx.update_where(
                    |r: &FilterRule| r.tag_ids.contains(tag_id),
                    |r| r.tag_ids.retain(|id| id != tag_id),
                );
                Ok(())
            }
            Self::TagUpdate { tag_id, change } => {
                let column_id = tx.model().column_for_tag(tag_id)?.id.clone();
                let column_pos = tx.model().column_position(&column_id)?;
                tx.update(column_pos, |c: &mut Column| {
                    if let Some(tag) = c.tags.iter_mut().find(|t| &t.id == tag_id) {
                        match change {
                            TagChange::Color(color) => tag.color = *color,
                            TagChange::Markdown(markdown) => tag.markdown = markdown.clone(),
                        }
                    }
                });
                Ok(())
            }
            Self::RowAdd { row_id } => {
                let index = tx.model().body_rows.len();
                insert_row(tx, ctx, row_id, index);
                Ok(())
            }
            Self::RowInsert {
                row_id,
                relative_to,
                placement,
            } => {
                let target = tx.model().body_row(relative_to)?.index;
                let index = match placement {
                    RowPlacement::Above => target,
                    RowPlacement::Below => target + 1,
                };
                tx.update_where(|r: &BodyRow| r.index >= index, |r| r.index += 1);
                insert_row(tx, ctx, row_id, index);
                Ok(())
            }
            Self::RowDelete { row_id } => {
                let pos = tx.model().body_row_position(row_id)?;
                let removed: BodyRow = tx.remove(pos);
                tx.remove_where(|c: &BodyCell| &c.row_id == row_id);
                tx.update_where(|r: &BodyRow| r.index > removed.index, |r| r.index -= 1);
                Ok(())
            }
            Self::RowMove { row_id, position } => {
                tx.model().body_row(row_id)?;
                let mut order = tx.model().row_ids_by_index();
                if *position >= order.len() {
                    return Err(TableError::InvalidMove {
                        kind: EntityKind::BodyRow,
                        id: row_id.clone(),
                        position: *position,
                        len: order.len(),
                    });
                }
                order.retain(|id| id != row_id);
                order.insert(*position, row_id.clone());
                for (index, id) in order.iter().enumerate() {
                    let pos = tx.model().body_row_position(id)?;
                    tx.update(pos, |r: &mut BodyRow| r.index = index);
                }
                Ok(())
            }
            Self::ColumnAdd { column_id } => {
                let position = tx.model().columns.len();
                insert_column(tx, column_id, position);
                Ok(())
            }
            Self::ColumnInsert {
                column_id,
                relative_to,
                placement,
            } => {
                let target = tx.model().column_position(relative_to)?;
                let position = match placement {
                    ColumnPlacement::Left => target,
                    ColumnPlacement::Right => target + 1,
                };
                insert_column(tx, column_id, position);
                Ok(())
            }
            Self::ColumnDelete { column_id } => {
                let pos = tx.model().column_position(column_id)?;
                if tx.model().columns.len() == 1 {
                    return Err(TableError::LastRemaining {
                        kind: EntityKind::Column,
                    });
                }
                tx.remove::<Column>(pos);
                tx.remove_where(|c: &HeaderCell| &c.column_id == column_id);
                tx.remove_where(|c: &BodyCell| &c.column_id == column_id);
                tx.remove_where(|c: &FooterCell| &c.column_id == column_id);
                tx.remove_where(|r: &FilterRule| &r.column_id == column_id);
                Ok(())
            }
            Self::ColumnMove {
                column_id,
                position,
            } => {
                let pos = tx.model().column_position(column_id)?;
                let len = tx.model().columns.len();
                if *position >= len {
                    return Err(TableError::InvalidMove {
                        kind: EntityKind::Column,
                        id: column_id.clone(),
                        position: *position,
                        len,
                    });
                }
                if pos != *position {
                    let column: Column = tx.remove(pos);
                    tx.insert(*position, column);
                }
                Ok(())
            }
            Self::ColumnTypeUpdate {
                column_id,
                cell_type,
            } => change_column_type(tx, column_id, *cell_type),
            Self::ColumnUpdate { column_id, change } => {
                let pos = tx.model().column_position(column_id)?;
                tx.update(pos, |c: &mut Column| match change {
                    ColumnChange::Width(width) => c.width = width.clone(),
                    ColumnChange::ShouldWrapOverflow(wrap) => c.should_wrap_overflow = *wrap,
                    ColumnChange::CurrencyType(currency) => c.currency_type = *currency,
                    ColumnChange::DateFormat(format) => c.date_format = *format,
                    ColumnChange::FunctionType(function) => {
                        c.function_type = clamp_function_type(*function, c.cell_type)
                    }
                });
                Ok(())
            }
            Self::ColumnVisibilityToggle { column_id } => {
                let pos = tx.model().column_position(column_id)?;
                tx.update(pos, |c: &mut Column| c.is_visible = !c.is_visible);
                Ok(())
            }
            Self::SortUpdate {
                column_id,
                sort_dir,
            } => {
                tx.model().column(column_id)?;
                // Only one column may be sorted at a time.
                tx.update_where(
                    |c: &Column| &c.id == column_id || c.sort_dir != SortDir::None,
                    |c| {
                        c.sort_dir = if &c.id == column_id {
                            *sort_dir
                        } else {
                            SortDir::None
                        }
                    },
                );
                Ok(())
            }
            Self::FilterRuleAdd {
                rule_id,
                column_id,
                filter_type,
                text,
            } => {
                let cell_type = tx.model().column(column_id)?.cell_type;
                let mut rule = factory::create_filter_rule(
                    column_id,
                    filter_type.unwrap_or_else(|| default_filter_type(cell_type)),
                );
                rule.id = rule_id.clone();
                rule.text = text.clone();
                tx.push(clamp_filter_rule(&rule, cell_type));
                Ok(())
            }
            Self::FilterRuleDelete { rule_id } => {
                let pos = position(&tx.model().filter_rules, |r| &r.id == rule_id, EntityKind::FilterRule, rule_id)?;
                tx.remove::<FilterRule>(pos);
                Ok(())
            }
            Self::FilterRuleUpdate { rule_id, change } => update_filter_rule(tx, rule_id, change),
        }
    }
}

fn assign_tag(cell: &mut BodyCell, tag_id: &str, is_multi_tag: bool) {
    if is_multi_tag {
        if !cell.tag_ids.iter().any(|id| id == tag_id) {
            cell.tag_ids.push(tag_id.to_string());
        }
    } else {
        cell.tag_ids = vec![tag_id.to_string()];
    }
}

/// Updates one body cell and stamps its row's last-edited time when the cell
/// actually changed. `row_id` must be the row the cell sits in.
fn update_body_cell(
    tx: &mut Tx<'_>,
    ctx: &ExecContext,
    cell_id: &str,
    row_id: &str,
    f: impl FnOnce(&mut BodyCell),
) -> Result<(), TableError> {
    let cell_pos = position(&tx.model().body_cells, |c| c.id == cell_id, EntityKind::BodyCell, cell_id)?;
    let row_pos = tx.model().body_row_position(row_id)?;
    if tx.model().body_cells[cell_pos].row_id != row_id {
        return Err(TableError::mismatch(EntityKind::BodyCell, cell_id, row_id));
    }

    let before = tx.model().body_cells[cell_pos].clone();
    let mut after = before.clone();
    f(&mut after);
    if after == before {
        return Ok(());
    }

    tx.update(cell_pos, |c: &mut BodyCell| *c = after);
    tx.update(row_pos, |r: &mut BodyRow| r.last_edited_time = ctx.now);
    Ok(())
}

fn insert_row(tx: &mut Tx<'_>, ctx: &ExecContext, row_id: &str, index: usize) {
    let mut row = factory::create_body_row(index, ctx.now);
    row.id = row_id.to_string();
    tx.push(row);

    let cells: Vec<BodyCell> = tx
        .model()
        .columns
        .iter()
        .map(|c| factory::create_body_cell(&c.id, row_id, c.cell_type))
        .collect();
    for cell in cells {
        tx.push(cell);
    }
}

fn insert_column(tx: &mut Tx<'_>, column_id: &str, position: usize) {
    let mut column = factory::create_column(CellType::Text);
    column.id = column_id.to_string();
    tx.insert(position, column);

    let model = tx.model();
    let header_cells: Vec<HeaderCell> = model
        .header_rows
        .iter()
        .map(|r| factory::create_header_cell(column_id, &r.id))
        .collect();
    let body_cells: Vec<BodyCell> = model
        .row_ids_by_index()
        .iter()
        .map(|row_id| factory::create_body_cell(column_id, row_id, CellType::Text))
        .collect();
    let footer_cells: Vec<FooterCell> = model
        .footer_rows
        .iter()
        .map(|r| factory::create_footer_cell(column_id, &r.id))
        .collect();

    for cell in header_cells {
        tx.push(cell);
    }
    for cell in body_cells {
        tx.push(cell);
    }
    for cell in footer_cells {
        tx.push(cell);
    }
}

fn change_column_type(tx: &mut Tx<'_>, column_id: &str, cell_type: CellType) -> Result<(), TableError> {
    let column_pos = tx.model().column_position(column_id)?;
    let column = tx.model().columns[column_pos].clone();
    if column.cell_type == cell_type {
        return Ok(());
    }

    let (positions, cells): (Vec<usize>, Vec<BodyCell>) = tx
        .model()
        .body_cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.column_id == column_id)
        .map(|(pos, c)| (pos, c.clone()))
        .unzip();

    let (next_column, next_cells) = convert_column(&column, &cells, cell_type);
    tx.update(column_pos, |c: &mut Column| *c = next_column);
    for (pos, cell) in positions.into_iter().zip(next_cells) {
        tx.update(pos, |c: &mut BodyCell| *c = cell);
    }
    tx.update_where(
        |r: &FilterRule| r.column_id == column_id,
        |r| *r = clamp_filter_rule(r, cell_type),
    );
    Ok(())
}

fn update_filter_rule(tx: &mut Tx<'_>, rule_id: &str, change: &FilterRuleChange) -> Result<(), TableError> {
    let pos = position(&tx.model().filter_rules, |r| r.id == rule_id, EntityKind::FilterRule, rule_id)?;
    let mut rule = tx.model().filter_rules[pos].clone();

    match change {
        FilterRuleChange::Column(column_id) => {
            tx.model().column(column_id)?;
            if &rule.column_id != column_id {
                rule.column_id = column_id.clone();
                rule.tag_ids.clear();
            }
        }
        FilterRuleChange::FilterType(filter_type) => rule.filter_type = *filter_type,
        FilterRuleChange::Text(text) => rule.text = text.clone(),
        FilterRuleChange::TagIds(tag_ids) => {
            let column = tx.model().column(&rule.column_id)?;
            if let Some(missing) = tag_ids.iter().find(|id| column.tag(id).is_none()) {
                return Err(TableError::not_found(EntityKind::Tag, missing));
            }
            rule.tag_ids = tag_ids.clone();
        }
        FilterRuleChange::Toggle => rule.is_enabled = !rule.is_enabled,
    }

    let cell_type = tx.model().column(&rule.column_id)?.cell_type;
    let rule = clamp_filter_rule(&rule, cell_type);
    tx.update(pos, |r: &mut FilterRule| *r = rule);
    Ok(())
}
