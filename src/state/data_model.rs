use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, TableError};

pub const CURRENT_PLUGIN_VERSION: &str = "6.4.0";

pub const CHECKBOX_MARKDOWN_CHECKED: &str = "[x]";
pub const CHECKBOX_MARKDOWN_UNCHECKED: &str = "[ ]";

/// Number of footer rows every table carries.
pub const FOOTER_ROW_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellType {
    #[default]
    Text,
    Number,
    Date,
    Tag,
    MultiTag,
    Checkbox,
    Currency,
    CreationTime,
    LastEditedTime,
    File,
}

impl CellType {
    pub fn all() -> &'static [Self] {
        &[
            Self::Text,
            Self::Number,
            Self::Date,
            Self::Tag,
            Self::MultiTag,
            Self::Checkbox,
            Self::Currency,
            Self::CreationTime,
            Self::LastEditedTime,
            Self::File,
        ]
    }

    pub fn is_tag(self) -> bool {
        matches!(self, Self::Tag | Self::MultiTag)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Currency)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    None,
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyType {
    #[default]
    #[serde(rename = "USD")]
    UnitedStates,
    #[serde(rename = "CAD")]
    Canada,
    #[serde(rename = "AUD")]
    Australia,
    #[serde(rename = "EUR")]
    Europe,
    #[serde(rename = "GBP")]
    UnitedKingdom,
    #[serde(rename = "JPY")]
    Japan,
    #[serde(rename = "CNY")]
    China,
    #[serde(rename = "INR")]
    India,
    #[serde(rename = "CHF")]
    Switzerland,
}

impl CurrencyType {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::UnitedStates => "$",
            Self::Canada => "CA$",
            Self::Australia => "A$",
            Self::Europe => "€",
            Self::UnitedKingdom => "£",
            Self::Japan => "¥",
            Self::China => "CN¥",
            Self::India => "₹",
            Self::Switzerland => "CHF ",
        }
    }

    pub fn fraction_digits(self) -> usize {
        match self {
            Self::Japan => 0,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "mm/dd/yyyy")]
    MmDdYyyy,
    #[serde(rename = "dd/mm/yyyy")]
    DdMmYyyy,
    #[serde(rename = "yyyy/mm/dd")]
    YyyyMmDd,
    #[serde(rename = "full")]
    Full,
}

/// Aggregate displayed in a column's footer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionType {
    #[default]
    None,
    CountAll,
    CountValues,
    CountUnique,
    CountEmpty,
    CountNotEmpty,
    PercentEmpty,
    PercentNotEmpty,
    Sum,
    Avg,
    Min,
    Max,
    Median,
    Range,
}

impl FunctionType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Sum | Self::Avg | Self::Min | Self::Max | Self::Median | Self::Range
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    LightGray,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
}

impl Color {
    pub const ALL: [Self; 10] = [
        Self::LightGray,
        Self::Gray,
        Self::Brown,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Pink,
        Self::Red,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    #[default]
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub markdown: String,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    pub sort_dir: SortDir,
    pub is_visible: bool,
    pub width: String,
    pub should_wrap_overflow: bool,
    pub currency_type: CurrencyType,
    pub date_format: DateFormat,
    pub function_type: FunctionType,
    pub tags: Vec<Tag>,
}

impl Column {
    pub fn tag(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterRow {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRow {
    pub id: String,
    pub index: usize,
    pub creation_time: i64,
    pub last_edited_time: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    pub id: String,
    pub column_id: String,
    pub row_id: String,
    pub markdown: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCell {
    pub id: String,
    pub column_id: String,
    pub row_id: String,
    pub markdown: String,
    pub date_time: Option<i64>,
    pub tag_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterCell {
    pub id: String,
    pub column_id: String,
    pub row_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub id: String,
    pub column_id: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub text: String,
    pub tag_ids: Vec<String>,
    pub is_enabled: bool,
}

/// The flat, id-indexed document. Entities reference each other by id only.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableModel {
    pub columns: Vec<Column>,
    pub header_rows: Vec<HeaderRow>,
    pub body_rows: Vec<BodyRow>,
    pub footer_rows: Vec<FooterRow>,
    pub header_cells: Vec<HeaderCell>,
    pub body_cells: Vec<BodyCell>,
    pub footer_cells: Vec<FooterCell>,
    pub filter_rules: Vec<FilterRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDocument {
    pub model: TableModel,
    pub plugin_version: String,
}

impl TableDocument {
    pub fn new(model: TableModel) -> Self {
        Self {
            model,
            plugin_version: CURRENT_PLUGIN_VERSION.to_string(),
        }
    }
}

pub(crate) fn position<T>(items: &[T], pred: impl Fn(&T) -> bool, kind: EntityKind, id: &str) -> Result<usize, TableError> {
    items
        .iter()
        .position(pred)
        .ok_or_else(|| TableError::not_found(kind, id))
}

impl TableModel {
    pub fn column(&self, column_id: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| TableError::not_found(EntityKind::Column, column_id))
    }

    pub fn column_position(&self, column_id: &str) -> Result<usize, TableError> {
        position(&self.columns, |c| c.id == column_id, EntityKind::Column, column_id)
    }

    pub fn body_row(&self, row_id: &str) -> Result<&BodyRow, TableError> {
        self.body_rows
            .iter()
            .find(|r| r.id == row_id)
            .ok_or_else(|| TableError::not_found(EntityKind::BodyRow, row_id))
    }

    pub fn body_row_position(&self, row_id: &str) -> Result<usize, TableError> {
        position(&self.body_rows, |r| r.id == row_id, EntityKind::BodyRow, row_id)
    }

    pub fn header_cell(&self, cell_id: &str) -> Result<&HeaderCell, TableError> {
        self.header_cells
            .iter()
            .find(|c| c.id == cell_id)
            .ok_or_else(|| TableError::not_found(EntityKind::HeaderCell, cell_id))
    }

    /// The header cell holding the display name of `column_id`.
    pub fn column_name(&self, column_id: &str) -> Result<&str, TableError> {
        self.header_cells
            .iter()
            .find(|c| c.column_id == column_id)
            .map(|c| c.markdown.as_str())
            .ok_or_else(|| TableError::not_found(EntityKind::HeaderCell, column_id))
    }

    pub fn body_cell(&self, cell_id: &str) -> Result<&BodyCell, TableError> {
        self.body_cells
            .iter()
            .find(|c| c.id == cell_id)
            .ok_or_else(|| TableError::not_found(EntityKind::BodyCell, cell_id))
    }

    pub fn body_cell_at(&self, column_id: &str, row_id: &str) -> Result<&BodyCell, TableError> {
        self.body_cells
            .iter()
            .find(|c| c.column_id == column_id && c.row_id == row_id)
            .ok_or_else(|| TableError::not_found(EntityKind::BodyCell, format!("{column_id}/{row_id}")))
    }

    pub fn filter_rule(&self, rule_id: &str) -> Result<&FilterRule, TableError> {
        self.filter_rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| TableError::not_found(EntityKind::FilterRule, rule_id))
    }

    /// Finds the column whose palette owns `tag_id`.
    pub fn column_for_tag(&self, tag_id: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.tag(tag_id).is_some())
            .ok_or_else(|| TableError::not_found(EntityKind::Tag, tag_id))
    }

    /// Body row ids in stored `index` order.
    pub fn row_ids_by_index(&self) -> Vec<String> {
        let mut rows: Vec<&BodyRow> = self.body_rows.iter().collect();
        rows.sort_by_key(|r| r.index);
        rows.into_iter().map(|r| r.id.clone()).collect()
    }

    /// Checks referential integrity and structural invariants. Used by tests
    /// and after loading a file.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.header_rows.len() != 1 {
            return Err(TableError::not_found(EntityKind::HeaderRow, "<single header row>"));
        }
        if self.footer_rows.len() != FOOTER_ROW_COUNT {
            return Err(TableError::not_found(EntityKind::FooterRow, "<two footer rows>"));
        }

        let mut indices: Vec<usize> = self.body_rows.iter().map(|r| r.index).collect();
        indices.sort_unstable();
        if indices.iter().enumerate().any(|(pos, index)| pos != *index) {
            return Err(TableError::not_found(EntityKind::BodyRow, "<dense index>"));
        }

        for cell in &self.header_cells {
            self.column(&cell.column_id)?;
            if !self.header_rows.iter().any(|r| r.id == cell.row_id) {
                return Err(TableError::not_found(EntityKind::HeaderRow, &cell.row_id));
            }
        }
        for cell in &self.footer_cells {
            self.column(&cell.column_id)?;
            if !self.footer_rows.iter().any(|r| r.id == cell.row_id) {
                return Err(TableError::not_found(EntityKind::FooterRow, &cell.row_id));
            }
        }
        for cell in &self.body_cells {
            let column = self.column(&cell.column_id)?;
            self.body_row(&cell.row_id)?;
            if column.cell_type.is_tag() {
                for tag_id in &cell.tag_ids {
                    if column.tag(tag_id).is_none() {
                        return Err(TableError::not_found(EntityKind::Tag, tag_id));
                    }
                }
            }
        }
        for column in &self.columns {
            self.column_name(&column.id)?;
            for row in &self.body_rows {
                self.body_cell_at(&column.id, &row.id)?;
            }
        }
        for rule in &self.filter_rules {
            self.column(&rule.column_id)?;
        }
        Ok(())
    }
}

pub fn is_checked(markdown: &str) -> bool {
    markdown.trim() == CHECKBOX_MARKDOWN_CHECKED
}

pub fn checkbox_markdown(checked: bool) -> &'static str {
    if checked {
        CHECKBOX_MARKDOWN_CHECKED
    } else {
        CHECKBOX_MARKDOWN_UNCHECKED
    }
}
