//! Renders the visible part of a table as CSV or as a markdown table.

use chrono::{DateTime, TimeZone};

use crate::error::{ExportError, TableError};
use crate::state::cell_content::cell_value;
use crate::state::data_model::{Column, TableModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportType {
    Csv,
    Markdown,
}

impl ExportType {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Markdown => "text/markdown",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }
}

/// Base name for an exported file: `<view name>-YYYY_MM_DD-HH_mm_ss`.
pub fn export_file_name<Tz: TimeZone>(view_name: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let name = view_name.replace('/', "-").replace(' ', "_");
    format!("{name}-{}", now.format("%Y_%m_%d-%H_%M_%S"))
}

pub fn export(model: &TableModel, row_ids: &[String], export_type: ExportType) -> Result<String, ExportError> {
    match export_type {
        ExportType::Csv => export_csv(model, row_ids),
        ExportType::Markdown => export_markdown(model, row_ids),
    }
}

/// Header names followed by one record per row in `row_ids`, visible columns only.
pub fn export_csv(model: &TableModel, row_ids: &[String]) -> Result<String, ExportError> {
    let grid = content_grid(model, row_ids)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in &grid {
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_markdown(model: &TableModel, row_ids: &[String]) -> Result<String, ExportError> {
    let grid = content_grid(model, row_ids)?;
    let Some((header, body)) = grid.split_first() else {
        return Ok(String::new());
    };

    let mut out = String::new();
    push_markdown_row(&mut out, header);
    let divider: Vec<String> = header.iter().map(|_| "---".to_string()).collect();
    push_markdown_row(&mut out, &divider);
    for record in body {
        push_markdown_row(&mut out, record);
    }
    Ok(out)
}

fn push_markdown_row(out: &mut String, record: &[String]) {
    out.push('|');
    for value in record {
        out.push(' ');
        out.push_str(&value.replace('|', "\\|").replace('\n', "<br>"));
        out.push_str(" |");
    }
    out.push('\n');
}

fn content_grid(model: &TableModel, row_ids: &[String]) -> Result<Vec<Vec<String>>, TableError> {
    let columns: Vec<&Column> = model.columns.iter().filter(|c| c.is_visible).collect();

    let mut grid = Vec::with_capacity(row_ids.len() + 1);
    grid.push(
        columns
            .iter()
            .map(|c| model.column_name(&c.id).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
    );
    for row_id in row_ids {
        grid.push(
            columns
                .iter()
                .map(|c| cell_value(model, &c.id, row_id).map(|v| v.display_content()))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_export_file_name_replaces_separators() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            export_file_name("Projects/My table view", &now),
            "Projects-My_table_view-2024_03_05-07_08_09"
        );
    }

    #[test]
    fn test_push_markdown_row_escapes_pipes() {
        let mut out = String::new();
        push_markdown_row(&mut out, &["a|b".to_string(), "c".to_string()]);
        assert_eq!(out, "| a\\|b | c |\n");
    }
}
