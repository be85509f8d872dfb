//! Versioned on-disk form of a table document.
//!
//! Files store `{ "model": { ... }, "pluginVersion": "x.y.z" }`. Older files
//! are upgraded field by field on the raw JSON before being typed, so every
//! version ever written keeps loading.

use serde_json::{json, Map, Value};

use crate::error::FileError;
use crate::state::data_model::{TableDocument, CURRENT_PLUGIN_VERSION, FOOTER_ROW_COUNT};
use crate::state::factory;

type Version = (u32, u32, u32);

struct Migration {
    version: &'static str,
    apply: fn(&mut Map<String, Value>) -> Result<(), String>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "6.1.0",
        apply: migrate_6_1_0,
    },
    Migration {
        version: "6.2.0",
        apply: migrate_6_2_0,
    },
    Migration {
        version: "6.3.0",
        apply: migrate_6_3_0,
    },
    Migration {
        version: "6.4.0",
        apply: migrate_6_4_0,
    },
];

pub fn parse_version(raw: &str) -> Result<Version, FileError> {
    let invalid = || FileError::InvalidVersion(raw.to_string());
    let mut parts = raw.trim().split('.').map(|p| p.parse::<u32>().map_err(|_| invalid()));
    let major = parts.next().ok_or_else(invalid)??;
    let minor = parts.next().unwrap_or(Ok(0))?;
    let patch = parts.next().unwrap_or(Ok(0))?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((major, minor, patch))
}

/// Serializes the document. Output is stable for a given document.
pub fn serialize_table_state(document: &TableDocument) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parses a stored document, upgrading older versions to the current shape.
pub fn deserialize_table_state(text: &str) -> Result<TableDocument, FileError> {
    let mut value: Value = serde_json::from_str(text)?;
    let root = value
        .as_object_mut()
        .ok_or_else(|| FileError::Migration {
            version: CURRENT_PLUGIN_VERSION.to_string(),
            message: "root is not an object".to_string(),
        })?;

    let stored = root
        .get("pluginVersion")
        .and_then(Value::as_str)
        .ok_or(FileError::MissingVersion)?
        .to_string();
    let found = parse_version(&stored)?;
    let current = parse_version(CURRENT_PLUGIN_VERSION)?;
    if found > current {
        return Err(FileError::UnsupportedVersion {
            found: stored,
            supported: CURRENT_PLUGIN_VERSION.to_string(),
        });
    }

    for migration in MIGRATIONS {
        if found < parse_version(migration.version)? {
            tracing::warn!(from = %stored, to = migration.version, "migrating table file");
            (migration.apply)(root).map_err(|message| FileError::Migration {
                version: migration.version.to_string(),
                message,
            })?;
        }
    }
    root.insert("pluginVersion".to_string(), json!(CURRENT_PLUGIN_VERSION));

    let document: TableDocument = serde_json::from_value(value)?;
    document.model.validate()?;
    Ok(document)
}

fn model_mut(root: &mut Map<String, Value>) -> Result<&mut Map<String, Value>, String> {
    root.get_mut("model")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| "missing model".to_string())
}

fn entries_mut<'a>(model: &'a mut Map<String, Value>, key: &str) -> Result<&'a mut Vec<Value>, String> {
    model
        .entry(key.to_string())
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or_else(|| format!("{key} is not an array"))
}

fn set_default(item: &mut Value, key: &str, default: Value) {
    if let Some(obj) = item.as_object_mut() {
        obj.entry(key.to_string()).or_insert(default);
    }
}

fn migrate_6_1_0(root: &mut Map<String, Value>) -> Result<(), String> {
    let model = model_mut(root)?;
    entries_mut(model, "filterRules")?;
    for cell in entries_mut(model, "bodyCells")? {
        set_default(cell, "dateTime", Value::Null);
        set_default(cell, "tagIds", json!([]));
    }
    Ok(())
}

fn migrate_6_2_0(root: &mut Map<String, Value>) -> Result<(), String> {
    let model = model_mut(root)?;
    for column in entries_mut(model, "columns")? {
        set_default(column, "shouldWrapOverflow", json!(false));
        set_default(column, "currencyType", json!("USD"));
        set_default(column, "dateFormat", json!("mm/dd/yyyy"));
    }
    Ok(())
}

fn migrate_6_3_0(root: &mut Map<String, Value>) -> Result<(), String> {
    let model = model_mut(root)?;
    let mut column_ids = Vec::new();
    for column in entries_mut(model, "columns")? {
        set_default(column, "functionType", json!("none"));
        if let Some(id) = column.get("id").and_then(Value::as_str) {
            column_ids.push(id.to_string());
        }
    }

    let mut new_rows = Vec::new();
    let footer_rows = entries_mut(model, "footerRows")?;
    while footer_rows.len() < FOOTER_ROW_COUNT {
        let row = factory::create_footer_row();
        footer_rows.push(json!({ "id": row.id }));
        new_rows.push(row.id);
    }

    let footer_cells = entries_mut(model, "footerCells")?;
    for row_id in &new_rows {
        for column_id in &column_ids {
            let cell = factory::create_footer_cell(column_id, row_id);
            footer_cells.push(serde_json::to_value(cell).map_err(|e| e.to_string())?);
        }
    }
    Ok(())
}

fn migrate_6_4_0(root: &mut Map<String, Value>) -> Result<(), String> {
    let model = model_mut(root)?;
    for row in entries_mut(model, "bodyRows")? {
        let created = row.get("creationTime").cloned().unwrap_or(json!(0));
        set_default(row, "creationTime", created.clone());
        set_default(row, "lastEditedTime", created);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("6.4.0").unwrap(), (6, 4, 0));
        assert_eq!(parse_version("7").unwrap(), (7, 0, 0));
        assert!(parse_version("6.x").is_err());
        assert!(parse_version("1.2.3.4").is_err());
        assert!(parse_version("6.10.0").unwrap() > parse_version("6.4.0").unwrap());
    }
}
