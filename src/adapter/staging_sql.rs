use super::aliases::AttributeKind;
use super::mapping::{ColumnMapping, MappedColumn};

/// A synthesized dbt staging model: the target model name plus the view SQL.
/// Text only; nothing here talks to a warehouse.
#[derive(Debug, Clone)]
pub struct StagingModel {
    pub name: String,
    pub sql: String,
}

impl StagingModel {
    /// Render the staging view for a mapped dataset.
    ///
    /// Projects only mapped attributes, in alias-table order, each with its
    /// kind-driven cast. Attributes absent from the mapping are omitted
    /// outright rather than projected as nulls.
    pub fn synthesize(model_name: &str, source_name: &str, mapping: &ColumnMapping) -> Self {
        let mut lines: Vec<String> = vec![
            "{{ config(materialized='view') }}".to_string(),
            String::new(),
            "with src as (".to_string(),
            format!("  select * from {{{{ source('raw', '{source_name}') }}}}"),
            "),".to_string(),
            String::new(),
            "transformed as (".to_string(),
            "  select".to_string(),
        ];

        let select_cols: Vec<String> = mapping.iter().map(projection).collect();
        lines.push(select_cols.join(",\n"));

        lines.push("  from src".to_string());
        lines.push(")".to_string());
        lines.push(String::new());
        lines.push("select * from transformed".to_string());

        Self {
            name: model_name.to_string(),
            sql: lines.join("\n"),
        }
    }
}

fn projection(column: &MappedColumn) -> String {
    let raw = &column.raw;
    let canonical = &column.canonical;
    match column.kind {
        AttributeKind::Identifier | AttributeKind::Text => {
            format!("    cast({raw} as string) as {canonical}")
        }
        AttributeKind::Numeric => format!("    cast({raw} as numeric) as {canonical}"),
        AttributeKind::Flag | AttributeKind::Score => {
            format!("    cast({raw} as int64) as {canonical}")
        }
        AttributeKind::Date => date_projection(raw, canonical),
    }
}

/// Two date strategies: columns named with a "days" substring hold signed
/// day offsets from the processing date; everything else is parsed under
/// the fixed %d-%m-%y pattern, nulling values that do not match.
fn date_projection(raw: &str, canonical: &str) -> String {
    if raw.to_lowercase().contains("days") {
        format!("    date_add(current_date(), interval cast({raw} as int64) day) as {canonical}")
    } else {
        format!("    safe.parse_date('%d-%m-%y', cast({raw} as string)) as {canonical}")
    }
}
