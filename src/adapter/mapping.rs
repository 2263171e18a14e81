use std::collections::HashMap;

use super::aliases::{AliasTable, AttributeKind};

/// One resolved column: a canonical attribute and the raw header column
/// (original casing) that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub canonical: String,
    pub raw: String,
    pub kind: AttributeKind,
}

/// Canonical attribute → raw column mapping for one dataset, in alias-table
/// order. Attributes with no alias in the header are simply absent; partial
/// mappings are expected since datasets populate different subsets of the
/// canonical schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<MappedColumn>,
}

impl ColumnMapping {
    /// Derive the mapping for a header. A pure function of the header and
    /// the alias table: for each canonical attribute the first alias
    /// present in the header (case-insensitive) wins.
    pub fn derive(columns: &[String], table: &AliasTable) -> Self {
        let by_lower: HashMap<String, &str> = columns
            .iter()
            .map(|c| (c.to_lowercase(), c.as_str()))
            .collect();

        let mut entries = Vec::new();
        for attribute in &table.attributes {
            let found = attribute
                .aliases
                .iter()
                .find_map(|alias| by_lower.get(alias.as_str()).copied());
            if let Some(raw) = found {
                entries.push(MappedColumn {
                    canonical: attribute.name.clone(),
                    raw: raw.to_string(),
                    kind: attribute.kind,
                });
            }
        }
        Self { entries }
    }

    /// Raw column mapped to a canonical attribute, if any.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.canonical == canonical)
            .map(|e| e.raw.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappedColumn> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
