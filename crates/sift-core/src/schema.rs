//! Discovered database schema.
//!
//! The schema is produced by the external introspection service and is only
//! ever replaced wholesale. Backends disagree on how much detail they send
//! per column, so decoding accepts both the bare-name and the object form.

use serde::{Deserialize, Serialize};

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The tables and relationships of the attached data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
  /// Engine name reported by the backend (`"PostgreSQL"`, `"SQLite"`, ...).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub database_type: Option<String>,
  #[serde(default)]
  pub tables:        Vec<Table>,
  #[serde(default)]
  pub relationships: Vec<Relationship>,
}

impl Schema {
  /// Look up a table by exact name.
  pub fn table(&self, name: &str) -> Option<&Table> {
    self.tables.iter().find(|t| t.name == name)
  }

  /// Total number of columns across all tables.
  pub fn column_count(&self) -> usize {
    self.tables.iter().map(|t| t.columns.len()).sum()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
  pub name:    String,
  /// Free-text description of what the table holds, when the backend
  /// infers one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub purpose: Option<String>,
  #[serde(default)]
  pub columns: Vec<Column>,
}

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawColumn")]
pub struct Column {
  pub name:        String,
  /// Backend-specific type name; empty when the backend only sent a name.
  #[serde(rename = "type")]
  pub data_type:   String,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub primary_key: bool,
  /// `table.column` this column references, if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub foreign_key: Option<String>,
}

impl Column {
  pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
    Self {
      name:        name.into(),
      data_type:   data_type.into(),
      primary_key: false,
      foreign_key: None,
    }
  }
}

/// Wire shapes accepted for a column.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumn {
  Name(String),
  Full {
    name:        String,
    #[serde(rename = "type", default)]
    data_type:   String,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    foreign_key: Option<String>,
  },
}

impl From<RawColumn> for Column {
  fn from(raw: RawColumn) -> Self {
    match raw {
      RawColumn::Name(name) => Column::new(name, ""),
      RawColumn::Full {
        name,
        data_type,
        primary_key,
        foreign_key,
      } => Column {
        name,
        data_type,
        primary_key,
        foreign_key,
      },
    }
  }
}

// ─── Relationships ───────────────────────────────────────────────────────────

/// A foreign-key style link between two `table.column` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub from: String,
  pub to:   String,
  /// Cardinality, e.g. `"many_to_one"`.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
}
