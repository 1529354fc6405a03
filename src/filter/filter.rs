use serde_json::Value;

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{text_value, FilterCondition, SqlResult};

/// Conjunction of exact-match conditions over document fields.
///
/// Comparison is by text form and case-sensitive, the same way for both the
/// SQL rendering and [`Filter::matches`], so every store backend agrees on
/// which documents a filter selects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FilterCondition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterCondition {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an equality condition only when a non-empty value is supplied
    pub fn eq_if_present(self, field: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.eq(field, v),
            _ => self,
        }
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|condition| {
            let actual = document.get(&condition.field).and_then(text_value);
            actual == text_value(&condition.value)
        })
    }

    /// Renders `SELECT "doc" FROM "<collection>" WHERE ... ORDER BY "seq"`
    pub fn to_sql(&self, collection: &str) -> Result<SqlResult, FilterError> {
        Self::validate_collection(collection)?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let query = format!(
            "SELECT \"doc\" FROM \"{}\" WHERE {} ORDER BY \"seq\"",
            collection, where_clause
        );
        Ok(SqlResult { query, params })
    }

    pub fn validate_collection(name: &str) -> Result<(), FilterError> {
        if is_identifier(name) {
            Ok(())
        } else {
            Err(FilterError::InvalidCollection(name.to_string()))
        }
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
