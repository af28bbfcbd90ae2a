use serde::Serialize;
use serde_json::Value;

use super::error::FilterError;
use super::types::{Document, FilterData, Page};

/// Equality filter plus an optional offset window, evaluated either in memory
/// or as a JSONB containment query.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    data: FilterData,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value` on every matching document.
    pub fn eq(&mut self, field: &str, value: impl Serialize) -> Result<&mut Self, FilterError> {
        Self::validate_field_name(field)?;
        let value = serde_json::to_value(value)?;
        self.data.where_clause.insert(field.to_string(), value);
        Ok(self)
    }

    pub fn page(&mut self, page: Page) -> Result<&mut Self, FilterError> {
        Self::validate_window("Offset", page.skip)?;
        Self::validate_window("Limit", page.limit)?;
        self.data.offset = Some(page.skip);
        self.data.limit = Some(page.limit);
        Ok(self)
    }

    pub fn offset(&self) -> u64 {
        self.data.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> Option<u64> {
        self.data.limit
    }

    /// True when every where-clause field is present in `doc` with an equal value.
    pub fn matches(&self, doc: &Document) -> bool {
        self.data
            .where_clause
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// The where clause as a JSON object, suitable for `doc @> $1::jsonb`.
    pub fn containment(&self) -> Value {
        Value::Object(self.data.where_clause.clone())
    }

    /// Apply the offset/limit window to an already-filtered sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let skipped = items.into_iter().skip(offset);
        match self.data.limit {
            Some(limit) => skipped.take(usize::try_from(limit).unwrap_or(usize::MAX)).collect(),
            None => skipped.collect(),
        }
    }

    fn validate_field_name(field: &str) -> Result<(), FilterError> {
        let mut chars = field.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_lowercase() || c == '_')
            .unwrap_or(false);
        let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_start || !valid_rest {
            return Err(FilterError::InvalidField(field.to_string()));
        }
        Ok(())
    }

    /// SQL takes signed 64-bit OFFSET and LIMIT values.
    fn validate_window(what: &str, value: u64) -> Result<(), FilterError> {
        if value > i64::MAX as u64 {
            return Err(FilterError::InvalidWindow(format!("{} {} is out of range", what, value)));
        }
        Ok(())
    }
}
