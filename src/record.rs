// Records and keys
// A Record is one row of a store, paired with the schema's field names.

use crate::error::{RepositoryError, Result};
use crate::schema::Schema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

// ============================================================================
// KEY
// ============================================================================

/// Values of a schema's key fields, in key order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(vec![value.to_string()])
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(vec![value])
    }
}

impl From<Vec<String>> for Key {
    fn from(parts: Vec<String>) -> Self {
        Key(parts)
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(parts: [&str; N]) -> Self {
        Key::new(parts)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One entity: field name → value, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Pair `values` with the schema's field names
    pub fn from_values<I, S>(schema: &Schema, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != schema.field_count() {
            return Err(RepositoryError::FieldCount {
                expected: schema.field_count(),
                actual: values.len(),
            });
        }
        Ok(Self::from_row(schema, values))
    }

    /// Caller guarantees the value count matches the schema
    pub(crate) fn from_row(schema: &Schema, values: Vec<String>) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|f| f.name.clone())
            .zip(values)
            .collect();
        Record { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

// Serialized as a map so field order survives into JSON output
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
