// 📐 Shape Layer - Entity Schemas
// Ordered field list + key field(s) + optional fields + per-field format rules.
// A Schema is built once and never changes while a repository holds it.

use crate::error::{RepositoryError, Result};
use crate::record::Key;
use crate::validation::{self, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// FIELD RULES
// ============================================================================

/// Declarative format rule attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRule {
    /// Whole number (IDs)
    Integer,
    /// Calendar date, YYYY-MM-DD
    Date,
    /// Comma-separated list of 10-digit phone numbers
    PhoneList,
    /// Comma-separated list of email addresses
    EmailList,
}

impl FieldRule {
    /// Input hint shown next to prompts
    pub fn hint(&self) -> &'static str {
        match self {
            FieldRule::Integer => "number",
            FieldRule::Date => "YYYY-MM-DD",
            FieldRule::PhoneList => "10 digits, comma separated",
            FieldRule::EmailList => "comma separated",
        }
    }

    pub fn check(&self, value: &str) -> Verdict {
        match self {
            FieldRule::Integer => validation::id_is_numeric(value),
            FieldRule::Date => validation::date_is_valid(value),
            FieldRule::PhoneList => validation::phone_list_valid(&validation::split_list(value)),
            FieldRule::EmailList => validation::email_list_valid(&validation::split_list(value)),
        }
    }
}

/// How stored key values are compared with a lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMatch {
    /// Byte-for-byte (numeric IDs)
    Exact,
    /// Ignoring case (name + category keys)
    CaseInsensitive,
}

impl KeyMatch {
    pub fn matches(&self, stored: &str, wanted: &str) -> bool {
        match self {
            KeyMatch::Exact => stored == wanted,
            KeyMatch::CaseInsensitive => stored.to_lowercase() == wanted.to_lowercase(),
        }
    }
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// May be left empty
    pub optional: bool,
    pub rule: Option<FieldRule>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        FieldDefinition {
            name: name.into(),
            optional: false,
            rule: None,
        }
    }

    /// Builder: allow empty values
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Builder: attach a format rule
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Check a value against this field's rule.
    ///
    /// Empty values of optional fields always pass; emptiness of required
    /// fields is the caller's concern.
    pub fn check(&self, value: &str) -> Verdict {
        if value.is_empty() && self.optional {
            return Verdict::pass();
        }
        match self.rule {
            Some(rule) => rule.check(value).with_field(&self.name),
            None => Verdict::pass(),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDefinition>,
    key: Vec<usize>,
    key_match: KeyMatch,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            key: Vec::new(),
            key_match: None,
        }
    }

    /// Entity kind name, used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    pub fn field(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == field)
    }

    /// Positions of the key fields, in key order
    pub fn key_indices(&self) -> &[usize] {
        &self.key
    }

    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.key.iter().map(move |&i| &self.fields[i])
    }

    pub fn is_key_field(&self, field: &str) -> bool {
        self.key_fields().any(|f| f.name == field)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.optional)
    }

    pub fn key_match(&self) -> KeyMatch {
        self.key_match
    }

    /// Extract the key of a full row of values
    pub fn key_of<S: AsRef<str>>(&self, values: &[S]) -> Key {
        Key::new(
            self.key
                .iter()
                .map(|&i| values.get(i).map(|v| v.as_ref()).unwrap_or("")),
        )
    }

    /// Does this row carry `key`? Keys of the wrong arity never match.
    pub fn key_matches<S: AsRef<str>>(&self, values: &[S], key: &Key) -> bool {
        if key.parts().len() != self.key.len() {
            return false;
        }
        self.key
            .iter()
            .zip(key.parts())
            .all(|(&i, wanted)| match values.get(i) {
                Some(stored) => self.key_match.matches(stored.as_ref(), wanted),
                None => false,
            })
    }
}

// ============================================================================
// SCHEMA BUILDER
// ============================================================================

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDefinition>,
    key: Vec<String>,
    key_match: Option<KeyMatch>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Override the matching mode. Defaults to exact for single-field keys
    /// and case-insensitive for composite keys.
    pub fn key_match(mut self, key_match: KeyMatch) -> Self {
        self.key_match = Some(key_match);
        self
    }

    pub fn build(self) -> Result<Schema> {
        if self.fields.is_empty() {
            return Err(invalid(&self.name, "no fields defined"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(invalid(&self.name, "field names cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(
                    &self.name,
                    &format!("field {} is defined twice", field.name),
                ));
            }
        }

        if self.key.is_empty() {
            return Err(invalid(&self.name, "no key field defined"));
        }

        let mut key = Vec::with_capacity(self.key.len());
        for name in &self.key {
            let index = self
                .fields
                .iter()
                .position(|f| &f.name == name)
                .ok_or_else(|| invalid(&self.name, &format!("key field {} is not a field", name)))?;
            if self.fields[index].optional {
                return Err(invalid(
                    &self.name,
                    &format!("key field {} cannot be optional", name),
                ));
            }
            if key.contains(&index) {
                return Err(invalid(&self.name, &format!("key field {} repeated", name)));
            }
            key.push(index);
        }

        let key_match = self.key_match.unwrap_or(if key.len() == 1 {
            KeyMatch::Exact
        } else {
            KeyMatch::CaseInsensitive
        });

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            key,
            key_match,
        })
    }
}

fn invalid(schema: &str, reason: &str) -> RepositoryError {
    RepositoryError::InvalidSchema(format!("{}: {}", schema, reason))
}
