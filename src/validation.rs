// ✅ Validation Engine - field shape checks
// Pure functions, no I/O. Each check fails closed and explains why.
//
// Entity kinds compose only the checks their fields need: disciplines use
// none of the date/phone/email rules, athletes and coaches use all of them.

use crate::schema::Schema;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed calendar date format for date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{10}$").expect("phone pattern is a valid regex")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@,]+@[a-zA-Z]+\.[a-zA-Z]+$").expect("email pattern is a valid regex")
});

// ============================================================================
// VERDICT
// ============================================================================

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    /// Field the failure is about, when the check knows it
    pub field: Option<String>,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Verdict {
            passed: true,
            field: None,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Verdict {
            passed: false,
            field: None,
            reason: Some(reason.into()),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.passed
    }

    /// Turn a failed verdict into a `Validation` error for `field`
    /// (a field recorded on the verdict itself takes precedence).
    pub fn into_result(self, field: &str) -> crate::error::Result<()> {
        if self.passed {
            return Ok(());
        }
        Err(crate::error::RepositoryError::Validation {
            field: self.field.unwrap_or_else(|| field.to_string()),
            reason: self
                .reason
                .unwrap_or_else(|| "validation failed".to_string()),
        })
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// The value parses as an integer
pub fn id_is_numeric(value: &str) -> Verdict {
    match value.parse::<i64>() {
        Ok(_) => Verdict::pass(),
        Err(_) => Verdict::fail(format!("'{}' is not an integer", value)),
    }
}

/// The value is a real calendar date written as YYYY-MM-DD
pub fn date_is_valid(value: &str) -> Verdict {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(_) => Verdict::pass(),
        Err(_) => Verdict::fail(format!("'{}' is not a valid YYYY-MM-DD date", value)),
    }
}

/// Every entry is exactly ten digits once whitespace is removed
pub fn phone_list_valid<S: AsRef<str>>(values: &[S]) -> Verdict {
    if values.is_empty() {
        return Verdict::fail("at least one phone number is required");
    }

    for value in values {
        let compact = strip_whitespace(value.as_ref());
        if !PHONE_PATTERN.is_match(&compact) {
            return Verdict::fail(format!(
                "phone number '{}' must have exactly 10 digits",
                value.as_ref()
            ));
        }
    }

    Verdict::pass()
}

/// Every entry looks like local@domain.tld
pub fn email_list_valid<S: AsRef<str>>(values: &[S]) -> Verdict {
    if values.is_empty() {
        return Verdict::fail("at least one email address is required");
    }

    for value in values {
        let compact = strip_whitespace(value.as_ref());
        if !EMAIL_PATTERN.is_match(&compact) {
            return Verdict::fail(format!("email '{}' is not valid", value.as_ref()));
        }
    }

    Verdict::pass()
}

/// The number of supplied values equals the schema's field count
pub fn field_count_matches<S: AsRef<str>>(values: &[S], schema: &Schema) -> Verdict {
    if values.len() == schema.field_count() {
        Verdict::pass()
    } else {
        Verdict::fail(format!(
            "expected {} values, got {}",
            schema.field_count(),
            values.len()
        ))
    }
}

/// Every non-optional field has a non-empty value.
///
/// Assumes the field count already matches; missing trailing values count
/// as empty.
pub fn required_fields_present<S: AsRef<str>>(values: &[S], schema: &Schema) -> Verdict {
    for (index, field) in schema.fields().iter().enumerate() {
        if field.optional {
            continue;
        }
        let value = values.get(index).map(|v| v.as_ref()).unwrap_or("");
        if value.is_empty() {
            return Verdict::fail("required field is empty").with_field(&field.name);
        }
    }

    Verdict::pass()
}

/// Split a multi-valued field ("555 123 4567, 5550000000") into entries
pub fn split_list(value: &str) -> Vec<String> {
    strip_whitespace(value)
        .split(',')
        .map(str::to_string)
        .collect()
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
