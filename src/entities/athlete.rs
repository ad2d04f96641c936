// 🏃 Athlete schema
// Numeric ID key, exact match. Maternal surname and email may be empty.

use crate::error::Result;
use crate::schema::{FieldDefinition, FieldRule, Schema};

pub const FILE_NAME: &str = "athlete.csv";

pub const ID: &str = "ID";
pub const FIRST_NAME: &str = "First Name";
pub const PATERNAL_SURNAME: &str = "Paternal Surname";
pub const MATERNAL_SURNAME: &str = "Maternal Surname";
pub const NATIONALITY: &str = "Nationality";
pub const BIRTH_DATE: &str = "Birth Date";
pub const DISCIPLINE: &str = "Discipline";
pub const GENDER: &str = "Gender";
pub const PHONE: &str = "Phone";
pub const EMAIL: &str = "Email";

pub fn schema() -> Result<Schema> {
    Schema::builder("athlete")
        .field(FieldDefinition::new(ID).with_rule(FieldRule::Integer))
        .field(FieldDefinition::new(FIRST_NAME))
        .field(FieldDefinition::new(PATERNAL_SURNAME))
        .field(FieldDefinition::new(MATERNAL_SURNAME).optional())
        .field(FieldDefinition::new(NATIONALITY))
        .field(FieldDefinition::new(BIRTH_DATE).with_rule(FieldRule::Date))
        .field(FieldDefinition::new(DISCIPLINE))
        .field(FieldDefinition::new(GENDER))
        .field(FieldDefinition::new(PHONE).with_rule(FieldRule::PhoneList))
        .field(FieldDefinition::new(EMAIL).optional().with_rule(FieldRule::EmailList))
        .key([ID])
        .build()
}
