// 📋 Coach schema
// Same key and contact rules as athletes, plus the athlete being coached.

use crate::error::Result;
use crate::schema::{FieldDefinition, FieldRule, Schema};

pub const FILE_NAME: &str = "coach.csv";

pub const ID: &str = "ID";
pub const FIRST_NAME: &str = "First Name";
pub const PATERNAL_SURNAME: &str = "Paternal Surname";
pub const MATERNAL_SURNAME: &str = "Maternal Surname";
pub const NATIONALITY: &str = "Nationality";
pub const BIRTH_DATE: &str = "Birth Date";
pub const ATHLETE: &str = "Athlete";
pub const DISCIPLINE: &str = "Discipline";
pub const PHONE: &str = "Phone";
pub const EMAIL: &str = "Email";

pub fn schema() -> Result<Schema> {
    Schema::builder("coach")
        .field(FieldDefinition::new(ID).with_rule(FieldRule::Integer))
        .field(FieldDefinition::new(FIRST_NAME))
        .field(FieldDefinition::new(PATERNAL_SURNAME))
        .field(FieldDefinition::new(MATERNAL_SURNAME).optional())
        .field(FieldDefinition::new(NATIONALITY))
        .field(FieldDefinition::new(BIRTH_DATE).with_rule(FieldRule::Date))
        .field(FieldDefinition::new(ATHLETE))
        .field(FieldDefinition::new(DISCIPLINE))
        .field(FieldDefinition::new(PHONE).with_rule(FieldRule::PhoneList))
        .field(FieldDefinition::new(EMAIL).optional().with_rule(FieldRule::EmailList))
        .key([ID])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_schema_shape() {
        let schema = schema().unwrap();
        assert_eq!(
            schema.field_names(),
            vec![
                ID,
                FIRST_NAME,
                PATERNAL_SURNAME,
                MATERNAL_SURNAME,
                NATIONALITY,
                BIRTH_DATE,
                ATHLETE,
                DISCIPLINE,
                PHONE,
                EMAIL
            ]
        );
        assert_eq!(schema.key_indices(), &[0]);
        assert_eq!(schema.field(EMAIL).unwrap().rule, Some(FieldRule::EmailList));
    }
}
