// 🏅 Discipline schema
// Keyed by name + category, compared ignoring case. No format rules.

use crate::error::Result;
use crate::schema::{FieldDefinition, Schema};

pub const FILE_NAME: &str = "discipline.csv";

pub const NAME: &str = "Name";
pub const CATEGORY: &str = "Category";
pub const PARTICIPANTS: &str = "Participants";
pub const SPONSORS: &str = "Sponsors";

pub fn schema() -> Result<Schema> {
    Schema::builder("discipline")
        .field(FieldDefinition::new(NAME))
        .field(FieldDefinition::new(CATEGORY))
        .field(FieldDefinition::new(PARTICIPANTS))
        .field(FieldDefinition::new(SPONSORS).optional())
        .key([NAME, CATEGORY])
        .build()
}
