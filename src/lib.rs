// Sports Registry - Core Library
// Athletes, coaches and disciplines stored as validated CSV flat files.
// Exposes all modules for use in the CLI, the interactive menus, and tests.

pub mod error;
pub mod validation;     // Validation Engine - pure field shape checks
pub mod schema;         // Schemas: fields, key, optional fields, rules
pub mod record;         // Records and keys
pub mod store;          // CSV flat-file store + atomic regeneration
pub mod repository;     // Generic schema-validated repository
pub mod entities;       // Athlete / coach / discipline schemas
pub mod config;
pub mod menu;

// Re-export commonly used types
pub use error::{RepositoryError, Result};
pub use validation::{
    Verdict,
    id_is_numeric, date_is_valid, phone_list_valid, email_list_valid,
    field_count_matches, required_fields_present, split_list,
};
pub use schema::{Schema, SchemaBuilder, FieldDefinition, FieldRule, KeyMatch};
pub use record::{Key, Record};
pub use store::{FlatFileStore, StoreContents};
pub use repository::Repository;
pub use entities::{EntityKind, Registry};
pub use config::RegistryConfig;
pub use menu::Menu;
