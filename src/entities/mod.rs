// Entity kinds managed by the registry
//
// Each kind is one schema + one CSV file under the data directory. The
// schemas are configuration; all behaviour lives in the generic Repository.

pub mod athlete;
pub mod coach;
pub mod discipline;

use crate::error::Result;
use crate::repository::Repository;
use crate::schema::Schema;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Athlete,
    Coach,
    Discipline,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Coach, EntityKind::Athlete, EntityKind::Discipline];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Athlete => "athlete",
            EntityKind::Coach => "coach",
            EntityKind::Discipline => "discipline",
        }
    }

    /// Plural label for menus
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Athlete => "Athletes",
            EntityKind::Coach => "Coaches",
            EntityKind::Discipline => "Disciplines",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            EntityKind::Athlete => athlete::FILE_NAME,
            EntityKind::Coach => coach::FILE_NAME,
            EntityKind::Discipline => discipline::FILE_NAME,
        }
    }

    pub fn schema(&self) -> Result<Schema> {
        match self {
            EntityKind::Athlete => athlete::schema(),
            EntityKind::Coach => coach::schema(),
            EntityKind::Discipline => discipline::schema(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "athlete" | "athletes" => Ok(EntityKind::Athlete),
            "coach" | "coaches" => Ok(EntityKind::Coach),
            "discipline" | "disciplines" => Ok(EntityKind::Discipline),
            other => Err(format!(
                "unknown entity '{}' (expected athlete, coach or discipline)",
                other
            )),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// One repository per entity kind, all under the same data directory
pub struct Registry {
    athletes: Repository,
    coaches: Repository,
    disciplines: Repository,
}

impl Registry {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let open = |kind: EntityKind| -> Result<Repository> {
            Repository::open(kind.schema()?, data_dir.join(kind.file_name()))
        };

        Ok(Registry {
            athletes: open(EntityKind::Athlete)?,
            coaches: open(EntityKind::Coach)?,
            disciplines: open(EntityKind::Discipline)?,
        })
    }

    pub fn repository(&self, kind: EntityKind) -> &Repository {
        match kind {
            EntityKind::Athlete => &self.athletes,
            EntityKind::Coach => &self.coaches,
            EntityKind::Discipline => &self.disciplines,
        }
    }
}
