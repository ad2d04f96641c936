// 🖥️ Interactive text menus
// Main menu picks an entity kind, the entity menu drives the repository.
// Prompts come from the schema, so every kind shares the same loop.
// End of input anywhere behaves like choosing Exit.

use crate::entities::{EntityKind, Registry};
use crate::record::Key;
use crate::repository::Repository;
use std::io::{self, BufRead, Write};

enum Flow {
    Back,
    Quit,
}

pub struct Menu<'a, R, W> {
    registry: &'a Registry,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(registry: &'a Registry, input: R, output: W) -> Self {
        Menu {
            registry,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Main Menu ---")?;
            for (index, kind) in EntityKind::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, kind.label())?;
            }
            writeln!(self.output, "{}. Exit", EntityKind::ALL.len() + 1)?;

            let Some(choice) = self.prompt("Select an option")? else {
                return Ok(());
            };

            let kind = match choice.parse::<usize>() {
                Ok(n) if (1..=EntityKind::ALL.len()).contains(&n) => EntityKind::ALL[n - 1],
                Ok(n) if n == EntityKind::ALL.len() + 1 => {
                    writeln!(self.output, "Goodbye.")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option, pick one from the menu.")?;
                    continue;
                }
            };

            if let Flow::Quit = self.entity_menu(kind)? {
                return Ok(());
            }
        }
    }

    fn entity_menu(&mut self, kind: EntityKind) -> io::Result<Flow> {
        let registry = self.registry;
        let repo = registry.repository(kind);

        loop {
            writeln!(self.output, "\n--- {} ---", kind.label())?;
            writeln!(self.output, "1. Add")?;
            writeln!(self.output, "2. Show")?;
            writeln!(self.output, "3. Edit")?;
            writeln!(self.output, "4. Remove")?;
            writeln!(self.output, "5. List")?;
            writeln!(self.output, "6. Back")?;

            let Some(choice) = self.prompt("Select an option")? else {
                return Ok(Flow::Quit);
            };

            let step = match choice.as_str() {
                "1" => self.add(repo)?,
                "2" => self.show(repo)?,
                "3" => self.edit(repo)?,
                "4" => self.remove(repo)?,
                "5" => self.list(repo)?,
                "6" => return Ok(Flow::Back),
                _ => {
                    writeln!(self.output, "Invalid option, pick one from the menu.")?;
                    Some(())
                }
            };

            if step.is_none() {
                return Ok(Flow::Quit);
            }
        }
    }

    /// `None` means input ran out
    fn add(&mut self, repo: &Repository) -> io::Result<Option<()>> {
        let mut values = Vec::with_capacity(repo.schema().field_count());
        for field in repo.schema().fields() {
            let label = match (field.rule, field.optional) {
                (Some(rule), true) => format!("{} ({}, optional)", field.name, rule.hint()),
                (Some(rule), false) => format!("{} ({})", field.name, rule.hint()),
                (None, true) => format!("{} (optional)", field.name),
                (None, false) => field.name.clone(),
            };
            let Some(value) = self.prompt(&label)? else {
                return Ok(None);
            };
            values.push(value);
        }

        match repo.create(values) {
            Ok(_) => writeln!(self.output, "Record created.")?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Some(()))
    }

    fn show(&mut self, repo: &Repository) -> io::Result<Option<()>> {
        let Some(key) = self.prompt_key(repo)? else {
            return Ok(None);
        };
        match repo.read(key) {
            Ok(record) => writeln!(self.output, "{}", record)?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Some(()))
    }

    fn edit(&mut self, repo: &Repository) -> io::Result<Option<()>> {
        let Some(key) = self.prompt_key(repo)? else {
            return Ok(None);
        };
        let Some(field) = self.prompt("Field to edit")? else {
            return Ok(None);
        };
        let Some(value) = self.prompt("New value")? else {
            return Ok(None);
        };

        match repo.update(key, &field, &value) {
            Ok(_) => writeln!(self.output, "{} updated.", field)?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Some(()))
    }

    fn remove(&mut self, repo: &Repository) -> io::Result<Option<()>> {
        let Some(key) = self.prompt_key(repo)? else {
            return Ok(None);
        };
        match repo.delete(&key) {
            Ok(_) => writeln!(self.output, "Record {} removed.", key)?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Some(()))
    }

    fn list(&mut self, repo: &Repository) -> io::Result<Option<()>> {
        match repo.list() {
            Ok(records) if records.is_empty() => writeln!(self.output, "No records.")?,
            Ok(records) => {
                for record in records {
                    writeln!(self.output, "{}\n", record)?;
                }
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Some(()))
    }

    fn prompt_key(&mut self, repo: &Repository) -> io::Result<Option<Key>> {
        let names: Vec<String> = repo.schema().key_fields().map(|f| f.name.clone()).collect();
        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let Some(value) = self.prompt(&name)? else {
                return Ok(None);
            };
            parts.push(value);
        }
        Ok(Some(Key::from(parts)))
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_script(registry: &Registry, script: &str) -> String {
        let mut output = Vec::new();
        Menu::new(registry, Cursor::new(script.as_bytes()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_add_and_show_discipline() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::open(dir.path()).unwrap();

        // main: 3 = Disciplines; add; show; back; exit
        let script = "3\n1\nRowing\nSenior\n8\n\n2\nrowing\nSENIOR\n6\n4\n";
        let output = run_script(&registry, script);

        assert!(output.contains("Record created."));
        assert!(output.contains("Participants: 8"));
        assert!(output.contains("Goodbye."));
        assert_eq!(registry.repository(EntityKind::Discipline).count().unwrap(), 1);
    }

    #[test]
    fn test_errors_are_reported_and_menu_continues() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::open(dir.path()).unwrap();

        // 2 = Athletes; show missing id; edit key field; back; exit
        let script = "2\n2\n99\n3\n99\nID\n5\n6\n4\n";
        let output = run_script(&registry, script);

        assert!(output.contains("Error: no record found with key 99"));
        assert!(output.contains("Error: ID is part of the key and cannot be modified"));
        assert!(output.contains("Goodbye."));
    }

    #[test]
    fn test_invalid_options_and_eof() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::open(dir.path()).unwrap();

        let output = run_script(&registry, "9\nx\n1\n7\n");
        assert_eq!(output.matches("Invalid option").count(), 3);
        // input ran out inside the coach menu; no panic, no goodbye
        assert!(!output.contains("Goodbye."));
    }

    #[test]
    fn test_list_and_remove_coach() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::open(dir.path()).unwrap();
        registry
            .repository(EntityKind::Coach)
            .create([
                "3", "Luis", "Perez", "", "Chilean", "1980-03-09", "Ana", "Rowing", "5551234567",
                "luis@club.org",
            ])
            .unwrap();

        let output = run_script(&registry, "1\n5\n4\n3\n5\n6\n4\n");
        assert!(output.contains("Email: luis@club.org"));
        assert!(output.contains("Record 3 removed."));
        assert!(output.contains("No records."));
    }
}
