// 🗄️ Flat-File Store - CSV persistence for one entity kind
//
// File layout: one header line of field names, then one line per record.
// Quoting follows RFC 4180 (csv crate, QuoteStyle::Necessary), so values with
// commas, quotes or newlines round-trip exactly.
//
// Mutations other than append regenerate the whole file into a temporary
// sibling and rename it over the original in one call. Until the rename the
// original is untouched; after it the new contents are in place.
//
// Single writer only. Two processes regenerating the same store at once will
// lose one of the updates; there is no file locking.

use crate::error::{RepositoryError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Header plus every data row, as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContents {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct FlatFileStore {
    path: PathBuf,
    field_count: usize,
}

impl FlatFileStore {
    /// Open the store at `path`, creating it with `header` if absent.
    ///
    /// A file with no header line (zero bytes, or blank lines only) counts as
    /// absent and gets the header. An existing file whose header differs from
    /// `header` is not rejected; the mismatch is logged and later reads fail
    /// on rows of the wrong width.
    pub fn open<S: AsRef<str>>(path: impl AsRef<Path>, header: &[S]) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = FlatFileStore {
            path,
            field_count: header.len(),
        };

        let existing = match fs::metadata(&store.path) {
            Ok(meta) if meta.len() == 0 => None,
            Ok(_) => Some(store.read_header()?).filter(|h| !h.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(RepositoryError::io(&store.path, e)),
        };

        match existing {
            Some(existing) => {
                let expected: Vec<&str> = header.iter().map(|h| h.as_ref()).collect();
                if existing != expected {
                    warn!(
                        store = %store.path.display(),
                        expected = ?expected,
                        found = ?existing,
                        "store header does not match schema"
                    );
                }
            }
            None => store.create(header)?,
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header-only store through the same temp + rename swap as
    /// `replace_all`, so a store without its header never appears on disk.
    fn create<S: AsRef<str>>(&self, header: &[S]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| RepositoryError::io(parent, e))?;
            }
        }

        self.replace_all(header, &[])?;

        info!(store = %self.path.display(), fields = header.len(), "created store");
        Ok(())
    }

    fn reader(&self) -> Result<csv::Reader<File>> {
        ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(&self.path)
            .map_err(|e| RepositoryError::csv(&self.path, e))
    }

    pub fn read_header(&self) -> Result<Vec<String>> {
        let mut reader = self.reader()?;
        let header = reader
            .headers()
            .map_err(|e| RepositoryError::csv(&self.path, e))?;
        Ok(header.iter().map(str::to_string).collect())
    }

    fn check_width(&self, record: &StringRecord) -> Result<Vec<String>> {
        if record.len() != self.field_count {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(RepositoryError::MalformedStore {
                path: self.path.clone(),
                reason: format!(
                    "line {} has {} fields, expected {}",
                    line,
                    record.len(),
                    self.field_count
                ),
            });
        }
        Ok(record.iter().map(str::to_string).collect())
    }

    /// Scan from the first data line; stop at the first row `matches` accepts
    pub fn find<F>(&self, mut matches: F) -> Result<Option<Vec<String>>>
    where
        F: FnMut(&[String]) -> bool,
    {
        let mut reader = self.reader()?;
        let mut scanned = 0usize;

        for result in reader.records() {
            let record = result.map_err(|e| RepositoryError::csv(&self.path, e))?;
            let row = self.check_width(&record)?;
            scanned += 1;
            if matches(&row) {
                debug!(store = %self.path.display(), scanned, "row matched");
                return Ok(Some(row));
            }
        }

        debug!(store = %self.path.display(), scanned, "no row matched");
        Ok(None)
    }

    pub fn read_all(&self) -> Result<StoreContents> {
        let mut reader = self.reader()?;
        let header = reader
            .headers()
            .map_err(|e| RepositoryError::csv(&self.path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| RepositoryError::csv(&self.path, e))?;
            rows.push(self.check_width(&record)?);
        }

        Ok(StoreContents { header, rows })
    }

    /// Append one row and sync it to disk
    pub fn append<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RepositoryError::io(&self.path, e))?;

        // A hand-edited file may lack the final newline
        if !ends_with_newline(&mut file).map_err(|e| RepositoryError::io(&self.path, e))? {
            file.write_all(b"\n")
                .map_err(|e| RepositoryError::io(&self.path, e))?;
        }

        let mut writer = WriterBuilder::new().from_writer(file);
        writer
            .write_record(values.iter().map(|v| v.as_ref()))
            .map_err(|e| RepositoryError::csv(&self.path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| RepositoryError::io(&self.path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| RepositoryError::io(&self.path, e))?;

        Ok(())
    }

    /// Regenerate the store from `header` and `rows`, then swap it in
    pub fn replace_all<S: AsRef<str>>(&self, header: &[S], rows: &[Vec<String>]) -> Result<()> {
        let temp_path = temp_path_for(&self.path);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| RepositoryError::io(&temp_path, e))?;
        let mut pending = PendingReplacement::new(temp_path.clone());

        let mut writer = WriterBuilder::new().from_writer(file);
        writer
            .write_record(header.iter().map(|h| h.as_ref()))
            .map_err(|e| RepositoryError::csv(&temp_path, e))?;
        for row in rows {
            writer
                .write_record(row)
                .map_err(|e| RepositoryError::csv(&temp_path, e))?;
        }
        let file = writer
            .into_inner()
            .map_err(|e| RepositoryError::io(&temp_path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| RepositoryError::io(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| RepositoryError::io(&self.path, e))?;
        pending.commit();

        debug!(store = %self.path.display(), rows = rows.len(), "store regenerated");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    let temp_name = format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple());
    match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Removes the temporary file on drop unless the swap completed
struct PendingReplacement {
    path: PathBuf,
    committed: bool,
}

impl PendingReplacement {
    fn new(path: PathBuf) -> Self {
        PendingReplacement {
            path,
            committed: false,
        }
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for PendingReplacement {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(temp = %self.path.display(), "removed leftover temporary file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(temp = %self.path.display(), error = %e, "could not remove temporary file"),
        }
    }
}
