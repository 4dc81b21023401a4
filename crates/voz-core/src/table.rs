//! Tabular store: named sheets read and written as whole snapshots
//!
//! The sheet backend is an external collaborator. Callers read a full
//! table, change it in memory and write the full table back. Each snapshot
//! carries a [`Revision`] so a write can be refused when someone else wrote
//! the sheet in between.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// One sheet row: column name to cell value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Content digest of a sheet snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(String);

impl Revision {
    /// Digest an ordered sequence of rows
    pub fn of(rows: &[Row]) -> Result<Self> {
        let mut hasher = Sha256::new();
        for row in rows {
            hasher.update(serde_json::to_vec(row)?);
            hasher.update(b"\n");
        }
        let hash = hasher.finalize();
        let encoded = base32::encode(base32::Alphabet::Crockford, &hash[..10]).to_lowercase();
        Ok(Self(encoded))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full snapshot of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
    pub revision: Revision,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Result<Self> {
        let revision = Revision::of(&rows)?;
        Ok(Self { rows, revision })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Remote sheet collaborator
///
/// A sheet that was never written reads as empty.
pub trait TabularStore: Send + Sync {
    /// Read the whole sheet
    fn read(&self, sheet: &str) -> Result<Table>;

    /// Overwrite the whole sheet unconditionally
    fn write(&self, sheet: &str, rows: &[Row]) -> Result<Revision>;

    /// Overwrite the whole sheet only if it is still at `expected`
    ///
    /// Returns [`Error::Conflict`] when the sheet moved on.
    fn write_if(&self, sheet: &str, expected: &Revision, rows: &[Row]) -> Result<Revision>;
}

/// In-process sheets, used for tests and throwaway runs
#[derive(Default)]
pub struct MemoryTables {
    sheets: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>>> {
        self.sheets
            .lock()
            .map_err(|_| Error::Store("sheet lock poisoned".to_string()))
    }
}

impl TabularStore for MemoryTables {
    fn read(&self, sheet: &str) -> Result<Table> {
        let sheets = self.lock()?;
        Table::new(sheets.get(sheet).cloned().unwrap_or_default())
    }

    fn write(&self, sheet: &str, rows: &[Row]) -> Result<Revision> {
        let mut sheets = self.lock()?;
        sheets.insert(sheet.to_string(), rows.to_vec());
        Revision::of(rows)
    }

    fn write_if(&self, sheet: &str, expected: &Revision, rows: &[Row]) -> Result<Revision> {
        let mut sheets = self.lock()?;
        let current = Revision::of(sheets.get(sheet).map(Vec::as_slice).unwrap_or_default())?;
        if &current != expected {
            return Err(Error::Conflict(sheet.to_string()));
        }
        sheets.insert(sheet.to_string(), rows.to_vec());
        Revision::of(rows)
    }
}

/// JSONL-backed sheets: one `<sheet>.jsonl` file per sheet
///
/// Writes go to a temporary file that is renamed over the sheet, so a
/// reader never sees half a table. Writers hold an exclusive lock on
/// `<sheet>.lock` from the revision check until the rename, which keeps
/// separate processes sharing the directory from overwriting each other.
pub struct JsonlTables {
    dir: PathBuf,
    writes: Mutex<()>,
}

impl JsonlTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writes: Mutex::new(()),
        }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", sheet))
    }

    fn load(&self, sheet: &str) -> Result<Vec<Row>> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }

        Ok(rows)
    }

    fn save(&self, sheet: &str, rows: &[Row]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.sheet_path(sheet);
        let tmp = path.with_extension("jsonl.tmp");

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.writes
            .lock()
            .map_err(|_| Error::Store("sheet write lock poisoned".to_string()))
    }

    /// Exclusive lock on a sheet across processes, released on drop
    fn lock_sheet(&self, sheet: &str) -> Result<File> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(format!("{}.lock", sheet)))?;
        file.lock()?;
        Ok(file)
    }
}

impl TabularStore for JsonlTables {
    fn read(&self, sheet: &str) -> Result<Table> {
        Table::new(self.load(sheet)?)
    }

    fn write(&self, sheet: &str, rows: &[Row]) -> Result<Revision> {
        let _guard = self.guard()?;
        let _lock = self.lock_sheet(sheet)?;
        self.save(sheet, rows)?;
        Revision::of(rows)
    }

    fn write_if(&self, sheet: &str, expected: &Revision, rows: &[Row]) -> Result<Revision> {
        let _guard = self.guard()?;
        let _lock = self.lock_sheet(sheet)?;
        let current = Revision::of(&self.load(sheet)?)?;
        if &current != expected {
            return Err(Error::Conflict(sheet.to_string()));
        }
        self.save(sheet, rows)?;
        Revision::of(rows)
    }
}
