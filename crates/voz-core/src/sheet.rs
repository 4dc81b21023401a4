//! Optimistic read-modify-write over one sheet

use crate::table::{Row, Table, TabularStore};
use crate::{Error, Result};
use std::sync::Arc;

/// One named sheet in a tabular store
#[derive(Clone)]
pub(crate) struct Sheet {
    tables: Arc<dyn TabularStore>,
    name: String,
    attempts: u32,
}

impl Sheet {
    pub fn new(tables: Arc<dyn TabularStore>, name: impl Into<String>, attempts: u32) -> Self {
        Self {
            tables,
            name: name.into(),
            attempts: attempts.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read(&self) -> Result<Table> {
        self.tables.read(&self.name)
    }

    /// Read the sheet, let `mutate` change the rows, write them back
    ///
    /// If `mutate` fails nothing is written. If the sheet changed since it
    /// was read, the whole cycle runs again on a fresh snapshot, up to the
    /// configured number of attempts.
    pub fn modify<T>(&self, mut mutate: impl FnMut(&mut Vec<Row>) -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            let table = self.read()?;
            let mut rows = table.rows;
            let outcome = mutate(&mut rows)?;

            match self.tables.write_if(&self.name, &table.revision, &rows) {
                Ok(_) => return Ok(outcome),
                Err(Error::Conflict(_)) if attempt < self.attempts => {
                    tracing::warn!(
                        sheet = %self.name,
                        attempt,
                        "Sheet changed during update, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
