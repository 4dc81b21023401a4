//! Project store: renovation progress records keyed by name
//!
//! Project updates are not announced to residents, so nothing here sends
//! notifications.

use crate::sheet::Sheet;
use crate::table::{Row, TabularStore};
use crate::{Config, Error, Project, ProjectStatus, Result, rows, validate};
use std::sync::Arc;

/// Manager for the project sheet
#[derive(Clone)]
pub struct ProjectStore {
    sheet: Sheet,
}

impl ProjectStore {
    pub fn new(config: &Config, tables: Arc<dyn TabularStore>) -> Self {
        Self {
            sheet: Sheet::new(tables, &config.sheets.projects, config.max_write_attempts),
        }
    }

    /// All projects in stored order
    pub fn list_all(&self) -> Result<Vec<Project>> {
        let table = self.sheet.read()?;
        table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| rows::project_from_row(self.sheet.name(), index, row))
            .collect()
    }

    /// Look up a project by name
    pub fn find(&self, name: &str) -> Result<Project> {
        let table = self.sheet.read()?;
        let index = position(&table.rows, name).ok_or_else(|| Error::project_not_found(name))?;
        rows::project_from_row(self.sheet.name(), index, &table.rows[index])
    }

    /// Add a new project
    pub fn create(&self, name: &str, progress: i64, status: &str, note: &str) -> Result<Project> {
        let name = validate::required("project name", name)?;
        let progress = validate::progress(progress)?;
        let status: ProjectStatus = status.parse()?;
        let project = Project::new(name, progress, status, note.trim().to_string());

        self.sheet.modify(|table| {
            if position(table, &project.name).is_some() {
                return Err(Error::AlreadyExists {
                    kind: "Project",
                    key: project.name.clone(),
                });
            }
            table.push(rows::project_to_row(&project));
            Ok(())
        })?;

        tracing::info!(name = %project.name, progress = project.progress, "Project created");
        Ok(project)
    }

    /// Record progress on an existing project
    ///
    /// Progress outside 0-100 is rejected, not clamped. A blank note keeps
    /// the stored one.
    pub fn update(&self, name: &str, progress: i64, status: &str, note: &str) -> Result<Project> {
        let progress = validate::progress(progress)?;
        let status: ProjectStatus = status.parse()?;

        let project = self.sheet.modify(|table| {
            let index = position(table, name).ok_or_else(|| Error::project_not_found(name))?;
            let mut project = rows::project_from_row(self.sheet.name(), index, &table[index])?;
            project.progress = progress;
            project.status = status;
            let note = note.trim();
            if !note.is_empty() {
                project.note = note.to_string();
            }
            rows::write_project(&mut table[index], &project);
            Ok(project)
        })?;

        tracing::info!(
            name = %project.name,
            progress = project.progress,
            status = %project.status,
            "Project updated"
        );
        Ok(project)
    }
}

fn position(table: &[Row], name: &str) -> Option<usize> {
    let wanted = name.trim();
    if wanted.is_empty() {
        return None;
    }
    table
        .iter()
        .position(|row| rows::project_name(row).is_some_and(|cell| cell.trim() == wanted))
}
