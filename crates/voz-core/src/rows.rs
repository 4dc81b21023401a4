//! Mapping between records and sheet rows
//!
//! Column headers are the ones used by the association's existing sheets.
//! Cells are read leniently (a progress cell may hold `40`, `40.0` or
//! `"40"`) and written back in canonical form.

use crate::table::Row;
use crate::{Error, Project, ProjectStatus, Result, Subject, Ticket, TicketStatus};
use chrono::NaiveDate;
use serde_json::Value;

pub const TICKET_ID: &str = "ID";
pub const TICKET_RESIDENT: &str = "Residente";
pub const TICKET_EMAIL: &str = "Correo";
pub const TICKET_SUBJECT: &str = "Asunto";
pub const TICKET_DETAIL: &str = "Detalle";
pub const TICKET_STATUS: &str = "Estado";
pub const TICKET_RESPONSE: &str = "Respuesta_Admin";
pub const TICKET_DATE: &str = "Fecha";

pub const PROJECT_NAME: &str = "Proyecto";
pub const PROJECT_PROGRESS: &str = "Progreso";
pub const PROJECT_STATUS: &str = "Estado";
pub const PROJECT_NOTE: &str = "Nota";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Where a row sits, for error messages: sheet, 0-based position and the
/// record's key cell
struct Place<'a> {
    sheet: &'a str,
    index: usize,
    key: &'a str,
}

impl Place<'_> {
    fn malformed(&self, column: &str, detail: impl std::fmt::Display) -> Error {
        let key = if self.key.trim().is_empty() { "blank key" } else { self.key };
        Error::Store(format!(
            "row {} ({}) of sheet '{}': malformed '{}' cell: {}",
            self.index + 1,
            key,
            self.sheet,
            column,
            detail
        ))
    }
}

/// ID cell of a ticket row, if it holds text
pub fn ticket_id(row: &Row) -> Option<&str> {
    row.get(TICKET_ID).and_then(Value::as_str)
}

pub fn ticket_to_row(ticket: &Ticket) -> Row {
    let mut row = Row::new();
    write_ticket(&mut row, ticket);
    row
}

/// Overwrite the ticket columns of `row`, leaving any other columns alone
pub fn write_ticket(row: &mut Row, ticket: &Ticket) {
    row.insert(TICKET_ID.into(), ticket.id.clone().into());
    row.insert(TICKET_RESIDENT.into(), ticket.resident_name.clone().into());
    row.insert(TICKET_EMAIL.into(), ticket.resident_email.clone().into());
    row.insert(TICKET_SUBJECT.into(), ticket.subject.label().into());
    row.insert(TICKET_DETAIL.into(), ticket.detail.clone().into());
    row.insert(TICKET_STATUS.into(), ticket.status.label().into());
    row.insert(TICKET_RESPONSE.into(), ticket.admin_response.clone().into());
    row.insert(
        TICKET_DATE.into(),
        ticket.created_date.format(DATE_FORMAT).to_string().into(),
    );
}

/// Parse the ticket at position `index` of `sheet`
pub fn ticket_from_row(sheet: &str, index: usize, row: &Row) -> Result<Ticket> {
    let id = text(row, TICKET_ID);
    let place = Place {
        sheet,
        index,
        key: &id,
    };
    if id.trim().is_empty() {
        return Err(place.malformed(TICKET_ID, "empty ticket ID"));
    }

    let subject: Subject = text(row, TICKET_SUBJECT)
        .parse()
        .map_err(|e| place.malformed(TICKET_SUBJECT, e))?;
    let status: TicketStatus = text(row, TICKET_STATUS)
        .parse()
        .map_err(|e| place.malformed(TICKET_STATUS, e))?;
    let date = text(row, TICKET_DATE);
    let created_date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| place.malformed(TICKET_DATE, e))?;

    Ok(Ticket {
        id,
        resident_name: text(row, TICKET_RESIDENT),
        resident_email: text(row, TICKET_EMAIL),
        subject,
        detail: text(row, TICKET_DETAIL),
        status,
        admin_response: text(row, TICKET_RESPONSE),
        created_date,
    })
}

/// Name cell of a project row, if it holds text
pub fn project_name(row: &Row) -> Option<&str> {
    row.get(PROJECT_NAME).and_then(Value::as_str)
}

pub fn project_to_row(project: &Project) -> Row {
    let mut row = Row::new();
    write_project(&mut row, project);
    row
}

/// Overwrite the project columns of `row`, leaving any other columns alone
pub fn write_project(row: &mut Row, project: &Project) {
    row.insert(PROJECT_NAME.into(), project.name.clone().into());
    row.insert(PROJECT_PROGRESS.into(), project.progress.into());
    row.insert(PROJECT_STATUS.into(), project.status.label().into());
    row.insert(PROJECT_NOTE.into(), project.note.clone().into());
}

/// Parse the project at position `index` of `sheet`
pub fn project_from_row(sheet: &str, index: usize, row: &Row) -> Result<Project> {
    let name = text(row, PROJECT_NAME);
    let place = Place {
        sheet,
        index,
        key: &name,
    };
    let progress = match row.get(PROJECT_PROGRESS) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.fract() == 0.0 && (0.0..=100.0).contains(p))
    .map(|p| p as u8)
    .ok_or_else(|| place.malformed(PROJECT_PROGRESS, "expected a whole number 0-100"))?;

    let status: ProjectStatus = text(row, PROJECT_STATUS)
        .parse()
        .map_err(|e| place.malformed(PROJECT_STATUS, e))?;

    Ok(Project {
        name,
        progress,
        status,
        note: text(row, PROJECT_NOTE),
    })
}
