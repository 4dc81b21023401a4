//! Ticket store: create, look up and answer voice tickets
//!
//! Every mutation reads the whole ticket sheet, changes it in memory and
//! writes it back; see [`crate::sheet`]. Residents are emailed after the
//! write has been committed.

use crate::notify::{self, Committed, Message, NotificationSink};
use crate::sheet::Sheet;
use crate::table::{Row, TabularStore};
use crate::{Config, Error, Result, Subject, Ticket, TicketStatus, id, rows, validate};
use chrono::NaiveDate;
use std::sync::Arc;

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Manager for the ticket sheet
#[derive(Clone)]
pub struct TicketStore {
    sheet: Sheet,
    sink: Arc<dyn NotificationSink>,
    prefix: String,
    first_number: u64,
    association: String,
    today: Clock,
}

impl TicketStore {
    pub fn new(
        config: &Config,
        tables: Arc<dyn TabularStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            sheet: Sheet::new(tables, &config.sheets.tickets, config.max_write_attempts),
            sink,
            prefix: config.ticket_prefix.clone(),
            first_number: config.first_ticket_number,
            association: config.association.clone(),
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replace the clock used to date new tickets
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    /// Submit a new ticket on behalf of a resident
    ///
    /// Nothing is written when validation fails. The confirmation email is
    /// sent after the write; its outcome is in [`Committed::notice`].
    pub fn create(
        &self,
        resident_name: &str,
        resident_email: &str,
        subject: &str,
        detail: &str,
    ) -> Result<Committed<Ticket>> {
        let resident_name = validate::required("name", resident_name)?;
        let resident_email = validate::email(resident_email)?;
        let detail = validate::required("detail", detail)?;
        let subject: Subject = subject.parse()?;
        let created_date = (self.today)();

        let ticket = self.sheet.modify(|table| {
            let id = id::next_id(
                &self.prefix,
                self.first_number,
                table.iter().filter_map(rows::ticket_id),
            )?;
            let ticket = Ticket::new(
                id,
                resident_name.clone(),
                resident_email.clone(),
                subject,
                detail.clone(),
                created_date,
            );
            table.push(rows::ticket_to_row(&ticket));
            Ok(ticket)
        })?;

        tracing::info!(id = %ticket.id, subject = %ticket.subject, "Ticket created");

        let message = Message::ticket_created(&self.association, &ticket);
        let notice = notify::deliver(self.sink.as_ref(), &ticket.resident_email, &message);
        Ok(Committed {
            record: ticket,
            notice,
        })
    }

    /// Look up a ticket by the ID the resident typed
    pub fn find_by_id(&self, id: &str) -> Result<Ticket> {
        let table = self.sheet.read()?;
        let index = position(&table.rows, id).ok_or_else(|| Error::ticket_not_found(id))?;
        rows::ticket_from_row(self.sheet.name(), index, &table.rows[index])
    }

    /// All tickets in stored order
    pub fn list_all(&self) -> Result<Vec<Ticket>> {
        let table = self.sheet.read()?;
        table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| rows::ticket_from_row(self.sheet.name(), index, row))
            .collect()
    }

    /// Set a ticket's status and administrator response
    ///
    /// Any status may follow any other. A blank response keeps the stored
    /// one. The resident is emailed at the stored address after the write.
    pub fn update_status(
        &self,
        id: &str,
        new_status: &str,
        new_response: &str,
    ) -> Result<Committed<Ticket>> {
        let status: TicketStatus = new_status.parse()?;

        let ticket = self.sheet.modify(|table| {
            let index = position(table, id).ok_or_else(|| Error::ticket_not_found(id))?;
            let mut ticket = rows::ticket_from_row(self.sheet.name(), index, &table[index])?;
            ticket.respond(status, new_response);
            rows::write_ticket(&mut table[index], &ticket);
            Ok(ticket)
        })?;

        tracing::info!(id = %ticket.id, status = %ticket.status, "Ticket updated");

        let message = Message::ticket_updated(&ticket);
        let notice = notify::deliver(self.sink.as_ref(), &ticket.resident_email, &message);
        Ok(Committed {
            record: ticket,
            notice,
        })
    }
}

fn position(table: &[Row], id: &str) -> Option<usize> {
    let wanted = id::normalize(id);
    if wanted.is_empty() {
        return None;
    }
    table
        .iter()
        .position(|row| rows::ticket_id(row).is_some_and(|cell| id::normalize(cell) == wanted))
}
