//! Voice ticket data model
//!
//! A ticket is what a resident submits: a subject, free-text detail and
//! contact email. The administrator answers by setting a status and a
//! response.

use crate::label::{self, fold, label_enum_serde};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response stored on a fresh ticket until an administrator answers
pub const PENDING_RESPONSE: &str = "Pending";

/// Ticket status
///
/// Any status may be set to any other; administrators are not held to
/// Received -> InProgress -> Resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TicketStatus {
    #[default]
    Received,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Received,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Received => "Received",
            TicketStatus::InProgress => "InProgress",
            TicketStatus::Resolved => "Resolved",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, TicketStatus::Resolved)
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "received" | "recibido" => Ok(TicketStatus::Received),
            "inprogress" | "enproceso" | "enprogreso" => Ok(TicketStatus::InProgress),
            "resolved" | "resuelto" => Ok(TicketStatus::Resolved),
            _ => Err(label::unknown(
                "ticket status",
                s,
                TicketStatus::ALL.iter().map(TicketStatus::label),
            )),
        }
    }
}

label_enum_serde!(TicketStatus);

/// What the ticket is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Maintenance,
    Suggestion,
    CommonAreas,
    Security,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Maintenance,
        Subject::Suggestion,
        Subject::CommonAreas,
        Subject::Security,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Subject::Maintenance => "Maintenance",
            Subject::Suggestion => "Suggestion",
            Subject::CommonAreas => "CommonAreas",
            Subject::Security => "Security",
        }
    }
}

impl std::str::FromStr for Subject {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "maintenance" | "mantenimiento" => Ok(Subject::Maintenance),
            "suggestion" | "sugerencia" => Ok(Subject::Suggestion),
            "commonareas" | "zonascomunes" => Ok(Subject::CommonAreas),
            "security" | "seguridad" => Ok(Subject::Security),
            _ => Err(label::unknown("subject", s, Subject::ALL.iter().map(Subject::label))),
        }
    }
}

label_enum_serde!(Subject);

/// A resident's voice ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier (VOZ-N)
    pub id: String,

    pub resident_name: String,

    /// Where notifications about this ticket are sent
    pub resident_email: String,

    pub subject: Subject,

    pub detail: String,

    pub status: TicketStatus,

    /// Administrator's latest answer
    pub admin_response: String,

    /// Day of submission, never changed afterwards
    pub created_date: NaiveDate,
}

impl Ticket {
    /// Create a freshly received ticket
    pub fn new(
        id: String,
        resident_name: String,
        resident_email: String,
        subject: Subject,
        detail: String,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            resident_name,
            resident_email,
            subject,
            detail,
            status: TicketStatus::Received,
            admin_response: PENDING_RESPONSE.to_string(),
            created_date,
        }
    }

    /// Apply an administrator's answer
    ///
    /// A blank response keeps the previous one.
    pub fn respond(&mut self, status: TicketStatus, response: &str) {
        self.status = status;
        let response = response.trim();
        if !response.is_empty() {
            self.admin_response = response.to_string();
        }
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {} - {}",
            self.id, self.subject, self.status, self.resident_name, self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ticket {
        Ticket::new(
            "VOZ-101".into(),
            "Ana".into(),
            "ana@x.com".into(),
            Subject::Maintenance,
            "Leak".into(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_new_ticket_is_received_and_pending() {
        let ticket = sample();
        assert_eq!(ticket.status, TicketStatus::Received);
        assert_eq!(ticket.admin_response, PENDING_RESPONSE);
    }

    #[test]
    fn test_status_parses_sheet_labels() {
        assert_eq!("⏳ Recibido".parse::<TicketStatus>().unwrap(), TicketStatus::Received);
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("En Proceso".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("RESOLVED".parse::<TicketStatus>().unwrap(), TicketStatus::Resolved);
        assert!(matches!(
            "Closed".parse::<TicketStatus>(),
            Err(crate::Error::Validation(_))
        ));
    }

    #[test]
    fn test_subject_parses_sheet_labels() {
        assert_eq!("Zonas Comunes".parse::<Subject>().unwrap(), Subject::CommonAreas);
        assert_eq!("common-areas".parse::<Subject>().unwrap(), Subject::CommonAreas);
        assert!("Parking".parse::<Subject>().is_err());
    }

    #[test]
    fn test_respond_allows_any_transition() {
        let mut ticket = sample();
        ticket.respond(TicketStatus::Resolved, "Fixed");
        ticket.respond(TicketStatus::Received, "Reopened");
        assert_eq!(ticket.status, TicketStatus::Received);
        assert_eq!(ticket.admin_response, "Reopened");
    }

    #[test]
    fn test_blank_response_keeps_previous() {
        let mut ticket = sample();
        ticket.respond(TicketStatus::InProgress, "  ");
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.admin_response, PENDING_RESPONSE);
    }

    #[test]
    fn test_unknown_labels_list_every_choice() {
        let err = "Closed".parse::<TicketStatus>().unwrap_err().to_string();
        for status in TicketStatus::ALL {
            assert!(err.contains(status.label()), "{err}");
        }
        let err = "Parking".parse::<Subject>().unwrap_err().to_string();
        assert!(err.contains("Maintenance, Suggestion, CommonAreas or Security"), "{err}");
    }

    #[test]
    fn test_json_uses_canonical_labels() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["status"], "Received");
        assert_eq!(json["subject"], "Maintenance");
        assert_eq!(json["created_date"], "2026-03-01");
    }
}
