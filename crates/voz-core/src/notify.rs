//! Resident notifications
//!
//! Sending is best effort: the sheet write has already been committed when
//! a notification goes out, so a failed send is reported next to the
//! committed record instead of failing the operation.

use crate::{NotificationError, Ticket};
use serde::Serialize;

/// Email collaborator
pub trait NotificationSink: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError>;
}

/// Outcome of the notification that followed a committed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Sent { to: String },
    Failed { to: String, error: NotificationError },
}

impl Notice {
    /// Human-readable warning for a failed send
    pub fn warning(&self) -> Option<String> {
        match self {
            Notice::Failed { to, error } => Some(format!(
                "the change was saved, but the email to {} could not be sent: {}",
                to, error
            )),
            _ => None,
        }
    }
}

/// A record whose write is committed, plus what happened to its notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub record: T,
    pub notice: Notice,
}

/// Email contents for ticket events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Confirmation sent to the resident when a ticket is received
    pub fn ticket_created(association: &str, ticket: &Ticket) -> Self {
        Self {
            subject: format!("Ticket confirmation: {}", ticket.id),
            body: format!(
                "{} has received your request.\n\nTicket: {}\nSubject: {}\nDetail: {}",
                association, ticket.id, ticket.subject, ticket.detail
            ),
        }
    }

    /// Update sent to the resident when an administrator answers
    pub fn ticket_updated(ticket: &Ticket) -> Self {
        Self {
            subject: format!("Ticket update: {}", ticket.id),
            body: format!(
                "Update on your request: {}\n\nNew status: {}\nResponse: {}",
                ticket.id, ticket.status, ticket.admin_response
            ),
        }
    }
}

/// Deliver a message, turning the sink's result into a [`Notice`]
pub fn deliver(sink: &dyn NotificationSink, to: &str, message: &Message) -> Notice {
    match sink.send(to, &message.subject, &message.body) {
        Ok(()) => Notice::Sent { to: to.to_string() },
        Err(error) => {
            tracing::warn!(to, subject = %message.subject, %error, "Notification failed");
            Notice::Failed {
                to: to.to_string(),
                error,
            }
        }
    }
}

/// Sink used when no mail server is configured: logs and succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        tracing::info!(
            to,
            subject,
            body_len = body.len(),
            "Mail not configured, logging notification"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every send; optionally fails them all
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn recipients(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(to, _, _)| to.clone())
                .collect()
        }

        pub fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, subject, _)| subject.clone())
                .collect()
        }
    }

    impl NotificationSink for RecordingSink {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            if self.fail {
                return Err(NotificationError::Transport("connection refused".into()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::Subject;
    use chrono::NaiveDate;

    fn ticket() -> Ticket {
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
    fn test_created_message() {
        let message = Message::ticket_created("Abelardo Yepes", &ticket());
        assert_eq!(message.subject, "Ticket confirmation: VOZ-101");
        assert!(message.body.starts_with("Abelardo Yepes has received"));
        assert!(message.body.contains("Subject: Maintenance"));
        assert!(message.body.contains("Detail: Leak"));
    }

    #[test]
    fn test_updated_message() {
        let mut ticket = ticket();
        ticket.respond(crate::TicketStatus::Resolved, "Fixed");
        let message = Message::ticket_updated(&ticket);
        assert_eq!(message.subject, "Ticket update: VOZ-101");
        assert!(message.body.contains("New status: Resolved"));
        assert!(message.body.contains("Response: Fixed"));
    }

    #[test]
    fn test_deliver_reports_failure() {
        let sink = RecordingSink::failing();
        let notice = deliver(&sink, "ana@x.com", &Message::ticket_updated(&ticket()));
        assert!(matches!(notice, Notice::Failed { .. }));
        assert!(notice.warning().unwrap().contains("ana@x.com"));
        assert_eq!(sink.recipients(), vec!["ana@x.com"]);
    }

    #[test]
    fn test_deliver_success() {
        let sink = RecordingSink::default();
        let notice = deliver(&sink, "ana@x.com", &Message::ticket_updated(&ticket()));
        assert_eq!(notice, Notice::Sent { to: "ana@x.com".into() });
        assert_eq!(notice.warning(), None);
    }
}
