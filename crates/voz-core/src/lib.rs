//! voz-core: Core library for the voz residents' association tracker
//!
//! Residents submit voice tickets, administrators answer them, and
//! renovation projects report their progress. All state lives in a shared
//! tabular store that is read and written one whole sheet at a time.

pub mod auth;
pub mod config;
pub mod error;
pub mod id;
mod label;
pub mod mail;
pub mod notify;
pub mod project;
pub mod project_store;
pub mod rows;
pub mod service;
mod sheet;
pub mod table;
pub mod ticket;
pub mod ticket_store;
pub mod validate;
pub mod workspace;

pub use auth::AdminGate;
pub use config::Config;
pub use error::{Error, NotificationError};
pub use mail::SmtpMailer;
pub use notify::{Committed, LogSink, Message, NotificationSink, Notice};
pub use project::{Project, ProjectStatus};
pub use project_store::ProjectStore;
pub use service::Services;
pub use table::{JsonlTables, MemoryTables, Revision, Row, Table, TabularStore};
pub use ticket::{PENDING_RESPONSE, Subject, Ticket, TicketStatus};
pub use ticket_store::TicketStore;
pub use workspace::Workspace;

/// Result type for voz operations
pub type Result<T> = std::result::Result<T, Error>;
