//! Wiring of stores, notification sink and admin gate from config

use crate::{
    AdminGate, Config, Error, LogSink, NotificationSink, ProjectStore, Result, SmtpMailer,
    TabularStore, TicketStore, Workspace,
};
use std::sync::Arc;

/// Everything a surface (CLI, HTTP) needs to serve requests
#[derive(Clone)]
pub struct Services {
    pub tickets: TicketStore,
    pub projects: ProjectStore,
    pub admin: AdminGate,
}

impl Services {
    /// Build from explicit collaborators
    pub fn new(
        config: &Config,
        tables: Arc<dyn TabularStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            tickets: TicketStore::new(config, tables.clone(), sink),
            projects: ProjectStore::new(config, tables),
            admin: AdminGate::new(config.admin.password.as_deref()),
        }
    }

    /// Open a workspace: JSONL sheets plus SMTP mail, or logged mail when
    /// no SMTP host is configured
    pub fn open(workspace: &Workspace, config: &Config) -> Result<Self> {
        let sink = notification_sink(config)?;
        Ok(Self::new(config, Arc::new(workspace.tables()), sink))
    }
}

/// Choose the notification sink the config asks for
pub fn notification_sink(config: &Config) -> Result<Arc<dyn NotificationSink>> {
    let mailer = SmtpMailer::from_config(&config.mail)
        .map_err(|e| Error::Config(format!("mail: {}", e)))?;
    Ok(match mailer {
        Some(mailer) => Arc::new(mailer),
        None => {
            tracing::info!("No SMTP host configured, notifications will only be logged");
            Arc::new(LogSink)
        }
    })
}
