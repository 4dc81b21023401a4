//! CLI command implementations

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use voz_core::{Committed, Config, Notice, Project, Services, Ticket, TicketStatus, Workspace};

/// Opened workspace with its config and services
pub struct Context {
    pub workspace: Workspace,
    pub config: Config,
    pub services: Services,
}

impl Context {
    pub fn open() -> Result<Self> {
        let workspace = Workspace::find()?;
        let config = workspace.config()?;
        let services = Services::open(&workspace, &config)?;
        Ok(Self {
            workspace,
            config,
            services,
        })
    }
}

/// JSON shape for committed writes: the record plus any notification warning
#[derive(Serialize)]
struct CommittedJson<'a, T> {
    data: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

fn print_committed<T: Serialize>(
    committed: &Committed<T>,
    json: bool,
    headline: &str,
) -> Result<()> {
    if json {
        let out = CommittedJson {
            data: &committed.record,
            warning: committed.notice.warning(),
        };
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), headline);
    match &committed.notice {
        Notice::Sent { to } => println!("  Notification sent to {}", to),
        Notice::Failed { to, error } => println!(
            "{} Saved, but the email to {} could not be sent: {}",
            "!".yellow(),
            to,
            error
        ),
    }
    Ok(())
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Resident")]
    resident: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Response")]
    response: String,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.clone(),
            date: ticket.created_date.to_string(),
            resident: format!("{} <{}>", ticket.resident_name, ticket.resident_email),
            subject: ticket.subject.to_string(),
            status: ticket.status.to_string(),
            response: ticket.admin_response.clone(),
        }
    }
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    name: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            progress: progress_bar(project.progress),
            status: project.status.to_string(),
            note: project.note.clone(),
        }
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress) / 10;
    format!(
        "{}{} {:>3}%",
        "#".repeat(filled),
        ".".repeat(10 - filled),
        progress
    )
}

fn status_colored(status: TicketStatus) -> colored::ColoredString {
    match status {
        TicketStatus::Received => status.label().white(),
        TicketStatus::InProgress => status.label().yellow(),
        TicketStatus::Resolved => status.label().green(),
    }
}

pub fn init() -> Result<()> {
    let workspace = Workspace::init(&std::env::current_dir()?)?;
    println!(
        "{} Initialized voz in {}",
        "✓".green(),
        workspace.voz_dir().display()
    );
    println!(
        "  Edit {} to set the admin password and mail server",
        workspace.config_path().display()
    );
    Ok(())
}

pub fn submit(name: &str, email: &str, subject: &str, detail: &str, json: bool) -> Result<()> {
    let ctx = Context::open()?;
    let committed = ctx.services.tickets.create(name, email, subject, detail)?;
    let headline = format!("Ticket {} created", committed.record.id.cyan());
    print_committed(&committed, json, &headline)
}

pub fn lookup(id: &str, json: bool) -> Result<()> {
    let ctx = Context::open()?;
    let ticket = ctx.services.tickets.find_by_id(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        println!("{} {}", ticket.id.cyan().bold(), ticket.subject.to_string().bold());
        println!();
        println!("Status:   {}", status_colored(ticket.status));
        println!("Response: {}", ticket.admin_response);
        println!("Created:  {}", ticket.created_date);
    }

    Ok(())
}

pub fn projects(json: bool) -> Result<()> {
    let ctx = Context::open()?;
    let projects = ctx.services.projects.list_all()?;

    if json {
        println!("{}", serde_json::to_string(&projects)?);
    } else if projects.is_empty() {
        println!("No projects yet");
    } else {
        let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    Ok(())
}

pub fn admin_tickets(ctx: &Context, status: Option<String>, open: bool, json: bool) -> Result<()> {
    let mut tickets = ctx.services.tickets.list_all()?;

    if let Some(ref s) = status {
        let status: TicketStatus = s.parse()?;
        tickets.retain(|t| t.status == status);
    }
    if open {
        tickets.retain(|t| t.status.is_open());
    }

    if json {
        println!("{}", serde_json::to_string(&tickets)?);
    } else if tickets.is_empty() {
        println!("No tickets found");
    } else {
        let rows: Vec<TicketRow> = tickets.iter().map(TicketRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
        println!("{} ticket(s)", tickets.len());
    }

    Ok(())
}

pub fn admin_respond(
    ctx: &Context,
    id: &str,
    status: &str,
    response: &str,
    json: bool,
) -> Result<()> {
    let committed = ctx.services.tickets.update_status(id, status, response)?;
    let headline = format!(
        "Ticket {} is now {}",
        committed.record.id.cyan(),
        status_colored(committed.record.status)
    );
    print_committed(&committed, json, &headline)
}

pub fn admin_project_add(
    ctx: &Context,
    name: &str,
    progress: i64,
    status: &str,
    note: &str,
    json: bool,
) -> Result<()> {
    let project = ctx.services.projects.create(name, progress, status, note)?;
    print_project(&project, json, "Added")
}

pub fn admin_project_update(
    ctx: &Context,
    name: &str,
    progress: i64,
    status: &str,
    note: &str,
    json: bool,
) -> Result<()> {
    let project = ctx.services.projects.update(name, progress, status, note)?;
    print_project(&project, json, "Updated")
}

fn print_project(project: &Project, json: bool, verb: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(project)?);
    } else {
        println!(
            "{} {} {} [{}] {}",
            "✓".green(),
            verb,
            project.name.cyan(),
            project.status,
            progress_bar(project.progress)
        );
    }
    Ok(())
}

/// Show current configuration (secrets hidden)
pub fn config_show(json: bool) -> Result<()> {
    let ctx = Context::open()?;
    let config = &ctx.config;

    if json {
        println!("{}", serde_json::to_string_pretty(&redacted(config)?)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!("  file: {}", ctx.workspace.config_path().display());
        println!();
        println!("association = \"{}\"", config.association);
        println!("ticket_prefix = \"{}\"", config.ticket_prefix);
        println!("first_ticket_number = {}", config.first_ticket_number);
        println!("max_write_attempts = {}", config.max_write_attempts);
        println!();
        println!("[sheets]");
        println!("tickets = \"{}\"", config.sheets.tickets);
        println!("projects = \"{}\"", config.sheets.projects);
        println!();
        println!("[admin]");
        println!(
            "password = {}",
            if config.admin.password.is_some() { "(set)" } else { "(unset, admin disabled)" }
        );
        println!();
        println!("[mail]");
        match config.mail.smtp_host {
            Some(ref host) => println!("smtp_host = \"{}\"", host),
            None => println!("smtp_host = (unset, notifications are logged only)"),
        }
        println!("smtp_port = {}", config.mail.smtp_port);
        if let Some(ref user) = config.mail.smtp_user {
            println!("smtp_user = \"{}\"", user);
        }
        if let Some(ref from) = config.mail.from_address {
            println!("from_address = \"{}\"", from);
        }
        println!();
        println!("[api]");
        println!("port = {}", config.api.port);
    }

    Ok(())
}

/// Get a specific config value
pub fn config_get(key: &str, json: bool) -> Result<()> {
    let ctx = Context::open()?;
    let config_json = redacted(&ctx.config)?;

    // Parse key path (e.g., "mail.smtp_port" -> ["mail", "smtp_port"])
    let mut value = &config_json;
    for part in key.split('.') {
        value = value
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Config key not found: {}", key))?;
    }

    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        match value {
            serde_json::Value::String(s) => println!("{}", s),
            serde_json::Value::Bool(b) => println!("{}", b),
            serde_json::Value::Number(n) => println!("{}", n),
            serde_json::Value::Null => println!("null"),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
    }

    Ok(())
}

fn redacted(config: &Config) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(config)?;
    let Some(admin) = value.get_mut("admin").and_then(|a| a.as_object_mut()) else {
        bail!("config has no admin section");
    };
    if admin.contains_key("password") {
        admin.insert("password".into(), "(set)".into());
    }
    Ok(value)
}
