//! voz - residents' voice tickets and renovation progress
//!
//! Sheets live in .voz/sheets/, configuration in .voz/config.toml.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "voz")]
#[command(about = "Residents' voice tickets and renovation progress")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new voz workspace in the current directory
    Init,

    /// Submit a new ticket
    Submit {
        /// Your name
        #[arg(long)]
        name: String,

        /// Your email (confirmation is sent here)
        #[arg(long)]
        email: String,

        /// Subject (Maintenance, Suggestion, CommonAreas, Security)
        #[arg(short, long, default_value = "Maintenance")]
        subject: String,

        /// Description of the issue
        #[arg(short, long)]
        detail: String,
    },

    /// Look up a ticket by ID (e.g. VOZ-101)
    Lookup {
        /// Ticket ID
        id: String,
    },

    /// Show renovation project progress
    Projects,

    /// Administrative commands (require the admin password)
    Admin {
        /// Admin password
        #[arg(long, env = "VOZ_PASSWORD", hide_env_values = true)]
        password: String,

        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List tickets
    Tickets {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Only tickets that are not resolved
        #[arg(long)]
        open: bool,
    },

    /// Set a ticket's status and response; the resident is emailed
    Respond {
        /// Ticket ID
        id: String,

        /// New status (Received, InProgress, Resolved)
        #[arg(short, long)]
        status: String,

        /// Response to the resident
        #[arg(short, long, default_value = "")]
        response: String,
    },

    /// Add a renovation project
    ProjectAdd {
        /// Project name
        name: String,

        /// Progress percentage (0-100)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        progress: i64,

        /// Phase (Planning/Start, InExecution, Finished, Suspended)
        #[arg(short, long, default_value = "Planning/Start")]
        status: String,

        /// Note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Record progress on a renovation project
    ProjectUpdate {
        /// Project name
        name: String,

        /// Progress percentage (0-100)
        #[arg(short, long, allow_negative_numbers = true)]
        progress: i64,

        /// Phase (Planning/Start, InExecution, Finished, Suspended)
        #[arg(short, long)]
        status: String,

        /// Latest-update note
        #[arg(short, long, default_value = "")]
        note: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Get a specific config value
    Get {
        /// Config key (e.g., "ticket_prefix", "mail.smtp_port")
        key: String,
    },
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init(),
        Commands::Submit {
            name,
            email,
            subject,
            detail,
        } => commands::submit(&name, &email, &subject, &detail, cli.json),
        Commands::Lookup { id } => commands::lookup(&id, cli.json),
        Commands::Projects => commands::projects(cli.json),
        Commands::Admin { password, command } => {
            let ctx = commands::Context::open()?;
            ctx.services.admin.check(&password)?;
            match command {
                AdminCommands::Tickets { status, open } => {
                    commands::admin_tickets(&ctx, status, open, cli.json)
                }
                AdminCommands::Respond {
                    id,
                    status,
                    response,
                } => commands::admin_respond(&ctx, &id, &status, &response, cli.json),
                AdminCommands::ProjectAdd {
                    name,
                    progress,
                    status,
                    note,
                } => commands::admin_project_add(&ctx, &name, progress, &status, &note, cli.json),
                AdminCommands::ProjectUpdate {
                    name,
                    progress,
                    status,
                    note,
                } => {
                    commands::admin_project_update(&ctx, &name, progress, &status, &note, cli.json)
                }
            }
        }
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(cli.json),
            Some(ConfigCommands::Get { key }) => commands::config_get(&key, cli.json),
        },
    }
}
