use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use otasuke_client::models::{DirectOrderStatus, ProjectStatus, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "otasuke",
    version,
    about = "Command line client for the otasuke contractor matching service",
    long_about = "Sign in to the otasuke Backend API and work with projects, quotes, orders and direct orders from the terminal."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend API base URL (e.g. http://localhost:8000/api)
    #[arg(long, global = true, env = "OTASUKE_API_BASE_URL")]
    pub api_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file path
    #[arg(long, global = true, env = "OTASUKE_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store credentials
    Login {
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "OTASUKE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        email: String,

        #[arg(long, value_enum)]
        role: RoleArg,

        /// Password (prompted for, with confirmation, when omitted)
        #[arg(long, env = "OTASUKE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget stored credentials
    Logout,

    /// Show the signed-in user and company
    Whoami,

    /// Browse and manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectsCommand,
    },

    /// Quotes submitted or received
    Quotes {
        #[command(subcommand)]
        action: QuotesCommand,
    },

    /// Orders created from accepted quotes
    Orders {
        #[command(subcommand)]
        action: OrdersCommand,
    },

    /// Notifications for the signed-in user
    Notifications {
        #[command(subcommand)]
        action: NotificationsCommand,
    },

    /// Orders placed directly with a subcontractor
    DirectOrders {
        #[command(subcommand)]
        action: DirectOrdersCommand,
    },

    /// Summary for the signed-in user's role
    Dashboard,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectsCommand {
    /// List projects
    List {
        /// draft, open, closed, in_progress, completed or cancelled
        #[arg(long)]
        status: Option<ProjectStatus>,

        #[arg(long)]
        company: Option<Uuid>,

        #[arg(long)]
        specialty: Option<Uuid>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show a single project
    Show { id: Uuid },

    /// Quotes received for a project
    Quotes { id: Uuid },
}

#[derive(Subcommand)]
pub enum QuotesCommand {
    /// Quotes you have submitted
    Mine,
    /// Accept a quote and create an order
    Accept { id: Uuid },
    /// Reject a quote
    Reject { id: Uuid },
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    List,
    Show { id: Uuid },
    /// Mark an order as completed
    Complete { id: Uuid },
}

#[derive(Subcommand)]
pub enum NotificationsCommand {
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read { id: Uuid },
    /// Mark every notification as read
    ReadAll,
}

#[derive(Subcommand)]
pub enum DirectOrdersCommand {
    List {
        /// pending, accepted, declined, in_progress, completed or cancelled
        #[arg(long)]
        status: Option<DirectOrderStatus>,
    },
    Show {
        id: Uuid,
    },
    Accept {
        id: Uuid,
    },
    Decline {
        id: Uuid,
        #[arg(long)]
        reason: Option<String>,
    },
    Start {
        id: Uuid,
    },
    Complete {
        id: Uuid,
    },
    Cancel {
        id: Uuid,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleArg {
    /// 元請け
    Contractor,
    /// 下請け
    Subcontractor,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Contractor => UserRole::Contractor,
            RoleArg::Subcontractor => UserRole::Subcontractor,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
    /// Table format
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_project_filter() {
        let args = Args::try_parse_from([
            "otasuke",
            "projects",
            "list",
            "--status",
            "in_progress",
            "--page",
            "2",
        ])
        .unwrap();

        match args.command {
            Commands::Projects {
                action: ProjectsCommand::List { status, page, .. },
            } => {
                assert_eq!(status, Some(ProjectStatus::InProgress));
                assert_eq!(page, Some(2));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_global_output_flag() {
        let args = Args::try_parse_from(["otasuke", "whoami", "--output", "json"]).unwrap();
        assert_eq!(args.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["otasuke", "-v", "-q", "logout"]).is_err());
    }
}
