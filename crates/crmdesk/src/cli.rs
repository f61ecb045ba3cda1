//! Clap derive structures for the `crmdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crmdesk_config::Defaults;
use crmdesk_core::{PaymentStatus, PaymentType, RecordId, Role};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// crmdesk -- terminal dashboard for the CRM API
#[derive(Debug, Parser)]
#[command(
    name = "crmdesk",
    version,
    about = "Manage CRM users, clients, and payments from the command line",
    long_about = "A terminal dashboard for the CRM REST API.\n\n\
        Log in once per profile; the session is kept between runs until\n\
        you log out.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "CRMDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "CRMDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "CRMDESK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "CRMDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CRMDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Fill unset output and color flags from the config file defaults.
    pub fn apply_defaults(&mut self, defaults: &Defaults) {
        if self.output.is_none() {
            self.output = OutputFormat::from_str(&defaults.output, true).ok();
        }
        if self.color.is_none() {
            self.color = ColorMode::from_str(&defaults.color, true).ok();
        }
    }

    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session for this profile
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Summary of clients, payments, and revenue
    #[command(alias = "dash")]
    Dashboard,

    /// Manage staff accounts (administrators only)
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Manage clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Manage payments
    #[command(alias = "pay")]
    Payments(PaymentsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive substring filter
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's email, else prompts)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompts when omitted)
    #[arg(long, env = "CRMDESK_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users (search matches name or email)
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get user details
    Get { id: RecordId },

    /// Create a user
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Digits only
        #[arg(long)]
        phone: String,

        /// ADMIN or USER
        #[arg(long, default_value = "USER")]
        role: Role,

        /// Initial password (prompts when omitted)
        #[arg(long, env = "CRMDESK_NEW_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Update a user; omitted fields keep their current value
    Update {
        id: RecordId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        /// Prompt for a new password
        #[arg(long)]
        reset_password: bool,
    },

    /// Delete a user (your own account is refused)
    #[command(alias = "rm")]
    Delete { id: RecordId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients (search matches name or phone)
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get client details
    Get { id: RecordId },

    /// Create a client owned by the logged-in user
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,
    },

    /// Update a client; omitted fields keep their current value
    Update {
        id: RecordId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete a client
    #[command(alias = "rm")]
    Delete { id: RecordId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PAYMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// List payments (search matches client name, value, or status)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only payments of this client
        #[arg(long, short = 'c')]
        client: Option<RecordId>,
    },

    /// Get payment details
    Get { id: RecordId },

    /// Create a payment
    Create {
        /// Client id
        #[arg(long, short = 'c')]
        client: RecordId,

        /// Amount, e.g. 150.00
        #[arg(long, default_value = "0")]
        value: String,

        /// BOLETO, CARTAO or AVISTA
        #[arg(long = "type", default_value = "BOLETO")]
        kind: PaymentType,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// PENDENTE, VENCIDO or PAGO
        #[arg(long, default_value = "PENDENTE")]
        status: PaymentStatus,
    },

    /// Update a payment; omitted fields keep their current value
    Update {
        id: RecordId,

        #[arg(long, short = 'c')]
        client: Option<RecordId>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long = "type")]
        kind: Option<PaymentType>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<PaymentStatus>,
    },

    /// Delete a payment
    #[command(alias = "rm")]
    Delete { id: RecordId },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
