use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for fieldclock
#[derive(Parser, Debug)]
#[command(
    name = "fieldclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Time clock for field crews: clock in/out, breaks, worked hours and task triggers",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override configuration file path
    #[arg(global = true, long = "config")]
    pub config: Option<String>,

    /// Use this instant instead of the current time ("YYYY-MM-DD HH:MM", local offset)
    #[arg(global = true, long = "at", value_name = "DATETIME")]
    pub at: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Validate the utc offset and every trigger")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Clock in (opens a new session)
    In {
        #[arg(long, short = 'e')]
        employee: Option<String>,

        /// Location as "latitude,longitude" (best effort)
        #[arg(long = "loc")]
        location: Option<String>,
    },

    /// Start a break on the open session
    Break {
        #[arg(long, short = 'e')]
        employee: Option<String>,
    },

    /// End the current break
    Resume {
        #[arg(long, short = 'e')]
        employee: Option<String>,
    },

    /// Clock out (closes the open session, ending any break)
    Out {
        #[arg(long, short = 'e')]
        employee: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Location as "latitude,longitude" (best effort)
        #[arg(long = "loc")]
        location: Option<String>,
    },

    /// Show the open session of an employee
    Status {
        #[arg(long, short = 'e')]
        employee: Option<String>,
    },

    /// List sessions
    List {
        #[arg(long, short = 'e')]
        employee: Option<String>,

        #[arg(long, short, help = "Filter by year/month/day or a start:end range")]
        period: Option<String>,

        #[arg(long = "open", help = "Only sessions still open")]
        open: bool,

        #[arg(long = "details", help = "Show every break of each session")]
        details: bool,
    },

    /// Approve (or revoke approval of) a closed session
    Approve {
        session: i64,

        #[arg(long)]
        revoke: bool,
    },

    /// Inspect or fire task triggers
    Trigger {
        #[command(subcommand)]
        action: TriggerAction,
    },

    /// List scheduled tasks
    Tasks {
        #[arg(long, short = 'e')]
        employee: Option<String>,

        #[arg(long = "due", help = "Only tasks already due")]
        due: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Export sessions
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a start:end range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TriggerAction {
    /// List configured triggers
    List,

    /// Fire a Manual trigger for an employee
    Fire {
        name: String,

        #[arg(long, short = 'e')]
        employee: Option<String>,
    },
}
