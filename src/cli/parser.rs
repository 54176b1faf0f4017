use crate::models::Direction;
use clap::{Parser, Subcommand};

/// Command-line interface definition for timereaper
#[derive(Parser)]
#[command(
    name = "timereaper",
    version = env!("CARGO_PKG_VERSION"),
    about = "A personal time tracker: start/stop timers on tasks and page through your time slots",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Start a timer
    Start {
        #[arg(long, help = "Task name (reuses the latest task with that name)")]
        task: Option<String>,

        #[arg(long = "tag", help = "Tag to attach to the task (repeatable)")]
        tags: Vec<String>,
    },

    /// Stop the running timer
    Stop {
        #[arg(long, help = "Rename the task of the running timer while stopping it")]
        task: Option<String>,
    },

    /// Show the running timer
    Status,

    /// Log a finished time slot after the fact
    Add {
        /// Date of the slot (YYYY-MM-DD)
        date: String,

        /// Start time (HH:MM[:SS], UTC)
        start: String,

        /// End time (HH:MM[:SS], UTC)
        end: String,

        #[arg(long, help = "Task name")]
        task: String,

        #[arg(long = "tag", help = "Tag to attach to the task (repeatable)")]
        tags: Vec<String>,
    },

    /// List time slots, paginated over calendar dates
    List {
        #[arg(long, help = "Reference date (YYYY-MM-DD), default: today or the far end")]
        offset: Option<String>,

        #[arg(
            long,
            help = "Which side of the offset to look at: past_to_future or future_to_past"
        )]
        direction: Option<Direction>,

        #[arg(long = "dates-dir", help = "Order of dates (default from config)")]
        dates_dir: Option<Direction>,

        #[arg(long = "times-dir", help = "Order of slots within a date (default from config)")]
        times_dir: Option<Direction>,

        #[arg(long, default_value_t = 0, help = "Page number, 0-based")]
        page: usize,

        #[arg(long = "page-size", help = "Dates per page (default from config)")]
        page_size: Option<usize>,

        #[arg(long, help = "Print the page as JSON")]
        json: bool,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}
