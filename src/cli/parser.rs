use clap::{Parser, Subcommand};

/// Command-line interface definition for fdtsdb
/// Administration CLI for the FDTS SQLite store
#[derive(Parser)]
#[command(
    name = "fdtsdb",
    version = env!("CARGO_PKG_VERSION"),
    about = "Administer the FDTS SQLite database: pool health, stats, backups and maintenance",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the backup directory
    #[arg(global = true, long = "backup-dir")]
    pub backup_dir: Option<String>,

    /// Override the connection pool size
    #[arg(global = true, long = "max-connections")]
    pub max_connections: Option<usize>,

    /// Debug logging on stderr (RUST_LOG still wins)
    #[arg(global = true, long, short = 'v')]
    pub verbose: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration, the database and its schema
    Init,

    /// Show the configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending schema migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "checkpoint", help = "Checkpoint and truncate the WAL")]
        checkpoint: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,

        #[arg(long = "health", help = "Run the connection health check")]
        health: bool,
    },

    /// Show pool and page statistics
    Stats {
        #[arg(long, help = "Print statistics as JSON")]
        json: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(
            long,
            value_name = "FILE",
            help = "Destination file (relative paths land in the backup directory)"
        )]
        file: Option<String>,

        #[arg(long)]
        compress: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run a SQL query and print rows as JSON
    Query {
        sql: String,

        #[arg(long, help = "Print only the first row (null if none)")]
        single: bool,
    },

    /// Run one data-modifying SQL statement inside a transaction
    Exec { sql: String },
}
