use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Versioned schema migrations for SQLite", long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, value_name = "PATH", global = true, default_value = "strata.db")]
    pub database: PathBuf,

    /// Prefix applied to every table name
    #[arg(long, value_name = "PREFIX", global = true, default_value = "")]
    pub table_name_prefix: String,

    /// Suffix applied to every table name
    #[arg(long, value_name = "SUFFIX", global = true, default_value = "")]
    pub table_name_suffix: String,

    /// Run each migration without a surrounding transaction
    #[arg(long, global = true)]
    pub no_transaction: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(
        long,
        value_name = "LEVEL",
        global = true,
        default_value = "info",
        value_parser = parse_level
    )]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move the schema to a version, up or down as needed
    Migrate(MigrationArgs),

    /// Apply pending migrations
    Up(MigrationArgs),

    /// Revert applied migrations
    Down(MigrationArgs),

    /// Print the current schema version
    Version,

    /// List migrations with their applied state
    Status {
        /// Directory holding <version>_<name>.up.sql / .down.sql files
        #[arg(long, value_name = "DIR", default_value = "migrations")]
        path: PathBuf,
    },

    /// Print the physical name of a table
    TableName {
        /// Logical table name
        name: String,
    },

    /// Print the physical name of the schema version table
    SchemaInfoTable,
}

#[derive(Args, Debug)]
pub struct MigrationArgs {
    /// Directory holding <version>_<name>.up.sql / .down.sql files
    #[arg(long, value_name = "DIR", default_value = "migrations")]
    pub path: PathBuf,

    /// Target version
    #[arg(long, value_name = "VERSION")]
    pub to: Option<u64>,
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level '{}'", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migrate_with_target() {
        let cli = Cli::try_parse_from([
            "strata",
            "migrate",
            "--path",
            "db/migrations",
            "--to",
            "3",
            "--database",
            "app.db",
        ])
        .unwrap();
        assert_eq!(cli.database, PathBuf::from("app.db"));
        match cli.command {
            Commands::Migrate(args) => {
                assert_eq!(args.path, PathBuf::from("db/migrations"));
                assert_eq!(args.to, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["strata", "up"]).unwrap();
        assert_eq!(cli.database, PathBuf::from("strata.db"));
        assert_eq!(cli.log_level, LevelFilter::Info);
        assert!(!cli.no_transaction);
        assert!(cli.table_name_prefix.is_empty());
        match cli.command {
            Commands::Up(args) => {
                assert_eq!(args.path, PathBuf::from("migrations"));
                assert_eq!(args.to, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "strata",
            "table-name",
            "people",
            "--table-name-prefix",
            "app_",
            "--log-level",
            "debug",
            "--no-transaction",
        ])
        .unwrap();
        assert_eq!(cli.table_name_prefix, "app_");
        assert_eq!(cli.log_level, LevelFilter::Debug);
        assert!(cli.no_transaction);
        assert!(matches!(cli.command, Commands::TableName { ref name } if name == "people"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["strata", "version", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_rejects_negative_target() {
        assert!(Cli::try_parse_from(["strata", "down", "--to", "-1"]).is_err());
    }
}
