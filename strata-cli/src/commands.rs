use crate::cli::{Cli, Commands, MigrationArgs};
use anyhow::Context;
use std::io::Write;
use std::sync::Arc;
use strata::migration::DirectorySource;
use strata::migrator::{MigrationReport, Migrator};
use strata::naming::NamingConfig;
use strata_sqlite_adapter::SqliteAdapter;

/// Runs the parsed command, writing its result to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Migrate(args) => {
            let report = with_source(cli, args, |migrator, source| {
                migrator.migrate(source, args.to)
            })?;
            writeln!(out, "{}", report)?;
        }
        Commands::Up(args) => {
            let report = with_source(cli, args, |migrator, source| migrator.up(source, args.to))?;
            writeln!(out, "{}", report)?;
        }
        Commands::Down(args) => {
            let report =
                with_source(cli, args, |migrator, source| migrator.down(source, args.to))?;
            writeln!(out, "{}", report)?;
        }
        Commands::Version => {
            let version = open_migrator(cli)?.current_version()?;
            writeln!(out, "{}", version)?;
        }
        Commands::Status { path } => {
            let migrator = open_migrator(cli)?;
            let statuses = migrator
                .status(&DirectorySource::new(path))
                .with_context(|| format!("Failed to read migrations from {}", path.display()))?;
            for status in statuses {
                writeln!(
                    out,
                    "{:>8}  {:<7}  {}",
                    status.version,
                    if status.applied { "applied" } else { "pending" },
                    status.name
                )?;
            }
        }
        Commands::TableName { name } => {
            writeln!(out, "{}", naming(cli)?.proper_table_name(name.as_str()))?;
        }
        Commands::SchemaInfoTable => {
            writeln!(out, "{}", naming(cli)?.schema_info_table_name())?;
        }
    }
    Ok(())
}

fn naming(cli: &Cli) -> anyhow::Result<NamingConfig> {
    Ok(NamingConfig::new(
        &cli.table_name_prefix,
        &cli.table_name_suffix,
    )?)
}

fn open_migrator(cli: &Cli) -> anyhow::Result<Migrator> {
    let database = cli.database.to_string_lossy();
    let adapter = SqliteAdapter::with_config()
        .db_path(&database)
        .build()
        .with_context(|| format!("Failed to open database {}", database))?;

    let migrator = Migrator::builder()
        .adapter(Arc::new(adapter))
        .table_name_prefix(&cli.table_name_prefix)
        .table_name_suffix(&cli.table_name_suffix)
        .transactional(!cli.no_transaction)
        .build()?;
    Ok(migrator)
}

fn with_source<F>(cli: &Cli, args: &MigrationArgs, action: F) -> anyhow::Result<MigrationReport>
where
    F: FnOnce(&Migrator, &DirectorySource) -> strata::StrataResult<MigrationReport>,
{
    let migrator = open_migrator(cli)?;
    let source = DirectorySource::new(&args.path);
    log::debug!("Reading migrations from {}", args.path.display());
    Ok(action(&migrator, &source)?)
}
