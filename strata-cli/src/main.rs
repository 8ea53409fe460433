//! `strata` command line driver.
//!
//! ```text
//! strata --database app.db up --path db/migrations
//! strata --database app.db migrate --path db/migrations --to 3
//! strata --database app.db status --path db/migrations
//! strata --table-name-prefix app_ table-name people
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    colog::default_builder().filter_level(cli.log_level).init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli, &mut out)
}
