use crate::common::camelize;
use crate::errors::StrataResult;
use crate::migration::Schema;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// A migration body: receives the schema handle and performs DDL through it.
pub type MigrationFn = Arc<dyn Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static>;

/// Direction in which migrations are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A named, versioned, reversible schema change.
///
/// # Purpose
/// Pairs a forward body (`up`) with the body that undoes it (`down`). Migrations hold
/// no state; everything they change lives in the database behind the [Schema] handle.
///
/// # Characteristics
/// - Immutable once created
/// - Cheap to clone (bodies are shared via `Arc`)
/// - Failures inside a body propagate unchanged
#[derive(Clone)]
pub struct Migration {
    version: u64,
    name: String,
    up: MigrationFn,
    down: MigrationFn,
}

impl Migration {
    /// Creates a migration from two closures.
    ///
    /// # Arguments
    /// * `version` - Position of the migration in the total order
    /// * `name` - Underscored name, e.g. `people_have_last_names`
    /// * `up` - Forward body
    /// * `down` - Inverse body
    pub fn new<U, D>(version: u64, name: &str, up: U, down: D) -> Self
    where
        U: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
        D: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
    {
        Migration::from_fns(version, name, Arc::new(up), Arc::new(down))
    }

    pub(crate) fn from_fns(version: u64, name: &str, up: MigrationFn, down: MigrationFn) -> Self {
        Migration {
            version,
            name: name.to_string(),
            up,
            down,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Camel-cased name used in announcements, e.g. `PeopleHaveLastNames`.
    pub fn display_name(&self) -> String {
        camelize(&self.name)
    }

    /// Runs the forward body.
    pub fn up(&self, schema: &Schema) -> StrataResult<()> {
        self.migrate(schema, Direction::Up)
    }

    /// Runs the inverse body.
    pub fn down(&self, schema: &Schema) -> StrataResult<()> {
        self.migrate(schema, Direction::Down)
    }

    /// Runs the body for `direction`, announcing start and completion.
    pub fn migrate(&self, schema: &Schema, direction: Direction) -> StrataResult<()> {
        let (starting, finished, body) = match direction {
            Direction::Up => ("migrating", "migrated", &self.up),
            Direction::Down => ("reverting", "reverted", &self.down),
        };

        log::info!("== {} {}: {}", self.version, self.display_name(), starting);
        let start = Instant::now();
        body(schema)?;
        log::info!(
            "== {} {}: {} ({:.4}s)",
            self.version,
            self.display_name(),
            finished,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

impl Debug for Migration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("up", &"<fn>")
            .field("down", &"<fn>")
            .finish()
    }
}
