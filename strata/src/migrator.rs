use crate::adapter::{Adapter, DatabaseStatements};
use crate::errors::StrataResult;
use crate::migration::{discover, Direction, Migration, MigrationSource, Schema};
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::MigratorConfig;
use crate::naming::{NamingConfig, TableRef};
use crate::version_store::VersionStore;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Steps a migrator would run for a request, computed without executing anything.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    direction: Direction,
    from_version: u64,
    target_version: u64,
    steps: Vec<Migration>,
}

impl MigrationPlan {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn from_version(&self) -> u64 {
        self.from_version
    }

    pub fn target_version(&self) -> u64 {
        self.target_version
    }

    /// Migrations in execution order.
    pub fn steps(&self) -> &[Migration] {
        &self.steps
    }

    pub fn versions(&self) -> Vec<u64> {
        self.steps.iter().map(|m| m.version()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Version to persist once the step at `index` has run.
    ///
    /// Going up this is the step's own version. Going down it is the version of the
    /// next older migration still in the plan, or the target once none remain.
    fn version_after(&self, index: usize) -> u64 {
        match self.direction {
            Direction::Up => self.steps[index].version(),
            Direction::Down => self
                .steps
                .get(index + 1)
                .map(|m| m.version())
                .unwrap_or(self.target_version),
        }
    }
}

/// Outcome of a successful migrator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub direction: Direction,
    pub from_version: u64,
    pub to_version: u64,
    /// Versions whose body ran, in execution order.
    pub executed: Vec<u64>,
}

impl Display for MigrationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.executed.is_empty() {
            write!(f, "Schema is up to date at version {}", self.to_version)
        } else {
            write!(
                f,
                "Migrated {} from version {} to {} ({} migration{})",
                self.direction,
                self.from_version,
                self.to_version,
                self.executed.len(),
                if self.executed.len() == 1 { "" } else { "s" }
            )
        }
    }
}

/// Applied or pending state of one discovered migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: u64,
    pub name: String,
    pub applied: bool,
}

/// Applies versioned migrations and tracks the schema version they produce.
///
/// # Purpose
/// The migrator discovers migrations from a [MigrationSource], compares the persisted
/// version with a target and runs the minimal ordered subsequence of migrations in the
/// right direction, persisting the version after each step.
///
/// # Characteristics
/// - **Sequential**: migrations run one at a time, in plan order
/// - **Fail-fast**: the first failing step stops the run and its error is returned
///   unchanged; earlier steps stay applied and the stored version reflects them
/// - **Per-step atomicity**: when transactional, a step's body and its version write
///   run inside one adapter transaction
/// - **Fixed naming**: affixes are frozen when the migrator is built
///
/// # Usage
/// ```text
/// let migrator = Migrator::builder().adapter(adapter).build()?;
/// migrator.up(&migrations, None)?;       // everything pending
/// migrator.down(&migrations, Some(1))?;  // back to version 1
/// migrator.migrate(&migrations, Some(2))?;
/// ```
#[derive(Clone)]
pub struct Migrator {
    inner: Arc<MigratorInner>,
}

struct MigratorInner {
    config: MigratorConfig,
    adapter: Arc<dyn Adapter>,
    naming: NamingConfig,
    version_store: VersionStore,
}

impl Debug for Migrator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("schema_info_table", &self.inner.version_store.table_name())
            .field("naming", &self.inner.naming)
            .field("transactional", &self.inner.config.transactional())
            .finish()
    }
}

impl Migrator {
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub(crate) fn new(config: MigratorConfig) -> StrataResult<Self> {
        let adapter = config.adapter()?;
        let naming = config.naming();
        let version_store = VersionStore::new(adapter.clone(), &naming);
        Ok(Migrator {
            inner: Arc::new(MigratorInner {
                config,
                adapter,
                naming,
                version_store,
            }),
        })
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.inner.config
    }

    pub fn adapter(&self) -> Arc<dyn Adapter> {
        self.inner.adapter.clone()
    }

    /// Physical name for a raw table name or an entity.
    pub fn proper_table_name<'a>(&self, table: impl Into<TableRef<'a>>) -> String {
        self.inner.naming.proper_table_name(table)
    }

    /// Physical name of the version table.
    pub fn schema_info_table_name(&self) -> String {
        self.inner.naming.schema_info_table_name()
    }

    /// Reads the persisted schema version.
    pub fn current_version(&self) -> StrataResult<u64> {
        self.inner.version_store.current_version()
    }

    /// Discovers and orders the migrations provided by `source`.
    pub fn discover(&self, source: &dyn MigrationSource) -> StrataResult<Vec<Migration>> {
        discover(source)
    }

    /// Computes the steps for a request without running them.
    ///
    /// * [Direction::Up] with target `t` (default: no limit) selects migrations with
    ///   `current < version <= t`, ascending.
    /// * [Direction::Down] with target `t` (default `0`) selects migrations with
    ///   `t < version <= current`, descending.
    pub fn plan(
        &self,
        source: &dyn MigrationSource,
        direction: Direction,
        target: Option<u64>,
    ) -> StrataResult<MigrationPlan> {
        let migrations = self.discover(source)?;
        let current = self.current_version()?;
        self.plan_for(migrations, current, direction, target)
    }

    fn plan_for(
        &self,
        migrations: Vec<Migration>,
        current: u64,
        direction: Direction,
        target: Option<u64>,
    ) -> StrataResult<MigrationPlan> {
        if current != 0 && !migrations.iter().any(|m| m.version() == current) {
            log::warn!(
                "Current schema version {} does not match any discovered migration",
                current
            );
        }

        let (target_version, steps) = match direction {
            Direction::Up => {
                let limit = target.unwrap_or(u64::MAX);
                let steps = migrations
                    .into_iter()
                    .filter(|m| m.version() > current && m.version() <= limit)
                    .collect::<Vec<_>>();
                let target_version = target
                    .unwrap_or_else(|| steps.last().map(|m| m.version()).unwrap_or(current));
                (target_version, steps)
            }
            Direction::Down => {
                let target = target.unwrap_or(0);
                let steps = migrations
                    .into_iter()
                    .rev()
                    .filter(|m| m.version() > target && m.version() <= current)
                    .collect::<Vec<_>>();
                (target, steps)
            }
        };

        log::debug!(
            "Planned {} migration(s) {} from version {}: {:?}",
            steps.len(),
            direction,
            current,
            steps.iter().map(|m| m.version()).collect::<Vec<_>>()
        );
        Ok(MigrationPlan {
            direction,
            from_version: current,
            target_version,
            steps,
        })
    }

    /// Applies pending migrations up to `target` (all of them when `None`).
    pub fn up(
        &self,
        source: &dyn MigrationSource,
        target: Option<u64>,
    ) -> StrataResult<MigrationReport> {
        let plan = self.plan(source, Direction::Up, target)?;
        self.execute(plan)
    }

    /// Reverts applied migrations down to `target` (to `0` when `None`).
    pub fn down(
        &self,
        source: &dyn MigrationSource,
        target: Option<u64>,
    ) -> StrataResult<MigrationReport> {
        let plan = self.plan(source, Direction::Down, target)?;
        self.execute(plan)
    }

    /// Moves the schema to `target`, going up or down as needed. Without a target
    /// every pending migration is applied.
    pub fn migrate(
        &self,
        source: &dyn MigrationSource,
        target: Option<u64>,
    ) -> StrataResult<MigrationReport> {
        let migrations = self.discover(source)?;
        let current = self.current_version()?;

        let plan = match target {
            Some(target) if target < current => {
                self.plan_for(migrations, current, Direction::Down, Some(target))?
            }
            Some(target) if target == current => {
                self.plan_for(migrations, current, Direction::Up, Some(current))?
            }
            _ => self.plan_for(migrations, current, Direction::Up, target)?,
        };
        self.execute(plan)
    }

    /// Reports every discovered migration as applied (`version <= current`) or pending.
    pub fn status(&self, source: &dyn MigrationSource) -> StrataResult<Vec<MigrationStatus>> {
        let current = self.current_version()?;
        Ok(self
            .discover(source)?
            .into_iter()
            .map(|m| MigrationStatus {
                version: m.version(),
                name: m.name().to_string(),
                applied: m.version() <= current,
            })
            .collect())
    }

    fn execute(&self, plan: MigrationPlan) -> StrataResult<MigrationReport> {
        let from_version = plan.from_version();
        if plan.is_empty() {
            log::info!("Schema is up to date at version {}", from_version);
            return Ok(MigrationReport {
                direction: plan.direction(),
                from_version,
                to_version: from_version,
                executed: Vec::new(),
            });
        }

        let schema = Schema::new(self.inner.adapter.as_ref(), &self.inner.naming);
        let mut executed = Vec::with_capacity(plan.steps().len());
        let mut to_version = from_version;

        for (index, migration) in plan.steps().iter().enumerate() {
            let next_version = plan.version_after(index);
            let mut step = || {
                migration.migrate(&schema, plan.direction())?;
                self.inner.version_store.set_version(next_version)
            };

            if self.inner.config.transactional() {
                self.inner.adapter.transaction(&mut step)?;
            } else {
                step()?;
            }

            executed.push(migration.version());
            to_version = next_version;
        }

        log::info!(
            "Schema migrated {} from version {} to {}",
            plan.direction(),
            from_version,
            to_version
        );
        Ok(MigrationReport {
            direction: plan.direction(),
            from_version,
            to_version,
            executed,
        })
    }
}
