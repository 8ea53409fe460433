use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::migration::{Migration, MigrationFn, Schema};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

static IDENTIFIER_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)_([_a-z0-9]*)$"));

const UP_SUFFIX: &str = ".up";
const DOWN_SUFFIX: &str = ".down";

/// One migration as enumerated by a source, before its identifier is parsed.
#[derive(Clone)]
pub struct MigrationArtifact {
    identifier: String,
    up: MigrationFn,
    down: MigrationFn,
}

impl MigrationArtifact {
    pub fn new(identifier: &str, up: MigrationFn, down: MigrationFn) -> Self {
        MigrationArtifact {
            identifier: identifier.to_string(),
            up,
            down,
        }
    }

    /// Source identifier, e.g. `1_people_have_last_names`.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Debug for MigrationArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationArtifact")
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Where migrations come from.
///
/// A source only enumerates artifacts; parsing identifiers, ordering and duplicate
/// detection happen in [discover].
pub trait MigrationSource {
    /// Lists every migration artifact the source provides.
    fn artifacts(&self) -> StrataResult<Vec<MigrationArtifact>>;

    /// Short human-readable description used in log messages.
    fn describe(&self) -> String {
        "migration set".to_string()
    }
}

/// Migrations registered in code.
///
/// # Usage
/// ```ignore
/// let migrations = MigrationSet::new()
///     .add(
///         "1_people_have_last_names",
///         |schema| {
///             schema.add_column("people", "last_name", ColumnType::String, Default::default())
///         },
///         |schema| schema.remove_column("people", "last_name"),
///     );
/// ```
#[derive(Clone, Default, Debug)]
pub struct MigrationSet {
    artifacts: Vec<MigrationArtifact>,
}

impl MigrationSet {
    pub fn new() -> Self {
        MigrationSet::default()
    }

    /// Registers a migration under `identifier` (`<version>_<name>`).
    pub fn add<U, D>(mut self, identifier: &str, up: U, down: D) -> Self
    where
        U: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
        D: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
    {
        self.push(identifier, up, down);
        self
    }

    pub fn push<U, D>(&mut self, identifier: &str, up: U, down: D)
    where
        U: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
        D: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
    {
        self.artifacts
            .push(MigrationArtifact::new(identifier, into_body(up), into_body(down)));
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl MigrationSource for MigrationSet {
    fn artifacts(&self) -> StrataResult<Vec<MigrationArtifact>> {
        Ok(self.artifacts.clone())
    }
}

/// A directory of SQL migrations.
///
/// Each migration is a pair of files, `<version>_<name>.up.sql` and
/// `<version>_<name>.down.sql`, whose contents are run through
/// [Schema::execute]. Files without the `.sql` extension are ignored.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
}

impl DirectorySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        DirectorySource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn split_file_name(file_name: &str) -> StrataResult<(String, bool)> {
        let stem = file_name.strip_suffix(".sql").unwrap_or(file_name);
        if let Some(identifier) = stem.strip_suffix(UP_SUFFIX) {
            Ok((identifier.to_string(), true))
        } else if let Some(identifier) = stem.strip_suffix(DOWN_SUFFIX) {
            Ok((identifier.to_string(), false))
        } else {
            log::error!("{} is not a valid migration file name", file_name);
            Err(StrataError::new(
                &format!(
                    "{} is not a valid migration file name, expected <version>_<name>.up.sql or <version>_<name>.down.sql",
                    file_name
                ),
                ErrorKind::InvalidMigrationName,
            ))
        }
    }
}

fn into_body<F>(body: F) -> MigrationFn
where
    F: Fn(&Schema) -> StrataResult<()> + Send + Sync + 'static,
{
    Arc::new(body)
}

fn sql_body(sql: String) -> MigrationFn {
    into_body(move |schema| schema.execute(&sql))
}

impl MigrationSource for DirectorySource {
    fn artifacts(&self) -> StrataResult<Vec<MigrationArtifact>> {
        let entries = std::fs::read_dir(&self.path).map_err(|err| {
            StrataError::new_with_cause(
                &format!("Cannot read migrations from {}", self.path.display()),
                ErrorKind::IOError,
                err.into(),
            )
        })?;

        let mut pairs: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
                continue;
            }

            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    StrataError::new(
                        &format!("{} is not a valid UTF-8 file name", path.display()),
                        ErrorKind::EncodingError,
                    )
                })?
                .to_string();
            let (identifier, is_up) = Self::split_file_name(&file_name)?;
            let sql = std::fs::read_to_string(&path)?;

            let pair = pairs.entry(identifier).or_default();
            if is_up {
                pair.0 = Some(sql);
            } else {
                pair.1 = Some(sql);
            }
        }

        let mut artifacts = Vec::with_capacity(pairs.len());
        for (identifier, pair) in pairs {
            match pair {
                (Some(up), Some(down)) => {
                    artifacts.push(
                        MigrationArtifact::new(&identifier, sql_body(up), sql_body(down)),
                    )
                }
                (up, _) => {
                    let missing = if up.is_none() { "up" } else { "down" };
                    log::error!("Migration {} has no {} file", identifier, missing);
                    return Err(StrataError::new(
                        &format!(
                            "Migration {} in {} has no {} file",
                            identifier,
                            self.path.display(),
                            missing
                        ),
                        ErrorKind::MissingMigrationBody,
                    ));
                }
            }
        }
        Ok(artifacts)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Splits a migration identifier into `(version, name)`.
///
/// # Errors
/// Returns [ErrorKind::InvalidMigrationName] if the identifier does not match
/// `<digits>_<lowercase name>` or if the version is `0`.
pub fn parse_identifier(identifier: &str) -> StrataResult<(u64, String)> {
    let pattern = IDENTIFIER_PATTERN.as_ref().map_err(|err| {
        StrataError::new(
            &format!("Invalid migration name pattern: {}", err),
            ErrorKind::InternalError,
        )
    })?;

    let invalid = || {
        log::error!("{} is not a valid migration identifier", identifier);
        StrataError::new(
            &format!("{} is not a valid migration identifier", identifier),
            ErrorKind::InvalidMigrationName,
        )
    };

    let captures = pattern.captures(identifier).ok_or_else(invalid)?;
    let version = captures[1].parse::<u64>().map_err(|_| invalid())?;
    if version == 0 {
        return Err(invalid());
    }
    Ok((version, captures[2].to_string()))
}

/// Turns a source's artifacts into migrations sorted by ascending version.
///
/// All configuration problems (malformed identifiers, version `0`, duplicate
/// versions, missing bodies) are reported here, before anything executes.
pub fn discover(source: &dyn MigrationSource) -> StrataResult<Vec<Migration>> {
    let mut migrations: BTreeMap<u64, Migration> = BTreeMap::new();
    for artifact in source.artifacts()? {
        let (version, name) = parse_identifier(&artifact.identifier)?;
        if let Some(existing) = migrations.get(&version) {
            log::error!(
                "Multiple migrations have the version number {}: {} and {}",
                version,
                existing.name(),
                name
            );
            return Err(StrataError::new(
                &format!(
                    "Multiple migrations have the version number {}: {} and {}",
                    version,
                    existing.name(),
                    name
                ),
                ErrorKind::DuplicateMigrationVersion,
            ));
        }
        migrations.insert(
            version,
            Migration::from_fns(version, &name, artifact.up, artifact.down),
        );
    }

    log::debug!(
        "Discovered {} migrations in {}",
        migrations.len(),
        source.describe()
    );
    Ok(migrations.into_values().collect())
}
