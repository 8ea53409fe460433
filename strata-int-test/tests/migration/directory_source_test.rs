use std::fs;
use strata::adapter::DatabaseStatements;
use strata::common::Value;
use strata::errors::ErrorKind;
use strata::migration::DirectorySource;
use strata_int_test::test_util::{
    cleanup, create_and_read_reminder, create_test_context, run_test, write_sql_migrations,
};

#[test]
fn test_sql_directory_up_and_down() {
    run_test(
        create_test_context,
        |ctx| {
            let dir = tempfile::tempdir()?;
            write_sql_migrations(dir.path())?;
            let source = DirectorySource::new(dir.path());

            ctx.migrator().up(&source, None)?;
            assert_eq!(ctx.migrator().current_version()?, 2);
            assert!(ctx.has_column("people", "last_name")?);
            assert_eq!(
                create_and_read_reminder(&ctx, "reminders")?,
                Value::from("hello world")
            );

            ctx.migrator().down(&source, None)?;
            assert_eq!(ctx.migrator().current_version()?, 0);
            assert!(!ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().select_all("reminders").is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sql_directory_partial_application() {
    run_test(
        create_test_context,
        |ctx| {
            let dir = tempfile::tempdir()?;
            write_sql_migrations(dir.path())?;
            let source = DirectorySource::new(dir.path());

            ctx.migrator().up(&source, Some(1))?;
            let report = ctx.migrator().up(&source, Some(2))?;
            assert_eq!(report.executed, vec![2]);
            assert_eq!(ctx.migrator().current_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_down_file_is_rejected_before_running() {
    run_test(
        create_test_context,
        |ctx| {
            let dir = tempfile::tempdir()?;
            write_sql_migrations(dir.path())?;
            fs::remove_file(dir.path().join("2_we_need_reminders.down.sql"))?;
            let source = DirectorySource::new(dir.path());

            let err = ctx.migrator().up(&source, None).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MissingMigrationBody);
            assert!(!ctx.has_column("people", "last_name")?);
            assert_eq!(ctx.migrator().current_version()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_duplicate_version_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let dir = tempfile::tempdir()?;
            write_sql_migrations(dir.path())?;
            fs::write(dir.path().join("2_other.up.sql"), "SELECT 1;")?;
            fs::write(dir.path().join("2_other.down.sql"), "SELECT 1;")?;
            let source = DirectorySource::new(dir.path());

            let err = ctx.migrator().up(&source, None).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateMigrationVersion);
            assert_eq!(ctx.migrator().current_version()?, 0);
            Ok(())
        },
        cleanup,
    )
}
