use strata::adapter::{DatabaseStatements, SchemaStatements};
use strata::common::Value;
use strata::errors::ErrorKind;
use strata::migration::{Direction, MigrationSet};
use strata::schema::{ColumnOptions, ColumnType};
use strata_int_test::test_util::{
    cleanup, create_and_read_reminder, create_test_context, people_migrations, run_test,
};

#[test]
fn test_migrator_up_and_down() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            assert!(!ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().columns("reminders").is_err());

            let report = ctx.migrator().up(&migrations, None)?;
            assert_eq!(report.executed, vec![1, 2]);
            assert_eq!(ctx.migrator().current_version()?, 2);
            assert!(ctx.has_column("people", "last_name")?);
            assert_eq!(
                create_and_read_reminder(&ctx, "reminders")?,
                Value::from("hello world")
            );

            let report = ctx.migrator().down(&migrations, None)?;
            assert_eq!(report.executed, vec![2, 1]);
            assert_eq!(ctx.migrator().current_version()?, 0);
            assert!(!ctx.has_column("people", "last_name")?);

            let err = ctx.adapter().select_all("reminders").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StatementInvalid);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_migrator_one_up() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();

            ctx.migrator().up(&migrations, Some(1))?;
            assert!(ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().columns("reminders").is_err());
            assert_eq!(ctx.migrator().current_version()?, 1);

            ctx.migrator().up(&migrations, Some(2))?;
            assert_eq!(
                create_and_read_reminder(&ctx, "reminders")?,
                Value::from("hello world")
            );
            assert_eq!(ctx.migrator().current_version()?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_migrator_one_down() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            ctx.migrator().up(&migrations, None)?;

            ctx.migrator().down(&migrations, Some(1))?;
            assert!(ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().columns("reminders").is_err());
            assert_eq!(ctx.migrator().current_version()?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_migrator_one_up_one_down() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            ctx.migrator().up(&migrations, Some(1))?;
            ctx.migrator().down(&migrations, Some(0))?;

            assert!(!ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().columns("reminders").is_err());
            assert_eq!(ctx.migrator().current_version()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_migrator_going_down_due_to_version_target() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            ctx.migrator().up(&migrations, Some(1))?;

            let report = ctx.migrator().migrate(&migrations, Some(0))?;
            assert_eq!(report.direction, Direction::Down);
            assert!(!ctx.has_column("people", "last_name")?);
            assert!(ctx.adapter().columns("reminders").is_err());

            let report = ctx.migrator().migrate(&migrations, None)?;
            assert_eq!(report.direction, Direction::Up);
            assert!(ctx.has_column("people", "last_name")?);
            assert_eq!(
                create_and_read_reminder(&ctx, "reminders")?,
                Value::from("hello world")
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_repeated_migrate_converges() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            ctx.migrator().migrate(&migrations, Some(2))?;
            let report = ctx.migrator().migrate(&migrations, Some(2))?;
            assert!(report.executed.is_empty());
            assert_eq!(ctx.migrator().current_version()?, 2);

            // targets beyond the last migration apply everything and stop there
            let report = ctx.migrator().up(&migrations, Some(10))?;
            assert!(report.executed.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failing_step_rolls_back_and_stops() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations().add(
                "3_broken",
                |schema| {
                    schema.create_table("half_done", |t| {
                        t.string("name");
                    })?;
                    schema.drop_table("does_not_exist")
                },
                |schema| schema.drop_table("half_done"),
            )
            .add(
                "4_never_runs",
                |schema| {
                    schema.add_column(
                        "people",
                        "age",
                        ColumnType::Integer,
                        ColumnOptions::default(),
                    )
                },
                |schema| schema.remove_column("people", "age"),
            );

            let err = ctx.migrator().up(&migrations, None).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StatementInvalid);
            assert!(err.message().contains("no such table: does_not_exist"));

            assert_eq!(ctx.migrator().current_version()?, 2);
            assert!(!ctx.adapter().table_exists("half_done")?);
            assert!(!ctx.has_column("people", "age")?);

            // the run resumes from the last committed step once the cause is gone
            let fixed = people_migrations().add(
                "3_broken",
                |schema| {
                    schema.create_table("half_done", |t| {
                        t.string("name");
                    })
                },
                |schema| schema.drop_table("half_done"),
            );
            let report = ctx.migrator().up(&fixed, None)?;
            assert_eq!(report.executed, vec![3]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_status_reports_applied_and_pending() {
    run_test(
        create_test_context,
        |ctx| {
            let migrations = people_migrations();
            ctx.migrator().up(&migrations, Some(1))?;

            let status = ctx.migrator().status(&migrations)?;
            assert_eq!(status.len(), 2);
            assert_eq!(status[0].name, "people_have_last_names");
            assert!(status[0].applied);
            assert_eq!(status[1].version, 2);
            assert!(!status[1].applied);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_source_is_a_no_op() {
    run_test(
        create_test_context,
        |ctx| {
            let report = ctx.migrator().up(&MigrationSet::new(), None)?;
            assert!(report.executed.is_empty());
            assert_eq!(report.to_string(), "Schema is up to date at version 0");
            Ok(())
        },
        cleanup,
    )
}
