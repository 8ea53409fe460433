use strata::adapter::SchemaStatements;
use strata::common::Value;
use strata::errors::StrataResult;
use strata::migration::MigrationSet;
use strata::naming::NamingConfig;
use strata_int_test::test_util::{
    cleanup, create_and_read_reminder, create_prefixed_test_context, drop_reminders, run_test,
    we_need_reminders, Reminder,
};

#[test]
fn test_schema_info_table_name() -> StrataResult<()> {
    let naming = NamingConfig::new("prefix_", "_suffix")?;
    assert_eq!(naming.schema_info_table_name(), "prefix_schema_info_suffix");
    assert_eq!(NamingConfig::default().schema_info_table_name(), "schema_info");
    Ok(())
}

#[test]
fn test_proper_table_name() -> StrataResult<()> {
    let plain = NamingConfig::default();
    assert_eq!(plain.proper_table_name("table"), "table");
    assert_eq!(plain.proper_table_name(&Reminder::new()), "reminders");

    // an entity's own affixes win over the global ones
    let global = NamingConfig::new("ARprefix_", "_ARsuffix")?;
    assert_eq!(
        global.proper_table_name(&Reminder::with_affixes("prefix_", "_suffix")),
        "prefix_reminders_suffix"
    );
    assert_eq!(
        global.proper_table_name(&Reminder::with_affixes("", "")),
        "ARprefix_reminders_ARsuffix"
    );

    let global = NamingConfig::new("prefix_", "_suffix")?;
    assert_eq!(global.proper_table_name("table"), "prefix_table_suffix");
    Ok(())
}

#[test]
fn test_add_drop_table_with_prefix_and_suffix() {
    run_test(
        || create_prefixed_test_context("prefix_", "_suffix"),
        |ctx| {
            assert!(ctx.adapter().columns("prefix_reminders_suffix").is_err());

            ctx.with_schema(we_need_reminders)?;
            assert!(ctx.adapter().table_exists("prefix_reminders_suffix")?);
            assert!(!ctx.adapter().table_exists("reminders")?);
            assert_eq!(
                create_and_read_reminder(&ctx, "prefix_reminders_suffix")?,
                Value::from("hello world")
            );

            ctx.with_schema(drop_reminders)?;
            assert!(!ctx.adapter().table_exists("prefix_reminders_suffix")?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_prefixed_migrator_tracks_version_in_prefixed_table() {
    run_test(
        || create_prefixed_test_context("prefix_", "_suffix"),
        |ctx| {
            let migrations =
                MigrationSet::new().add("1_we_need_reminders", we_need_reminders, drop_reminders);
            assert_eq!(
                ctx.migrator().schema_info_table_name(),
                "prefix_schema_info_suffix"
            );

            ctx.migrator().up(&migrations, None)?;
            assert!(ctx.adapter().table_exists("prefix_schema_info_suffix")?);
            assert!(!ctx.adapter().table_exists("schema_info")?);
            assert_eq!(ctx.migrator().current_version()?, 1);
            assert_eq!(
                ctx.migrator().proper_table_name(&Reminder::new()),
                "prefix_reminders_suffix"
            );
            Ok(())
        },
        cleanup,
    )
}
