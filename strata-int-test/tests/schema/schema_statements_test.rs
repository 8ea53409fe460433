use strata::adapter::{DatabaseStatements, SchemaStatements};
use strata::common::Value;
use strata::errors::ErrorKind;
use strata::schema::{ColumnOptions, ColumnType, IndexOptions, IndexTarget, Removal};
use strata_int_test::test_util::{cleanup, create_test_context, row, run_test};

#[test]
fn test_add_index() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.add_column(
                    "people",
                    "last_name",
                    ColumnType::String,
                    ColumnOptions::default(),
                )?;
                schema.add_column(
                    "people",
                    "administrator",
                    ColumnType::Boolean,
                    ColumnOptions::default(),
                )?;

                schema.add_index("people", &["last_name"], IndexOptions::default())?;
                schema.remove_index("people", "last_name")?;

                schema.add_index("people", &["last_name", "first_name"], IndexOptions::default())?;
                assert_eq!(schema.indexes("people")?[0].columns, vec!["last_name", "first_name"]);
                schema.remove_index("people", "last_name")?;

                schema.add_index(
                    "people",
                    &["last_name", "first_name", "administrator"],
                    IndexOptions::default().name("named_admin"),
                )?;
                schema.remove_index("people", IndexTarget::name("named_admin"))?;
                assert!(schema.indexes("people")?.is_empty());
                Ok(())
            })
        },
        cleanup,
    )
}

#[test]
fn test_create_table_adds_id() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.create_table("testings", |t| {
                    t.string("foo");
                })
            })?;

            let mut names = ctx.column_names("testings")?;
            names.sort();
            assert_eq!(names, vec!["foo", "id"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_table_with_not_null_column() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.create_table("testings", |t| {
                    t.column("foo", ColumnType::String, ColumnOptions::new().not_null());
                })
            })?;

            let err = ctx
                .adapter()
                .execute("insert into testings (foo) values (NULL)")
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StatementInvalid);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_table_with_defaults() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.create_table("testings", |t| {
                    t.column(
                        "one",
                        ColumnType::String,
                        ColumnOptions::new().default_value("hello"),
                    );
                    t.column("two", ColumnType::Boolean, ColumnOptions::new().default_value(true));
                    t.column(
                        "three",
                        ColumnType::Boolean,
                        ColumnOptions::new().default_value(false),
                    );
                    t.column("four", ColumnType::Integer, ColumnOptions::new().default_value(1));
                })
            })?;

            let columns = ctx.adapter().columns("testings")?;
            let default_of = |name: &str| {
                columns
                    .iter()
                    .find(|c| c.name() == name)
                    .and_then(|c| c.default().cloned())
            };
            assert_eq!(default_of("one"), Some(Value::from("hello")));
            assert_eq!(default_of("two"), Some(Value::Bool(true)));
            assert_eq!(default_of("three"), Some(Value::Bool(false)));
            assert_eq!(default_of("four"), Some(Value::Integer(1)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_column_not_null() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.create_table("testings", |t| {
                    t.string("foo");
                })?;
                schema.add_column(
                    "testings",
                    "bar",
                    ColumnType::String,
                    ColumnOptions::new().not_null(),
                )
            })?;

            let err = ctx
                .adapter()
                .execute("insert into testings (foo, bar) values ('hello', NULL)")
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StatementInvalid);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_native_types() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.add_column(
                    "people",
                    "last_name",
                    ColumnType::String,
                    ColumnOptions::default(),
                )?;
                schema.add_column("people", "bio", ColumnType::Text, ColumnOptions::default())?;
                schema.add_column("people", "age", ColumnType::Integer, ColumnOptions::default())?;
                schema.add_column("people", "height", ColumnType::Float, ColumnOptions::default())?;
                schema.add_column(
                    "people",
                    "birthday",
                    ColumnType::DateTime,
                    ColumnOptions::default(),
                )?;
                schema.add_column(
                    "people",
                    "favorite_day",
                    ColumnType::Date,
                    ColumnOptions::default(),
                )?;
                schema.add_column("people", "male", ColumnType::Boolean, ColumnOptions::default())
            })?;

            let birthday = chrono::NaiveDate::from_ymd_opt(1990, 5, 17)
                .and_then(|d| d.and_hms_opt(8, 30, 0))
                .unwrap();
            let favorite_day = chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
            ctx.adapter().insert(
                "people",
                &row(&[
                    ("first_name", Value::from("bob")),
                    ("last_name", Value::from("bobsen")),
                    ("bio", Value::from("I was born ....")),
                    ("age", Value::from(18)),
                    ("height", Value::from(1.78)),
                    ("birthday", Value::from(birthday)),
                    ("favorite_day", Value::from(favorite_day)),
                    ("male", Value::from(true)),
                ]),
            )?;

            let bob = ctx.adapter().select_all("people")?.remove(0);
            assert_eq!(bob["first_name"], Value::from("bob"));
            assert_eq!(bob["last_name"], Value::from("bobsen"));
            assert_eq!(bob["bio"], Value::from("I was born ...."));
            assert_eq!(bob["age"], Value::Integer(18));
            assert_eq!(bob["height"], Value::Float(1.78));
            assert_eq!(bob["birthday"], Value::DateTime(birthday));
            assert_eq!(bob["favorite_day"], Value::Date(favorite_day));
            assert_eq!(bob["male"], Value::Bool(true));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_remove_single_field() {
    run_test(
        create_test_context,
        |ctx| {
            assert!(!ctx.has_column("people", "last_name")?);
            ctx.with_schema(|schema| {
                schema.add_column(
                    "people",
                    "last_name",
                    ColumnType::String,
                    ColumnOptions::default(),
                )
            })?;
            assert!(ctx.has_column("people", "last_name")?);

            ctx.with_schema(|schema| schema.remove_column("people", "last_name"))?;
            assert!(!ctx.has_column("people", "last_name")?);

            let removal = ctx.with_schema(|schema| {
                assert_eq!(
                    schema.remove_column_if_exists("people", "last_name")?,
                    Removal::AlreadyAbsent
                );
                assert_eq!(schema.drop_table_if_exists("nothing")?, Removal::AlreadyAbsent);
                Ok(())
            });
            assert!(removal.is_ok());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_rename() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.add_column(
                    "people",
                    "girlfriend",
                    ColumnType::String,
                    ColumnOptions::default(),
                )
            })?;
            ctx.adapter()
                .insert("people", &row(&[("girlfriend", Value::from("bobette"))]))?;

            ctx.with_schema(|schema| schema.rename_column("people", "girlfriend", "exgirlfriend"))?;

            let bob = ctx.adapter().select_all("people")?.remove(0);
            assert_eq!(bob["exgirlfriend"], Value::from("bobette"));
            assert!(!ctx.has_column("people", "girlfriend")?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_change_column() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.add_column("people", "bio", ColumnType::String, ColumnOptions::default())?;
                schema.change_column("people", "bio", ColumnType::Text, ColumnOptions::default())
            })?;

            let bio = ctx
                .adapter()
                .columns("people")?
                .into_iter()
                .find(|c| c.name() == "bio")
                .unwrap();
            assert_eq!(bio.column_type(), ColumnType::Text);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_change_column_with_new_default() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.with_schema(|schema| {
                schema.add_column(
                    "people",
                    "administrator",
                    ColumnType::Boolean,
                    ColumnOptions::new().default_value(1),
                )
            })?;
            ctx.adapter().insert("people", &row(&[]))?;
            assert_eq!(
                ctx.adapter().select_all("people")?[0]["administrator"],
                Value::Bool(true)
            );

            ctx.with_schema(|schema| {
                schema.change_column(
                    "people",
                    "administrator",
                    ColumnType::Boolean,
                    ColumnOptions::new().default_value(0),
                )
            })?;
            ctx.adapter().delete_all("people")?;
            ctx.adapter().insert("people", &row(&[]))?;
            assert_eq!(
                ctx.adapter().select_all("people")?[0]["administrator"],
                Value::Bool(false)
            );

            ctx.with_schema(|schema| {
                schema.change_column_default("people", "administrator", Some(Value::Bool(true)))
            })?;
            let administrator = ctx
                .adapter()
                .columns("people")?
                .into_iter()
                .find(|c| c.name() == "administrator")
                .unwrap();
            assert_eq!(administrator.default(), Some(&Value::Bool(true)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_errors_surface_database_messages() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx
                .with_schema(|schema| schema.drop_table("reminders"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StatementInvalid);
            assert!(err.message().contains("no such table: reminders"));
            Ok(())
        },
        cleanup,
    )
}
