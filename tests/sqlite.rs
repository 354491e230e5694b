mod common;
use common::*;

async fn open(dir: &Path) -> SqliteProcessor {
    SqliteProcessor::connect(&sqlite_url(dir)).await.unwrap()
}

#[tokio::test]
async fn apply_up_then_down() {
    let migrations = users_migrations();
    let db = tempdir().unwrap();
    let url = sqlite_url(db.path());

    let result = api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Sqlite,
        url.clone(),
    ))
    .await
    .unwrap();
    assert_eq!(result.versions, vec![1, 2]);
    assert_eq!(result.statements_executed, 3);
    assert!(!result.dry_run);

    let mut processor = open(db.path()).await;
    assert!(processor.table_exists(None, "users").await.unwrap());
    assert!(processor.column_exists(None, "users", "email").await.unwrap());
    assert!(processor
        .index_exists(None, "users", "IX_users_email")
        .await
        .unwrap());
    let seeded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(processor.pool())
        .await
        .unwrap();
    assert_eq!(seeded, 1);
    drop(processor);

    let result = api::apply(
        ApplyOptions::new(vec![migrations.path().into()], Dialect::Sqlite, url)
            .down()
            .allow_destructive(),
    )
    .await
    .unwrap();
    assert_eq!(result.versions, vec![2, 1]);

    let mut processor = open(db.path()).await;
    assert!(!processor.table_exists(None, "users").await.unwrap());
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let migrations = users_migrations();
    let db = tempdir().unwrap();

    let result = api::apply(
        ApplyOptions::new(
            vec![migrations.path().into()],
            Dialect::Sqlite,
            sqlite_url(db.path()),
        )
        .dry_run(),
    )
    .await
    .unwrap();

    assert!(result.dry_run);
    assert_eq!(result.statements_executed, 0);
    assert_eq!(result.statements.len(), 3);
    assert!(!db.path().join("app.db").exists());
}

#[tokio::test]
async fn destructive_down_is_refused() {
    let migrations = users_migrations();
    let db = tempdir().unwrap();

    let err = api::apply(
        ApplyOptions::new(
            vec![migrations.path().into()],
            Dialect::Sqlite,
            sqlite_url(db.path()),
        )
        .down()
        .only_version(1),
    )
    .await
    .unwrap_err();

    match err {
        Error::LintFailed { count, issues } => {
            assert_eq!(count, 1);
            assert_eq!(issues[0].rule, "deny_drop_table");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_statement_rolls_back_the_migration() {
    let migrations = tempdir().unwrap();
    write_migration(
        migrations.path(),
        "0001_broken.json",
        r#"{
            "up": [
                {"op": "create_table", "name": "audit", "columns": [{"name": "id", "data_type": "int32"}]},
                {"op": "execute_sql", "sql": "INSERT INTO missing_table VALUES (1)"}
            ]
        }"#,
    );
    let db = tempdir().unwrap();

    let err = api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Sqlite,
        sqlite_url(db.path()),
    ))
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Execution { version: 1, .. }));

    let mut processor = open(db.path()).await;
    assert!(!processor.table_exists(None, "audit").await.unwrap());
}

#[tokio::test]
async fn processor_answers_existence_checks() {
    let db = tempdir().unwrap();
    let mut processor = open(db.path()).await;

    processor
        .execute("CREATE TABLE things (id INTEGER PRIMARY KEY, label TEXT)")
        .await
        .unwrap();
    processor
        .execute("CREATE INDEX ix_things_label ON things (label)")
        .await
        .unwrap();

    assert!(processor.schema_exists("main").await.unwrap());
    assert!(!processor.schema_exists("elsewhere").await.unwrap());
    assert!(processor.table_exists(Some("main"), "things").await.unwrap());
    assert!(processor.column_exists(None, "things", "label").await.unwrap());
    assert!(!processor.column_exists(None, "things", "missing").await.unwrap());
    assert!(processor
        .index_exists(None, "things", "ix_things_label")
        .await
        .unwrap());
    assert!(processor.sequence_exists(None, "seq").await.is_err());
}

#[test]
fn apply_blocking_runs_without_a_runtime() {
    let migrations = users_migrations();
    let db = tempdir().unwrap();

    let result = api::apply_blocking(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Sqlite,
        sqlite_url(db.path()),
    ))
    .unwrap();
    assert_eq!(result.versions, vec![1, 2]);
}

#[tokio::test]
async fn dialects_without_a_driver_report_connection_errors() {
    let migrations = users_migrations();
    let err = api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Oracle,
        "oracle://localhost/xe",
    ))
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}
