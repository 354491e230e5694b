//! Needs Docker; run with `cargo test -- --ignored`.

mod common;
use common::*;
use polymold::processor::PostgresProcessor;

#[tokio::test]
#[ignore]
async fn apply_up_and_down() {
    let (_container, url) = setup_postgres().await;
    let migrations = users_migrations();

    let result = api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Postgres,
        url.clone(),
    ))
    .await
    .unwrap();
    assert_eq!(result.versions, vec![1, 2]);

    let mut processor = PostgresProcessor::connect(&url).await.unwrap();
    assert!(processor.table_exists(None, "users").await.unwrap());
    assert!(processor.column_exists(None, "users", "active").await.unwrap());
    assert!(processor
        .index_exists(None, "users", "IX_users_email")
        .await
        .unwrap());

    api::apply(
        ApplyOptions::new(vec![migrations.path().into()], Dialect::Postgres, url)
            .down()
            .allow_destructive(),
    )
    .await
    .unwrap();
    assert!(!processor.table_exists(None, "users").await.unwrap());
}

#[tokio::test]
#[ignore]
async fn schemas_and_sequences() {
    let (_container, url) = setup_postgres().await;
    let migrations = tempdir().unwrap();
    write_migration(
        migrations.path(),
        "0001_billing.json",
        r#"{
            "up": [
                {"op": "create_schema", "name": "billing"},
                {"op": "create_sequence", "schema": "billing", "name": "invoice_no", "start": 1000, "increment": 1},
                {
                    "op": "create_table",
                    "schema": "billing",
                    "name": "invoices",
                    "columns": [
                        {"name": "id", "data_type": "guid", "primary_key": true, "default": {"method": "new_guid"}},
                        {"name": "total", "data_type": "decimal", "size": 12, "scale": 2, "nullable": false}
                    ],
                    "description": "Issued invoices"
                }
            ]
        }"#,
    );

    api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Postgres,
        url.clone(),
    ))
    .await
    .unwrap();

    let mut processor = PostgresProcessor::connect(&url).await.unwrap();
    assert!(processor.schema_exists("billing").await.unwrap());
    assert!(processor
        .sequence_exists(Some("billing"), "invoice_no")
        .await
        .unwrap());
    assert!(processor
        .table_exists(Some("billing"), "invoices")
        .await
        .unwrap());
}

#[tokio::test]
#[ignore]
async fn failed_migration_leaves_no_trace() {
    let (_container, url) = setup_postgres().await;
    let migrations = tempdir().unwrap();
    write_migration(
        migrations.path(),
        "0001_broken.json",
        r#"{
            "up": [
                {"op": "create_table", "name": "audit", "columns": [{"name": "id", "data_type": "int32"}]},
                {"op": "execute_sql", "sql": "SELECT * FROM missing_table"}
            ]
        }"#,
    );

    let err = api::apply(ApplyOptions::new(
        vec![migrations.path().into()],
        Dialect::Postgres,
        url.clone(),
    ))
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Execution { version: 1, .. }));

    let mut processor = PostgresProcessor::connect(&url).await.unwrap();
    assert!(!processor.table_exists(None, "audit").await.unwrap());
}
