use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::SchemaManager;
use sea_orm_migration::MigrationTrait;
use uuid::Uuid;

use iam_systemuser::migration::SystemUsersMigration;

pub async fn setup_test_db() -> DatabaseConnection {
    let db_url = format!("sqlite:file:iam_systemuser_{}?mode=memory&cache=shared", Uuid::new_v4());
    let mut opts = ConnectOptions::new(db_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to connect test sqlite database");

    let schema_manager = SchemaManager::new(&db);
    SystemUsersMigration
        .up(&schema_manager)
        .await
        .expect("failed to run system_users migration");

    db
}
