use std::time::Duration;

use sea_orm::sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    Schema,
};
use tracing::info;

use crate::entity::{kezad_layout, rfid_entry, user};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;

    create_table(&db, rfid_entry::Entity).await?;
    create_table(&db, kezad_layout::Entity).await?;
    create_table(&db, user::Entity).await?;

    Ok(db)
}

/// Create the table for `entity` unless it already exists.
///
/// The unique business-key index comes from the entity's `unique` column.
async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let table = entity.table_name();
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();

    let sql = match backend {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(MysqlQueryBuilder),
    };
    db.execute_unprepared(&sql).await?;

    info!("Ensured table {} exists", table);
    Ok(())
}
