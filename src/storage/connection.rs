use crate::storage::entity::{asset, daily_metric, daily_price};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Schema,
    Statement,
};
use std::time::Duration;

pub async fn establish_connection(
    db_url: &str,
    pool_size: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.max_connections(pool_size.max(1))
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    let backend = db.get_database_backend();

    if backend == DatabaseBackend::Sqlite {
        db.execute(Statement::from_string(
            backend,
            "PRAGMA journal_mode=WAL;".to_string(),
        ))
        .await?;
    }

    ensure_schema(&db).await?;

    info!("Database connection established ({:?}), schema verified.", backend);
    Ok(db)
}

/// 表不存在时按实体建表；已有表（例如 NUMERIC 列的旧库）保持不动。
async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // assets 先建，两张事实表引用它
    let stmt = builder.build(schema.create_table_from_entity(asset::Entity).if_not_exists());
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(daily_price::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(daily_metric::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    // 唯一索引：每个资产每天最多一行
    for sql in [
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_prices_asset_date ON daily_prices ("asset_id", "date");"#,
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_metrics_asset_date ON daily_metrics ("asset_id", "date");"#,
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_assets_symbol ON assets ("symbol");"#,
    ] {
        db.execute(Statement::from_string(builder, sql.to_string()))
            .await?;
    }

    Ok(())
}
