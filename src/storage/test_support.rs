use crate::metrics::PriceBar;
use crate::storage::entity::asset::ActiveModel as AssetActiveModel;
use crate::storage::entity::daily_metric::{
    self, Entity as DailyMetric, Model as DailyMetricModel,
};
use crate::storage::entity::daily_price::{
    ActiveModel as DailyPriceActiveModel, Entity as DailyPrice,
};
use crate::storage::establish_connection;
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};

/// 单连接的内存库：连接池里只有一条连接，库内容才能在多次查询间保持
pub async fn memory_db() -> DatabaseConnection {
    establish_connection("sqlite::memory:", 1)
        .await
        .expect("open in-memory sqlite")
}

pub async fn seed_asset(db: &DatabaseConnection, symbol: &str, active: bool) -> i32 {
    let am = AssetActiveModel {
        asset_id: NotSet,
        symbol: Set(symbol.to_string()),
        name: Set(format!("{} test asset", symbol)),
        category: Set(Some("layer1".to_string())),
        is_active: Set(active),
    };
    am.insert(db).await.expect("insert asset").asset_id
}

pub async fn seed_prices(db: &DatabaseConnection, asset_id: i32, bars: &[PriceBar]) {
    let models: Vec<DailyPriceActiveModel> = bars
        .iter()
        .map(|b| DailyPriceActiveModel {
            price_id: NotSet,
            asset_id: Set(asset_id),
            date: Set(b.date),
            open: Set(b.open),
            high: Set(b.high),
            low: Set(b.low),
            close: Set(b.close.expect("stored close is NOT NULL")),
            volume_usd: Set(b.volume),
        })
        .collect();
    if models.is_empty() {
        return;
    }
    DailyPrice::insert_many(models)
        .exec_without_returning(db)
        .await
        .expect("insert prices");
}

pub async fn load_metrics(db: &DatabaseConnection) -> Vec<DailyMetricModel> {
    DailyMetric::find()
        .order_by_asc(daily_metric::Column::AssetId)
        .order_by_asc(daily_metric::Column::Date)
        .all(db)
        .await
        .expect("load metrics")
}

pub fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
}

/// 连续 n 天、收盘价平缓变化的行情
pub fn sample_bars(n: usize, start_offset: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64) * 0.75 + if i % 4 == 0 { 1.25 } else { 0.0 };
            PriceBar {
                date: day(start_offset + i),
                open: Some(close - 0.5),
                high: Some(close + 2.0),
                low: Some(close - 2.0),
                close: Some(close),
                volume: Some(10_000.0 + (i as f64) * 37.0),
            }
        })
        .collect()
}
