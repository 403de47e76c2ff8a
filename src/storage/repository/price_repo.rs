use crate::metrics::PriceBar;
use crate::storage::entity::daily_price::{self, Entity as DailyPrice};
use crate::storage::repository::AssetRepository;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};

/// 一个活跃资产按日期升序排列的完整行情序列
#[derive(Debug, Clone)]
pub struct AssetSeries {
    pub asset_id: i32,
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

#[derive(Debug, Clone, FromQueryResult)]
struct PriceRow {
    asset_id: i32,
    date: chrono::NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: f64,
    volume_usd: Option<f64>,
}

pub struct PriceRepository;

impl PriceRepository {
    /// 读取所有活跃资产的行情。数值列统一 CAST 成 DOUBLE PRECISION，
    /// 这样 NUMERIC 列和 REAL 列的库都能直接读成 f64。
    pub async fn load_active_series<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<AssetSeries>, DbErr> {
        let assets = AssetRepository::load_active(db).await?;
        if assets.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = assets.iter().map(|a| a.asset_id).collect();

        let rows: Vec<PriceRow> = DailyPrice::find()
            .select_only()
            .column(daily_price::Column::AssetId)
            .column(daily_price::Column::Date)
            .column_as(Expr::cust(r#"CAST("open" AS DOUBLE PRECISION)"#), "open")
            .column_as(Expr::cust(r#"CAST("high" AS DOUBLE PRECISION)"#), "high")
            .column_as(Expr::cust(r#"CAST("low" AS DOUBLE PRECISION)"#), "low")
            .column_as(Expr::cust(r#"CAST("close" AS DOUBLE PRECISION)"#), "close")
            .column_as(
                Expr::cust(r#"CAST("volume_usd" AS DOUBLE PRECISION)"#),
                "volume_usd",
            )
            .filter(daily_price::Column::AssetId.is_in(ids))
            .order_by_asc(daily_price::Column::AssetId)
            .order_by_asc(daily_price::Column::Date)
            .into_model::<PriceRow>()
            .all(db)
            .await?;

        let mut series: Vec<AssetSeries> = assets
            .into_iter()
            .map(|a| AssetSeries {
                asset_id: a.asset_id,
                symbol: a.symbol,
                bars: Vec::new(),
            })
            .collect();

        // assets 与 rows 都按 asset_id 升序，顺序归并即可
        let mut idx = 0usize;
        for row in rows {
            while idx < series.len() && series[idx].asset_id != row.asset_id {
                idx += 1;
            }
            let Some(s) = series.get_mut(idx) else {
                break;
            };
            s.bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: Some(row.close),
                volume: row.volume_usd,
            });
        }

        Ok(series)
    }
}
