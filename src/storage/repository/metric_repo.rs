use crate::metrics::MetricRow;
use crate::storage::entity::daily_metric::{
    self, ActiveModel as DailyMetricActiveModel, Entity as DailyMetric,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, NotSet, QueryOrder, QuerySelect, Set,
};

/// 每个资产的总行数与七个指标列的空值数
#[derive(Debug, Clone, FromQueryResult)]
pub struct NullCountRow {
    pub asset_id: i32,
    pub total_rows: i64,
    pub null_return: i64,
    pub null_range: i64,
    pub null_vol7: i64,
    pub null_vol30: i64,
    pub null_sma7: i64,
    pub null_sma30: i64,
    pub null_volratio: i64,
}

pub struct MetricRepository;

impl MetricRepository {
    pub async fn delete_all<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let res = DailyMetric::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }

    pub async fn insert_batch<C: ConnectionTrait>(
        db: &C,
        rows: &[MetricRow],
    ) -> Result<u64, DbErr> {
        if rows.is_empty() {
            return Ok(0);
        }
        let models = rows.iter().map(to_active_model);
        DailyMetric::insert_many(models)
            .exec_without_returning(db)
            .await
    }

    pub async fn null_counts<C: ConnectionTrait>(db: &C) -> Result<Vec<NullCountRow>, DbErr> {
        DailyMetric::find()
            .select_only()
            .column(daily_metric::Column::AssetId)
            .column_as(Expr::cust("COUNT(*)"), "total_rows")
            .column_as(Expr::cust("COUNT(*) - COUNT(daily_return_pct)"), "null_return")
            .column_as(Expr::cust("COUNT(*) - COUNT(daily_range_pct)"), "null_range")
            .column_as(Expr::cust("COUNT(*) - COUNT(vol_7d)"), "null_vol7")
            .column_as(Expr::cust("COUNT(*) - COUNT(vol_30d)"), "null_vol30")
            .column_as(Expr::cust("COUNT(*) - COUNT(sma_7)"), "null_sma7")
            .column_as(Expr::cust("COUNT(*) - COUNT(sma_30)"), "null_sma30")
            .column_as(
                Expr::cust("COUNT(*) - COUNT(volume_ratio_30d)"),
                "null_volratio",
            )
            .group_by(daily_metric::Column::AssetId)
            .order_by_asc(daily_metric::Column::AssetId)
            .into_model::<NullCountRow>()
            .all(db)
            .await
    }
}

fn to_active_model(row: &MetricRow) -> DailyMetricActiveModel {
    // 按原库列精度截断：收益/振幅/波动率 6 位，均线 8 位，量比 4 位
    DailyMetricActiveModel {
        metric_id: NotSet,
        asset_id: Set(row.asset_id),
        date: Set(row.date),
        daily_return_pct: Set(quantize(row.daily_return_pct, 6)),
        daily_range_pct: Set(quantize(row.daily_range_pct, 6)),
        vol_7d: Set(quantize(row.vol_7d, 6)),
        vol_30d: Set(quantize(row.vol_30d, 6)),
        sma_7: Set(quantize(row.sma_7, 8)),
        sma_30: Set(quantize(row.sma_30, 8)),
        volume_ratio_30d: Set(quantize(row.volume_ratio_30d, 4)),
    }
}

fn quantize(value: Option<f64>, scale: i32) -> Option<f64> {
    let factor = 10f64.powi(scale);
    value
        .filter(|v| v.is_finite())
        .map(|v| (v * factor).round() / factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::{load_metrics, memory_db, seed_asset};
    use chrono::NaiveDate;

    fn row(asset_id: i32, day: u32, ret: Option<f64>) -> MetricRow {
        MetricRow {
            asset_id,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            daily_return_pct: ret,
            daily_range_pct: Some(1.0),
            vol_7d: None,
            vol_30d: None,
            sma_7: Some(100.0),
            sma_30: None,
            volume_ratio_30d: None,
        }
    }

    #[test]
    fn quantize_to_column_scale() {
        assert_eq!(quantize(Some(1.234_567_89), 4), Some(1.2346));
        assert_eq!(quantize(Some(-0.000_000_4), 6), Some(-0.0));
        assert_eq!(quantize(Some(f64::INFINITY), 4), None);
        assert_eq!(quantize(None, 4), None);
    }

    #[tokio::test]
    async fn insert_count_and_delete() {
        let db = memory_db().await;
        let btc = seed_asset(&db, "BTC", true).await;

        let rows = vec![row(btc, 1, None), row(btc, 2, Some(1.5)), row(btc, 3, Some(-2.0))];
        let inserted = MetricRepository::insert_batch(&db, &rows).await.unwrap();
        assert_eq!(inserted, 3);

        let counts = MetricRepository::null_counts(&db).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].asset_id, btc);
        assert_eq!(counts[0].total_rows, 3);
        assert_eq!(counts[0].null_return, 1);
        assert_eq!(counts[0].null_range, 0);
        assert_eq!(counts[0].null_vol7, 3);
        assert_eq!(counts[0].null_sma7, 0);

        assert_eq!(MetricRepository::delete_all(&db).await.unwrap(), 3);
        assert!(load_metrics(&db).await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_asset_date_rejected() {
        let db = memory_db().await;
        let eth = seed_asset(&db, "ETH", true).await;
        MetricRepository::insert_batch(&db, &[row(eth, 1, None)])
            .await
            .unwrap();
        let dup = MetricRepository::insert_batch(&db, &[row(eth, 1, Some(1.0))]).await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn empty_batch_is_noop() {
        let db = memory_db().await;
        assert_eq!(MetricRepository::insert_batch(&db, &[]).await.unwrap(), 0);
    }
}
