use crate::metrics::{compute_series, MetricRow};
use crate::pipeline::model::PipelineError;
use crate::storage::repository::{MetricRepository, PriceRepository};
use log::{error, info};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// 全量重算：删除全部旧指标，再为所有活跃资产重新生成并写入，整体一个事务。
pub struct RecomputeCoordinator {
    batch_size: usize,
}

impl RecomputeCoordinator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// 返回写入行数。任一步失败都会回滚，旧的指标集保持不变。
    pub async fn recompute(&self, db: &DatabaseConnection) -> Result<u64, PipelineError> {
        let txn = db.begin().await.map_err(PipelineError::Connectivity)?;

        // 读价格也放在同一事务里，保证删写基于同一份快照
        let result = self.rewrite(&txn).await;

        match result {
            Ok(inserted) => {
                txn.commit().await.map_err(PipelineError::Mutation)?;
                Ok(inserted)
            }
            Err(e) => {
                error!("Recompute failed, rolling back: {}", e);
                if let Err(rb) = txn.rollback().await {
                    error!("Rollback failed: {}", rb);
                }
                Err(PipelineError::Mutation(e))
            }
        }
    }

    async fn rewrite(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        let series = PriceRepository::load_active_series(txn).await?;
        let rows: Vec<MetricRow> = series
            .iter()
            .flat_map(|s| compute_series(s.asset_id, &s.bars))
            .collect();
        for s in &series {
            info!("  {}: {} price rows", s.symbol, s.bars.len());
        }
        info!(
            "Computed {} metric rows for {} active assets.",
            rows.len(),
            series.len()
        );

        info!("Deleting existing rows from daily_metrics...");
        let deleted = MetricRepository::delete_all(txn).await?;
        info!("Deleted {} existing rows from daily_metrics.", deleted);

        let mut inserted = 0u64;
        for chunk in rows.chunks(self.batch_size) {
            inserted += MetricRepository::insert_batch(txn, chunk).await?;
        }
        info!("Inserted {} rows into daily_metrics.", inserted);

        Ok(inserted)
    }
}
