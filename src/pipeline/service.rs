use crate::config::EngineConfig;
use crate::pipeline::auditor::ValidationAuditor;
use crate::pipeline::coordinator::RecomputeCoordinator;
use crate::pipeline::model::{PipelineError, RunSummary};
use crate::storage;
use log::info;
use sea_orm::DatabaseConnection;
use std::time::Instant;

pub struct MetricsService {
    db: DatabaseConnection,
    coordinator: RecomputeCoordinator,
    auditor: ValidationAuditor,
}

impl MetricsService {
    pub fn new(db: DatabaseConnection, config: &EngineConfig) -> Self {
        Self {
            db,
            coordinator: RecomputeCoordinator::new(config.batch_size),
            auditor: ValidationAuditor::new(config.expected_nulls),
        }
    }

    /// 建连并校验表结构；失败时尚未发生任何写入
    pub async fn connect(config: &EngineConfig) -> Result<Self, PipelineError> {
        let db = storage::establish_connection(&config.database_url, config.pool_size)
            .await
            .map_err(PipelineError::Connectivity)?;
        info!("Connected to {}", config.display_target);
        Ok(Self::new(db, config))
    }

    /// 全量重算，成功后立即做空值自检
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let rows_written = self.coordinator.recompute(&self.db).await?;
        let elapsed_secs = started.elapsed().as_secs_f64();

        info!("{}", "-".repeat(72));
        info!("Metrics computation complete.");
        info!("  Rows inserted : {}", rows_written);
        info!("  Time elapsed  : {:.2} seconds", elapsed_secs);

        let report = self.auditor.audit(&self.db).await?;
        Ok(RunSummary {
            rows_written: Some(rows_written),
            elapsed_secs,
            report,
        })
    }

    /// 只审计现有的指标集，不做任何写入
    pub async fn validate_only(&self) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let report = self.auditor.audit(&self.db).await?;
        Ok(RunSummary {
            rows_written: None,
            elapsed_secs: started.elapsed().as_secs_f64(),
            report,
        })
    }

    /// 无论成功与否都要调用，归还连接池
    pub async fn close(self) {
        if let Err(e) = self.db.close().await {
            log::warn!("Closing database connection failed: {}", e);
        }
        info!("Database connection closed.");
    }
}
