use crate::metrics::{LONG_WINDOW, SHORT_WINDOW, VOLUME_WINDOW};
use chrono::NaiveDate;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("missing env {0}")]
    MissingEnv(&'static str),
    #[error("invalid env {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },
    /// 连不上库 / 认证失败 / 开启事务失败，发生在任何写入之前
    #[error("store unavailable: {0}")]
    Connectivity(#[source] DbErr),
    /// 重算事务内的失败，事务已回滚，旧数据仍然有效
    #[error("metrics recompute failed: {0}")]
    Mutation(#[source] DbErr),
    #[error("query failed: {0}")]
    Query(#[source] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricColumn {
    #[serde(rename = "daily_return_pct")]
    DailyReturnPct,
    #[serde(rename = "daily_range_pct")]
    DailyRangePct,
    #[serde(rename = "vol_7d")]
    Vol7d,
    #[serde(rename = "vol_30d")]
    Vol30d,
    #[serde(rename = "sma_7")]
    Sma7,
    #[serde(rename = "sma_30")]
    Sma30,
    #[serde(rename = "volume_ratio_30d")]
    VolumeRatio30d,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 7] = [
        MetricColumn::DailyReturnPct,
        MetricColumn::DailyRangePct,
        MetricColumn::Vol7d,
        MetricColumn::Vol30d,
        MetricColumn::Sma7,
        MetricColumn::Sma30,
        MetricColumn::VolumeRatio30d,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricColumn::DailyReturnPct => "daily_return_pct",
            MetricColumn::DailyRangePct => "daily_range_pct",
            MetricColumn::Vol7d => "vol_7d",
            MetricColumn::Vol30d => "vol_30d",
            MetricColumn::Sma7 => "sma_7",
            MetricColumn::Sma30 => "sma_30",
            MetricColumn::VolumeRatio30d => "volume_ratio_30d",
        }
    }
}

/// 七个指标列各自的空值数。既用于实际统计，也用于期望值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NullCounts {
    pub daily_return_pct: i64,
    pub daily_range_pct: i64,
    pub vol_7d: i64,
    pub vol_30d: i64,
    pub sma_7: i64,
    pub sma_30: i64,
    pub volume_ratio_30d: i64,
}

impl NullCounts {
    /// 由窗口边界规则推出的每资产期望空值数：
    /// 收益率 1；振幅 0；波动率 = 窗口长度（首行收益为空，再加 N-1 行预热）；
    /// 均线 = 窗口长度 - 1；量比 = 前置窗口长度。
    pub fn expected_warmup() -> Self {
        Self {
            daily_return_pct: 1,
            daily_range_pct: 0,
            vol_7d: SHORT_WINDOW as i64,
            vol_30d: LONG_WINDOW as i64,
            sma_7: SHORT_WINDOW as i64 - 1,
            sma_30: LONG_WINDOW as i64 - 1,
            volume_ratio_30d: VOLUME_WINDOW as i64,
        }
    }

    pub fn get(&self, column: MetricColumn) -> i64 {
        match column {
            MetricColumn::DailyReturnPct => self.daily_return_pct,
            MetricColumn::DailyRangePct => self.daily_range_pct,
            MetricColumn::Vol7d => self.vol_7d,
            MetricColumn::Vol30d => self.vol_30d,
            MetricColumn::Sma7 => self.sma_7,
            MetricColumn::Sma30 => self.sma_30,
            MetricColumn::VolumeRatio30d => self.volume_ratio_30d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullMismatch {
    pub column: MetricColumn,
    pub expected: i64,
    pub actual: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAudit {
    pub asset_id: i32,
    pub symbol: String,
    pub total_rows: i64,
    pub nulls: NullCounts,
    pub mismatches: Vec<NullMismatch>,
    /// 首末日期之间缺失的自然日，仅供参考，不影响 passed
    pub calendar_gaps: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub expected: NullCounts,
    pub assets: Vec<AssetAudit>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// validate-only 模式下为 None
    pub rows_written: Option<u64>,
    pub elapsed_secs: f64,
    pub report: ValidationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_warmup_matches_documented_counts() {
        let e = NullCounts::expected_warmup();
        let got: Vec<i64> = MetricColumn::ALL.iter().map(|c| e.get(*c)).collect();
        assert_eq!(got, vec![1, 0, 7, 30, 6, 29, 30]);
    }

    #[test]
    fn column_names_serialize_as_store_columns() {
        for c in MetricColumn::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }
}
