use crate::pipeline::model::{
    AssetAudit, MetricColumn, NullCounts, NullMismatch, PipelineError, ValidationReport,
};
use crate::storage::repository::{
    AssetRepository, MetricRepository, NullCountRow, PriceRepository,
};
use chrono::NaiveDate;
use log::{info, warn};
use sea_orm::ConnectionTrait;
use std::collections::HashMap;

const GAP_PREVIEW: usize = 10;

/// 重算后的自检：按窗口边界规则推出每个资产的期望空值数，与实际值逐列比对。
/// 不一致只记录和告警，不回滚也不报错。
pub struct ValidationAuditor {
    expected: NullCounts,
}

impl ValidationAuditor {
    pub fn new(expected: NullCounts) -> Self {
        Self { expected }
    }

    pub async fn audit<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<ValidationReport, PipelineError> {
        let counts = MetricRepository::null_counts(db)
            .await
            .map_err(PipelineError::Query)?;
        let symbols = AssetRepository::symbols(db)
            .await
            .map_err(PipelineError::Query)?;
        let series = PriceRepository::load_active_series(db)
            .await
            .map_err(PipelineError::Query)?;

        let mut gaps: HashMap<i32, Vec<NaiveDate>> = series
            .iter()
            .map(|s| {
                let dates: Vec<NaiveDate> = s.bars.iter().map(|b| b.date).collect();
                (s.asset_id, detect_gaps(&dates))
            })
            .collect();

        let assets = counts
            .into_iter()
            .map(|row| {
                let symbol = symbols
                    .get(&row.asset_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", row.asset_id));
                let calendar_gaps = gaps.remove(&row.asset_id).unwrap_or_default();
                self.evaluate(row, symbol, calendar_gaps)
            })
            .collect();

        let report = self.build_report(assets);
        log_report(&report);
        Ok(report)
    }

    fn evaluate(
        &self,
        row: NullCountRow,
        symbol: String,
        calendar_gaps: Vec<NaiveDate>,
    ) -> AssetAudit {
        let nulls = NullCounts {
            daily_return_pct: row.null_return,
            daily_range_pct: row.null_range,
            vol_7d: row.null_vol7,
            vol_30d: row.null_vol30,
            sma_7: row.null_sma7,
            sma_30: row.null_sma30,
            volume_ratio_30d: row.null_volratio,
        };
        let mismatches = MetricColumn::ALL
            .iter()
            .filter_map(|&column| {
                let expected = self.expected.get(column);
                let actual = nulls.get(column);
                (expected != actual).then_some(NullMismatch {
                    column,
                    expected,
                    actual,
                })
            })
            .collect();

        AssetAudit {
            asset_id: row.asset_id,
            symbol,
            total_rows: row.total_rows,
            nulls,
            mismatches,
            calendar_gaps,
        }
    }

    fn build_report(&self, assets: Vec<AssetAudit>) -> ValidationReport {
        let passed = assets.iter().all(|a| a.mismatches.is_empty());
        ValidationReport {
            expected: self.expected,
            assets,
            passed,
        }
    }
}

/// 首末日期之间缺失的自然日。`dates` 须升序。
pub fn detect_gaps(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut missing = Vec::new();
    for pair in dates.windows(2) {
        let mut d = pair[0].succ_opt();
        while let Some(day) = d {
            if day >= pair[1] {
                break;
            }
            missing.push(day);
            d = day.succ_opt();
        }
    }
    missing
}

fn log_report(report: &ValidationReport) {
    let e = &report.expected;
    info!("{}", "-".repeat(72));
    info!(
        "NULL Waterfall Validation (expected: ret={}, rng={}, v7={}, v30={}, s7={}, s30={}, vr={})",
        e.daily_return_pct,
        e.daily_range_pct,
        e.vol_7d,
        e.vol_30d,
        e.sma_7,
        e.sma_30,
        e.volume_ratio_30d
    );
    info!(
        "{:<6} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Symbol", "Total", "Ret", "Rng", "Vol7", "Vol30", "SMA7", "SMA30", "VolR"
    );
    info!("{}", "-".repeat(72));

    for a in &report.assets {
        let n = &a.nulls;
        info!(
            "{:<6} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
            a.symbol,
            a.total_rows,
            n.daily_return_pct,
            n.daily_range_pct,
            n.vol_7d,
            n.vol_30d,
            n.sma_7,
            n.sma_30,
            n.volume_ratio_30d
        );
        for m in &a.mismatches {
            warn!(
                "  {}: Expected {} NULLs for {}, got {}",
                a.symbol,
                m.expected,
                m.column.as_str(),
                m.actual
            );
        }
        if !a.calendar_gaps.is_empty() {
            let preview: Vec<String> = a
                .calendar_gaps
                .iter()
                .take(GAP_PREVIEW)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            warn!(
                "  {}: {} gap(s) detected in date range. First {}: {:?}",
                a.symbol,
                a.calendar_gaps.len(),
                GAP_PREVIEW,
                preview
            );
        }
    }

    if report.passed {
        info!("NULL waterfall validation PASSED for all assets.");
    } else {
        warn!("NULL waterfall validation had WARNINGS -- review output above.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::coordinator::RecomputeCoordinator;
    use crate::storage::test_support::{day, memory_db, sample_bars, seed_asset, seed_prices};

    fn counts(asset_id: i32, total: i64, nulls: [i64; 7]) -> NullCountRow {
        NullCountRow {
            asset_id,
            total_rows: total,
            null_return: nulls[0],
            null_range: nulls[1],
            null_vol7: nulls[2],
            null_vol30: nulls[3],
            null_sma7: nulls[4],
            null_sma30: nulls[5],
            null_volratio: nulls[6],
        }
    }

    #[test]
    fn evaluate_flags_each_mismatched_column() {
        let auditor = ValidationAuditor::new(NullCounts::expected_warmup());
        let ok = auditor.evaluate(counts(1, 100, [1, 0, 7, 30, 6, 29, 30]), "BTC".into(), vec![]);
        assert!(ok.mismatches.is_empty());

        let bad = auditor.evaluate(counts(2, 100, [1, 2, 7, 31, 6, 29, 30]), "ETH".into(), vec![]);
        assert_eq!(
            bad.mismatches,
            vec![
                NullMismatch {
                    column: MetricColumn::DailyRangePct,
                    expected: 0,
                    actual: 2
                },
                NullMismatch {
                    column: MetricColumn::Vol30d,
                    expected: 30,
                    actual: 31
                },
            ]
        );

        let report = auditor.build_report(vec![ok, bad]);
        assert!(!report.passed);
    }

    #[test]
    fn gaps_between_first_and_last_date() {
        let dates = vec![day(0), day(1), day(4), day(5), day(7)];
        assert_eq!(detect_gaps(&dates), vec![day(2), day(3), day(6)]);
        assert!(detect_gaps(&[day(0)]).is_empty());
        assert!(detect_gaps(&[]).is_empty());
    }

    #[tokio::test]
    async fn audit_passes_after_recompute_of_gapless_series() {
        let db = memory_db().await;
        let btc = seed_asset(&db, "BTC", true).await;
        let eth = seed_asset(&db, "ETH", true).await;
        seed_prices(&db, btc, &sample_bars(60, 0)).await;
        seed_prices(&db, eth, &sample_bars(37, 0)).await;

        RecomputeCoordinator::new(50).recompute(&db).await.unwrap();
        let report = ValidationAuditor::new(NullCounts::expected_warmup())
            .audit(&db)
            .await
            .unwrap();

        assert!(report.passed, "{:?}", report);
        assert_eq!(report.assets.len(), 2);
        assert_eq!(report.assets[0].symbol, "BTC");
        assert_eq!(report.assets[0].total_rows, 60);
        assert_eq!(report.assets[1].total_rows, 37);
        assert!(report.assets.iter().all(|a| a.calendar_gaps.is_empty()));
    }

    #[tokio::test]
    async fn short_series_is_reported_not_raised() {
        let db = memory_db().await;
        let dot = seed_asset(&db, "DOT", true).await;
        seed_prices(&db, dot, &sample_bars(10, 0)).await;

        RecomputeCoordinator::new(50).recompute(&db).await.unwrap();
        let report = ValidationAuditor::new(NullCounts::expected_warmup())
            .audit(&db)
            .await
            .unwrap();

        assert!(!report.passed);
        let audit = &report.assets[0];
        assert_eq!(audit.nulls.vol_30d, 10);
        assert_eq!(audit.nulls.sma_7, 6);
        assert!(audit
            .mismatches
            .iter()
            .any(|m| m.column == MetricColumn::Sma30 && m.actual == 10));
    }

    #[tokio::test]
    async fn calendar_gaps_reported_for_missing_dates() {
        let db = memory_db().await;
        let link = seed_asset(&db, "LINK", true).await;
        let mut bars = sample_bars(41, 0);
        bars.remove(20);
        seed_prices(&db, link, &bars).await;

        RecomputeCoordinator::new(50).recompute(&db).await.unwrap();
        let report = ValidationAuditor::new(NullCounts::expected_warmup())
            .audit(&db)
            .await
            .unwrap();

        assert_eq!(report.assets[0].calendar_gaps, vec![day(20)]);
        // 窗口按行计，缺一个自然日不影响空值数
        assert!(report.passed);
    }
}
