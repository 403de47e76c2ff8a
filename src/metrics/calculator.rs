use crate::metrics::window::RollingWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const SHORT_WINDOW: usize = 7;
pub const LONG_WINDOW: usize = 30;
/// 成交量基准窗口：当日之前的 30 行，不含当日
pub const VOLUME_WINDOW: usize = 30;

/// 单个资产一天的行情。close 在库里非空，这里允许为空以表示缺失观测。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub asset_id: i32,
    pub date: NaiveDate,
    pub daily_return_pct: Option<f64>,
    pub daily_range_pct: Option<f64>,
    pub vol_7d: Option<f64>,
    pub vol_30d: Option<f64>,
    pub sma_7: Option<f64>,
    pub sma_30: Option<f64>,
    pub volume_ratio_30d: Option<f64>,
}

/// 计算一个资产的全部派生指标。`bars` 须按日期升序且无重复日期（上游保证）。
///
/// 每个窗口指标只在窗口内恰好有足量非空值时产出，跨越缺失行的窗口一律为空，
/// 不做部分窗口近似。
pub fn compute_series(asset_id: i32, bars: &[PriceBar]) -> Vec<MetricRow> {
    let mut returns_7 = RollingWindow::new(SHORT_WINDOW);
    let mut returns_30 = RollingWindow::new(LONG_WINDOW);
    let mut closes_7 = RollingWindow::new(SHORT_WINDOW);
    let mut closes_30 = RollingWindow::new(LONG_WINDOW);
    let mut prior_volume = RollingWindow::new(VOLUME_WINDOW);

    let mut rows = Vec::with_capacity(bars.len());
    let mut prev_close: Option<f64> = None;

    for bar in bars {
        let daily_return_pct = daily_return(prev_close, bar.close);

        returns_7.push(daily_return_pct);
        returns_30.push(daily_return_pct);
        closes_7.push(bar.close);
        closes_30.push(bar.close);

        // 先用“之前 30 行”算比值，再把当日成交量放进窗口
        let volume_ratio_30d = volume_ratio(bar.volume, prior_volume.mean());
        prior_volume.push(bar.volume);

        rows.push(MetricRow {
            asset_id,
            date: bar.date,
            daily_return_pct,
            daily_range_pct: daily_range(bar.high, bar.low),
            vol_7d: returns_7.population_std(),
            vol_30d: returns_30.population_std(),
            sma_7: closes_7.mean(),
            sma_30: closes_30.mean(),
            volume_ratio_30d,
        });

        prev_close = bar.close;
    }

    rows
}

fn daily_return(prev_close: Option<f64>, close: Option<f64>) -> Option<f64> {
    match (prev_close, close) {
        (Some(prev), Some(cur)) if prev != 0.0 => Some((cur / prev - 1.0) * 100.0),
        _ => None,
    }
}

fn daily_range(high: Option<f64>, low: Option<f64>) -> Option<f64> {
    match (high, low) {
        (Some(h), Some(l)) if l != 0.0 => Some((h - l) / l * 100.0),
        _ => None,
    }
}

fn volume_ratio(volume: Option<f64>, prior_mean: Option<f64>) -> Option<f64> {
    match (volume, prior_mean) {
        // 均值为 0 时返回空，不产出 inf/NaN
        (Some(v), Some(mean)) if mean != 0.0 => Some(v / mean),
        _ => None,
    }
}
